use serde::{Deserialize, Serialize};

use super::Passage;

/// Restriction of a search to a subset of document sets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentSetFilter {
    AnyOf(Vec<String>),
    Equals(String),
}

impl DocumentSetFilter {
    /// Build a filter from an allow-list. An empty list means unrestricted.
    pub fn from_ids(ids: &[String]) -> Option<Self> {
        match ids {
            [] => None,
            [single] => Some(Self::Equals(single.clone())),
            many => Some(Self::AnyOf(many.to_vec())),
        }
    }

    pub fn ids(&self) -> Vec<&str> {
        match self {
            Self::AnyOf(ids) => ids.iter().map(String::as_str).collect(),
            Self::Equals(id) => vec![id.as_str()],
        }
    }

    pub fn matches_id(&self, id: &str) -> bool {
        match self {
            Self::AnyOf(ids) => ids.iter().any(|candidate| candidate == id),
            Self::Equals(expected) => expected == id,
        }
    }

    /// Passages without a document set never match a restriction
    pub fn matches(&self, passage: &Passage) -> bool {
        passage
            .document_set_id()
            .is_some_and(|id| self.matches_id(id))
    }
}
