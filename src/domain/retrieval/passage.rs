use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Metadata key carrying the owning document set
pub const DOCUMENT_SET_KEY: &str = "document_set_id";

/// Metadata key carrying the human readable source label
pub const SOURCE_KEY: &str = "source";

/// One retrieved text chunk with its similarity score and provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub content: String,
    /// Higher is more relevant; range depends on the backend
    pub score: f32,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl Passage {
    pub fn new(content: impl Into<String>, score: f32) -> Self {
        Self {
            content: content.into(),
            score,
            metadata: HashMap::new(),
        }
    }

    /// Passage with no content, used as a placeholder result
    pub fn empty() -> Self {
        Self::new("", 0.0)
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn with_document_set(self, id: impl Into<String>) -> Self {
        self.with_metadata(DOCUMENT_SET_KEY, Value::String(id.into()))
    }

    pub fn with_source(self, source: impl Into<String>) -> Self {
        self.with_metadata(SOURCE_KEY, Value::String(source.into()))
    }

    pub fn document_set_id(&self) -> Option<&str> {
        self.metadata.get(DOCUMENT_SET_KEY).and_then(Value::as_str)
    }

    pub fn source(&self) -> Option<&str> {
        self.metadata.get(SOURCE_KEY).and_then(Value::as_str)
    }

    /// Render as a `Source:`/`Content:` block for prompts and tool results
    pub fn render(&self) -> String {
        format!(
            "Source: {}\nContent: {}",
            self.source().unwrap_or("unknown"),
            self.content
        )
    }
}

/// Render passages as one context block, separated by blank lines
pub fn render_passages(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(Passage::render)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Join passage contents with blank lines
pub fn join_contents(passages: &[Passage]) -> String {
    passages
        .iter()
        .map(|p| p.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}
