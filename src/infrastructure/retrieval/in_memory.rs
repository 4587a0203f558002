//! In-memory retrieval backend for development and testing

use std::collections::{HashMap, HashSet};
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::retrieval::{Passage, RetrievalClient, SearchParams};
use crate::domain::DomainError;

/// Scores passages by the share of query terms they contain
#[derive(Debug, Default)]
pub struct InMemoryRetrievalClient {
    scopes: RwLock<HashMap<String, Vec<Passage>>>,
}

/// Seed file record
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedPassage {
    knowledge_scope: String,
    document_set_id: String,
    source: String,
    content: String,
}

impl InMemoryRetrievalClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_passages(&self, knowledge_scope: &str, passages: Vec<Passage>) {
        self.scopes
            .write()
            .await
            .entry(knowledge_scope.to_string())
            .or_default()
            .extend(passages);
    }

    /// Load passages from a JSON array of
    /// `{knowledgeScope, documentSetId, source, content}`
    pub async fn load_seed_file(&self, path: impl AsRef<Path>) -> Result<usize, DomainError> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
            DomainError::configuration(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let records: Vec<SeedPassage> = serde_json::from_str(&raw).map_err(|e| {
            DomainError::configuration(format!("Invalid seed file {}: {}", path.display(), e))
        })?;

        let count = records.len();
        for record in records {
            let passage = Passage::new(record.content, 0.0)
                .with_document_set(record.document_set_id)
                .with_source(record.source);
            self.add_passages(&record.knowledge_scope, vec![passage]).await;
        }

        info!(path = %path.display(), passages = count, "Loaded retrieval seed file");
        Ok(count)
    }
}

fn terms(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 2)
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl RetrievalClient for InMemoryRetrievalClient {
    async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError> {
        let query_terms = terms(&params.query);
        if query_terms.is_empty() {
            return Ok(Vec::new());
        }

        let scopes = self.scopes.read().await;
        let Some(passages) = scopes.get(&params.knowledge_scope) else {
            debug!(scope = %params.knowledge_scope, "Unknown knowledge scope");
            return Ok(Vec::new());
        };

        let mut scored: Vec<Passage> = passages
            .iter()
            .filter(|p| params.filter.as_ref().is_none_or(|f| f.matches(p)))
            .filter_map(|p| {
                let hits = terms(&p.content).intersection(&query_terms).count();
                (hits > 0).then(|| Passage {
                    score: hits as f32 / query_terms.len() as f32,
                    ..p.clone()
                })
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(params.top_k);

        debug!(
            scope = %params.knowledge_scope,
            query = %params.query,
            results = scored.len(),
            "In-memory search complete"
        );

        Ok(scored)
    }

    async fn health_check(&self) -> Result<bool, DomainError> {
        Ok(true)
    }

    fn client_type(&self) -> &'static str {
        "in_memory"
    }
}
