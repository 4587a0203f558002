use async_trait::async_trait;
use tracing::debug;

use crate::domain::DomainError;
use crate::domain::retrieval::{Passage, WebSearchFallback};

/// Placeholder fallback: contributes a single empty passage
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopWebSearch;

#[async_trait]
impl WebSearchFallback for NoopWebSearch {
    async fn search(&self, query: &str) -> Result<Vec<Passage>, DomainError> {
        debug!(query = %query, "Web search fallback not configured, returning empty passage");
        Ok(vec![Passage::empty()])
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_noop_returns_one_empty_passage() {
        let results = NoopWebSearch.search("anything").await.unwrap();
        assert_eq!(results, vec![Passage::empty()]);
        assert!(results[0].content.is_empty());
    }
}
