use std::fmt::Debug;

use async_trait::async_trait;

use super::Passage;
use crate::domain::DomainError;

/// Fallback source consulted when the knowledge scope had nothing relevant
#[async_trait]
pub trait WebSearchFallback: Send + Sync + Debug {
    async fn search(&self, query: &str) -> Result<Vec<Passage>, DomainError>;

    fn name(&self) -> &'static str;
}
