use std::fmt::Debug;

use async_trait::async_trait;

use super::{DocumentSetFilter, Passage};
use crate::domain::DomainError;

/// Number of passages fetched by the workflows
pub const DEFAULT_TOP_K: usize = 3;

/// Search parameters for a scoped similarity query
#[derive(Debug, Clone, PartialEq)]
pub struct SearchParams {
    /// Knowledge scope (tenant/index) to search in
    pub knowledge_scope: String,
    pub query: String,
    pub top_k: usize,
    pub filter: Option<DocumentSetFilter>,
}

impl SearchParams {
    pub fn new(knowledge_scope: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            knowledge_scope: knowledge_scope.into(),
            query: query.into(),
            top_k: DEFAULT_TOP_K,
            filter: None,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_filter(mut self, filter: Option<DocumentSetFilter>) -> Self {
        self.filter = filter;
        self
    }
}

/// Vector similarity search collaborator
///
/// Returns passages ordered by descending score, at most `top_k` of them.
#[async_trait]
pub trait RetrievalClient: Send + Sync + Debug {
    async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError>;

    /// Check if the backend is reachable
    async fn health_check(&self) -> Result<bool, DomainError>;

    fn client_type(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns scripted batches in order, then the fallback batch
    #[derive(Debug, Default)]
    pub struct MockRetrievalClient {
        batches: Mutex<VecDeque<Vec<Passage>>>,
        fallback: Vec<Passage>,
        error: Option<String>,
        search_count: AtomicUsize,
        queries: Mutex<Vec<SearchParams>>,
    }

    impl MockRetrievalClient {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_passages(mut self, passages: Vec<Passage>) -> Self {
            self.fallback = passages;
            self
        }

        pub fn with_batches(self, batches: Vec<Vec<Passage>>) -> Self {
            *self.batches.lock().unwrap() = batches.into();
            self
        }

        pub fn with_error(mut self, error: impl Into<String>) -> Self {
            self.error = Some(error.into());
            self
        }

        pub fn search_count(&self) -> usize {
            self.search_count.load(Ordering::SeqCst)
        }

        pub fn queries(&self) -> Vec<SearchParams> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RetrievalClient for MockRetrievalClient {
        async fn search(&self, params: SearchParams) -> Result<Vec<Passage>, DomainError> {
            self.search_count.fetch_add(1, Ordering::SeqCst);
            let top_k = params.top_k;
            self.queries.lock().unwrap().push(params);

            if let Some(ref error) = self.error {
                return Err(DomainError::retrieval(error.clone()));
            }

            let batch = self
                .batches
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| self.fallback.clone());
            Ok(batch.into_iter().take(top_k).collect())
        }

        async fn health_check(&self) -> Result<bool, DomainError> {
            Ok(self.error.is_none())
        }

        fn client_type(&self) -> &'static str {
            "mock"
        }
    }
}
