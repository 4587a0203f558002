//! Retrieval client implementations

mod in_memory;
mod pgvector;
mod web_search;

pub use in_memory::InMemoryRetrievalClient;
pub use pgvector::PgVectorRetrievalClient;
pub use web_search::NoopWebSearch;
