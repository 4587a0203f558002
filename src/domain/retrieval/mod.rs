//! Knowledge-scoped passage retrieval

mod client;
mod filter;
mod passage;
mod web_search;

pub use client::{RetrievalClient, SearchParams, DEFAULT_TOP_K};
pub use filter::DocumentSetFilter;
pub use passage::{join_contents, render_passages, Passage, DOCUMENT_SET_KEY, SOURCE_KEY};
pub use web_search::WebSearchFallback;

#[cfg(test)]
pub use client::mock;
