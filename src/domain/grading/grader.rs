use std::fmt::Debug;

use async_trait::async_trait;
use thiserror::Error;

use super::BinaryScore;
use crate::domain::DomainError;

/// Failure of a grading call
#[derive(Debug, Error)]
pub enum GradingError {
    /// The collaborator itself failed
    #[error(transparent)]
    Collaborator(#[from] DomainError),

    /// The collaborator answered without a usable grade
    #[error("Malformed grade: {0}")]
    Malformed(String),
}

impl GradingError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed(message.into())
    }
}

/// Structured binary classifications used to pick the next workflow step
#[async_trait]
pub trait Grader: Send + Sync + Debug {
    /// Is this passage relevant to the question?
    async fn grade_document(&self, question: &str, passage: &str)
    -> Result<BinaryScore, GradingError>;

    /// Is the generation supported by the documents?
    async fn grade_groundedness(
        &self,
        documents: &str,
        generation: &str,
    ) -> Result<BinaryScore, GradingError>;

    /// Does the generation resolve the question?
    async fn grade_usefulness(
        &self,
        question: &str,
        generation: &str,
    ) -> Result<BinaryScore, GradingError>;

    /// Is the retrieved context relevant? Forced through a constrained tool call.
    async fn grade_relevance(&self, question: &str, context: &str)
    -> Result<BinaryScore, GradingError>;
}
