//! Workflow error types

use thiserror::Error;

use crate::domain::DomainError;
use crate::domain::grading::GradingError;

/// Errors that abort a workflow run
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The step budget ran out before a terminal step was reached
    #[error("Workflow '{workflow}' exceeded its step budget of {budget}")]
    RecursionExceeded { workflow: String, budget: usize },

    /// A decision could not be resolved from the state
    #[error("Workflow configuration error: {0}")]
    Configuration(String),

    /// A collaborator answered, but not in the expected shape
    #[error("Malformed response in '{step}': {message}")]
    MalformedResponse { step: String, message: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Retrieval or generation failure, passed through unchanged
    #[error(transparent)]
    Collaborator(#[from] DomainError),
}

impl WorkflowError {
    pub fn recursion_exceeded(workflow: impl Into<String>, budget: usize) -> Self {
        Self::RecursionExceeded {
            workflow: workflow.into(),
            budget,
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn malformed(step: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            step: step.into(),
            message: message.into(),
        }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Attribute a grading failure to the step that requested it
    pub fn from_grading(step: impl Into<String>, error: GradingError) -> Self {
        match error {
            GradingError::Collaborator(e) => Self::Collaborator(e),
            GradingError::Malformed(message) => Self::malformed(step, message),
        }
    }

    /// Short label used for metrics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RecursionExceeded { .. } => "recursion_exceeded",
            Self::Configuration(_) => "configuration",
            Self::MalformedResponse { .. } => "malformed_response",
            Self::InvalidInput(_) => "invalid_input",
            Self::Collaborator(_) => "collaborator",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = WorkflowError::recursion_exceeded("self_correcting", 50);
        assert_eq!(
            err.to_string(),
            "Workflow 'self_correcting' exceeded its step budget of 50"
        );

        let err = WorkflowError::malformed("retrieve", "missing query argument");
        assert_eq!(
            err.to_string(),
            "Malformed response in 'retrieve': missing query argument"
        );
    }

    #[test]
    fn test_collaborator_passthrough() {
        let err: WorkflowError = DomainError::provider("openai", "timeout").into();
        assert_eq!(err.to_string(), "Provider error: openai - timeout");
        assert_eq!(err.kind(), "collaborator");
    }

    #[test]
    fn test_from_grading() {
        let err = WorkflowError::from_grading("grade_documents", GradingError::malformed("no score"));
        assert!(matches!(
            err,
            WorkflowError::MalformedResponse { ref step, .. } if step == "grade_documents"
        ));

        let err = WorkflowError::from_grading(
            "grade_documents",
            GradingError::Collaborator(DomainError::retrieval("down")),
        );
        assert!(matches!(err, WorkflowError::Collaborator(DomainError::Retrieval(_))));
    }
}
