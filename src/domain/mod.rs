//! Domain layer - RAG orchestration types and collaborator traits

pub mod embedding;
pub mod error;
pub mod grading;
pub mod llm;
pub mod prompt;
pub mod retrieval;
pub mod workflow;

pub use embedding::EmbeddingProvider;
pub use error::DomainError;
pub use grading::{BinaryScore, GradeResponse, Grader, GradingError};
pub use llm::{
    ContentFragment, ContentPart, FinishReason, GeneratedContent, LlmProvider, LlmRequest,
    LlmRequestBuilder, LlmResponse, LlmResponseFormat, Message, MessageRole, ToolCall,
    ToolChoice, ToolDefinition, Usage,
};
pub use prompt::{PromptTemplate, TemplateError};
pub use retrieval::{DocumentSetFilter, Passage, RetrievalClient, SearchParams};
pub use workflow::{
    StateUpdate, StepExecutionResult, Transition, Turn, TurnRole, WorkflowDefinition,
    WorkflowError, WorkflowInput, WorkflowRun, WorkflowState, WorkflowStep,
};
