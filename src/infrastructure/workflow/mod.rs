//! Workflow engine and the RAG workflow definitions

mod agentic;
mod basic;
pub(crate) mod collaborators;
mod corrective;
mod engine;
pub mod prompts;
mod self_correcting;

pub use agentic::{AgenticStep, AgenticWorkflow};
pub use basic::{BasicStep, BasicWorkflow};
pub use collaborators::RagCollaborators;
pub use corrective::{CorrectiveStep, CorrectiveWorkflow};
pub use engine::{DEFAULT_STEP_BUDGET, EngineConfig, WorkflowEngine};
pub use self_correcting::{SelfCorrectingStep, SelfCorrectingWorkflow};
