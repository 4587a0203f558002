//! Workflow domain: state, graph definition, and run results

pub mod answer;
mod definition;
mod error;
mod run;
mod state;

pub use definition::{Transition, WorkflowDefinition, WorkflowStep, require_grade};
pub use error::WorkflowError;
pub use run::{StepExecutionResult, WorkflowRun};
pub use state::{StateUpdate, Turn, TurnRole, WorkflowInput, WorkflowState};
