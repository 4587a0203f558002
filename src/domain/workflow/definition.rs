//! Workflow graph definition

use std::fmt::Debug;

use async_trait::async_trait;

use super::{StateUpdate, WorkflowError, WorkflowState};

/// Edge resolved after a step has run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition<S> {
    Goto(S),
    End,
}

/// Step identifier of a workflow graph
pub trait WorkflowStep: Copy + Debug + PartialEq + Send + Sync + 'static {
    fn name(&self) -> &'static str;
}

/// A fixed wiring of steps and edges over [`WorkflowState`]
///
/// Each workflow enumerates its steps in `Step`; `next` matches on it
/// exhaustively, so every edge is resolved at compile time and the only
/// runtime failure is a decision label missing from the state.
#[async_trait]
pub trait WorkflowDefinition: Send + Sync + Debug {
    type Step: WorkflowStep;

    fn name(&self) -> &'static str;

    fn entry(&self) -> Self::Step;

    /// Run one step against the current state
    async fn execute(
        &self,
        step: Self::Step,
        state: &WorkflowState,
    ) -> Result<StateUpdate, WorkflowError>;

    /// Pick the outgoing edge of `step` from the merged state
    fn next(
        &self,
        step: Self::Step,
        state: &WorkflowState,
    ) -> Result<Transition<Self::Step>, WorkflowError>;
}

/// Read a decision label, failing if the preceding step never set it
pub fn require_grade<T: Copy>(
    label: Option<T>,
    field: &str,
    step: impl WorkflowStep,
) -> Result<T, WorkflowError> {
    label.ok_or_else(|| {
        WorkflowError::configuration(format!(
            "decision after '{}' requires '{}', which is unset",
            step.name(),
            field
        ))
    })
}
