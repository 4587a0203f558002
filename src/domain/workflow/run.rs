//! Execution trace of a workflow run

use serde::Serialize;

use super::{WorkflowState, answer};

/// Result of executing a single step
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepExecutionResult {
    pub step_name: String,
    /// State fields the step wrote
    pub updated_fields: Vec<String>,
    pub execution_time_ms: u64,
}

impl StepExecutionResult {
    pub fn new(
        step_name: impl Into<String>,
        updated_fields: &[&'static str],
        execution_time_ms: u64,
    ) -> Self {
        Self {
            step_name: step_name.into(),
            updated_fields: updated_fields.iter().map(|f| f.to_string()).collect(),
            execution_time_ms,
        }
    }
}

/// A workflow run that reached its terminal step
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowRun {
    pub workflow: String,
    pub final_state: WorkflowState,
    pub steps: Vec<StepExecutionResult>,
    pub execution_time_ms: u64,
}

impl WorkflowRun {
    pub fn answer(&self) -> String {
        answer::extract(&self.final_state)
    }

    /// How many times the named step ran
    pub fn step_count(&self, step_name: &str) -> usize {
        self.steps.iter().filter(|s| s.step_name == step_name).count()
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.step_name.as_str()).collect()
    }
}
