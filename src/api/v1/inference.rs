//! Workflow inference endpoint

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::workflow::{StepExecutionResult, WorkflowInput, WorkflowRun};
use crate::infrastructure::services::WorkflowKind;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceResponse {
    pub answer: String,
    pub workflow: WorkflowKind,
    pub steps: Vec<StepSummary>,
    pub execution_time_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub name: String,
    pub duration_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub updated_fields: Vec<String>,
}

impl From<&StepExecutionResult> for StepSummary {
    fn from(result: &StepExecutionResult) -> Self {
        Self {
            name: result.step_name.clone(),
            duration_ms: result.execution_time_ms,
            updated_fields: result.updated_fields.clone(),
        }
    }
}

impl InferenceResponse {
    fn from_run(workflow: WorkflowKind, run: &WorkflowRun) -> Self {
        Self {
            answer: run.answer(),
            workflow,
            steps: run.steps.iter().map(StepSummary::from).collect(),
            execution_time_ms: run.execution_time_ms,
        }
    }
}

pub(crate) fn parse_workflow(raw: &str) -> Result<WorkflowKind, ApiError> {
    raw.parse::<WorkflowKind>()
        .map_err(|e| ApiError::from(e).with_param("workflow"))
}

/// POST /v1/inference/{workflow}
pub async fn run_inference(
    State(state): State<AppState>,
    Path(workflow): Path<String>,
    Json(input): Json<WorkflowInput>,
) -> Result<Json<InferenceResponse>, ApiError> {
    let kind = parse_workflow(&workflow)?;
    debug!(
        workflow = %kind,
        scope = %input.knowledge_scope,
        document_sets = input.allowed_document_set_ids.len(),
        "Inference request"
    );

    let run = state.inference.run_with_trace(kind, input).await?;

    Ok(Json(InferenceResponse::from_run(kind, &run)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_summary_serialization() {
        let summary = StepSummary::from(&StepExecutionResult::new("grade_documents", &["documents"], 12));
        let json = serde_json::to_value(&summary).unwrap();

        assert_eq!(json["name"], "grade_documents");
        assert_eq!(json["durationMs"], 12);
        assert_eq!(json["updatedFields"][0], "documents");
    }

    #[test]
    fn test_parse_workflow_rejects_unknown() {
        let err = parse_workflow("reflexive").unwrap_err();
        assert_eq!(err.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(err.response.error.param.as_deref(), Some("workflow"));
        assert_eq!(parse_workflow("agentic").unwrap(), WorkflowKind::Agentic);
    }
}
