//! Playground endpoints: raw retrieval and single-question chat

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::retrieval::Passage;
use crate::domain::workflow::WorkflowInput;
use crate::infrastructure::services::WorkflowKind;

/// Largest passage count the retrieval playground accepts
pub const MAX_PLAYGROUND_TOP_K: usize = 100;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrievalPlaygroundRequest {
    pub knowledge_scope: String,
    #[serde(default)]
    pub document_set_id: Option<String>,
    pub query: String,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievalPlaygroundResponse {
    pub passages: Vec<Passage>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatPlaygroundRequest {
    pub knowledge_scope: String,
    #[serde(default)]
    pub allowed_document_set_ids: Vec<String>,
    pub query: String,
    #[serde(default)]
    pub workflow: Option<WorkflowKind>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatPlaygroundResponse {
    pub answer: String,
    pub workflow: WorkflowKind,
}

/// POST /v1/playground/retrieval
pub async fn search_retrieval(
    State(state): State<AppState>,
    Json(request): Json<RetrievalPlaygroundRequest>,
) -> Result<Json<RetrievalPlaygroundResponse>, ApiError> {
    if request
        .top_k
        .is_some_and(|k| !(1..=MAX_PLAYGROUND_TOP_K).contains(&k))
    {
        return Err(ApiError::bad_request(format!(
            "topK must be between 1 and {}",
            MAX_PLAYGROUND_TOP_K
        ))
        .with_param("topK"));
    }

    let passages = state
        .inference
        .search_passages(
            &request.knowledge_scope,
            request.document_set_id,
            &request.query,
            request.top_k,
        )
        .await?;

    Ok(Json(RetrievalPlaygroundResponse { passages }))
}

/// POST /v1/playground/chat
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatPlaygroundRequest>,
) -> Result<Json<ChatPlaygroundResponse>, ApiError> {
    let workflow = request
        .workflow
        .unwrap_or_else(|| state.inference.default_kind());
    let input = WorkflowInput::new(request.knowledge_scope, request.query)
        .with_document_sets(request.allowed_document_set_ids);

    let answer = state.inference.run_inference(workflow, input).await?;

    Ok(Json(ChatPlaygroundResponse { answer, workflow }))
}
