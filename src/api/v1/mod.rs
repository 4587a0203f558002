//! v1 API endpoints

pub mod inference;
pub mod playground;

use axum::{Router, routing::post};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route("/inference/{workflow}", post(inference::run_inference))
        .route("/playground/retrieval", post(playground::search_retrieval))
        .route("/playground/chat", post(playground::chat))
}
