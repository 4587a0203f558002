//! Application state for shared services

use std::sync::Arc;

use crate::infrastructure::services::InferenceService;

/// Shared handler state; cloned per request
#[derive(Debug, Clone)]
pub struct AppState {
    pub inference: Arc<InferenceService>,
}

impl AppState {
    pub fn new(inference: InferenceService) -> Self {
        Self {
            inference: Arc::new(inference),
        }
    }
}
