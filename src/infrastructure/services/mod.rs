//! Infrastructure services

mod inference_service;

pub use inference_service::{InferenceService, WorkflowKind};
