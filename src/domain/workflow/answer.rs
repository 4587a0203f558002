//! Answer extraction from a finished run

use super::WorkflowState;

/// Normalize the final generation into one string. An absent generation
/// yields an empty answer.
pub fn extract(state: &WorkflowState) -> String {
    state
        .generation
        .as_ref()
        .map(|content| content.to_text())
        .unwrap_or_default()
}
