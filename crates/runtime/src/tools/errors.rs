use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during tool execution.
///
/// None of these stop the tool loop: each becomes the failed result of a
/// single call and is reported back to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("tool not found: {0}")]
    NotFound(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// The engine refused the rendered command, or could not be reached.
    #[error("command `{command}` failed: {reason}")]
    Rejected { command: String, reason: String },
}
