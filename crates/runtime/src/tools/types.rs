//! Tool-related types.

use super::ToolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

/// The result returned to the model after a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolResult {
    Success {
        tool_call_id: String,
        output: Value,
    },
    Failure {
        tool_call_id: String,
        error: ToolError,
    },
}

impl ToolResult {
    pub fn success(tool_call_id: impl Into<String>, output: Value) -> Self {
        Self::Success {
            tool_call_id: tool_call_id.into(),
            output,
        }
    }

    pub fn failure(tool_call_id: impl Into<String>, error: ToolError) -> Self {
        Self::Failure {
            tool_call_id: tool_call_id.into(),
            error,
        }
    }

    pub fn tool_call_id(&self) -> &str {
        match self {
            Self::Success { tool_call_id, .. } | Self::Failure { tool_call_id, .. } => tool_call_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failure { .. })
    }

    /// Text handed back to the model for this result.
    ///
    /// Successful outputs are sent as JSON; failures as `Error: <message>`.
    pub fn content(&self) -> String {
        match self {
            Self::Success { output, .. } => match output {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
            Self::Failure { error, .. } => format!("Error: {error}"),
        }
    }
}

/// A tool definition exposed to the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub schema: Value,
}
