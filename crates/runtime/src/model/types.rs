use super::errors::ModelError;
use crate::tools::{ToolCall, ToolResult, ToolSpec};
use serde::{Deserialize, Serialize};
use std::future::Future;

/// The role of a message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    /// Tool results fed back to the model.
    Tool,
}

/// A part of a message, which can be text or a tool interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Part {
    Text(String),
    ToolCall(ToolCall),
    ToolResult(ToolResult),
}

/// A message, consisting of a role and one or more parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub parts: Vec<Part>,
}

impl Message {
    /// Create a message holding a single text part.
    pub fn text(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            parts: vec![Part::Text(text.into())],
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::text(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::text(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::text(Role::Assistant, text)
    }

    /// The tool-result turn answering one batch of tool calls.
    pub fn tool_results(results: Vec<ToolResult>) -> Self {
        Self {
            role: Role::Tool,
            parts: results.into_iter().map(Part::ToolResult).collect(),
        }
    }

    /// Get combined text content from all text parts.
    pub fn content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    /// Extract all tool calls from this message, in emitted order.
    pub fn tool_calls(&self) -> Vec<ToolCall> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::ToolCall(call) => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Extract all tool results from this message.
    pub fn tool_results_iter(&self) -> impl Iterator<Item = &ToolResult> {
        self.parts.iter().filter_map(|part| match part {
            Part::ToolResult(result) => Some(result),
            _ => None,
        })
    }
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Everything needed for a model request.
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    pub messages: &'a [Message],
    pub tools: &'a [ToolSpec],
}

/// The response from a model.
#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: Message,
    pub usage: Usage,
}

/// Trait for LLM provider backends.
pub trait Backend: Send + Sync {
    fn call(
        &self,
        request: ModelRequest<'_>,
    ) -> impl Future<Output = Result<ModelResponse, ModelError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn message_content_extraction() {
        let msg = Message {
            role: Role::Assistant,
            parts: vec![
                Part::Text("Plotting ".into()),
                Part::ToolCall(ToolCall {
                    id: "1".into(),
                    name: "geogebra_plot_function".into(),
                    input: Value::Null,
                }),
                Part::Text("now".into()),
            ],
        };
        assert_eq!(msg.content(), "Plotting now");
    }

    #[test]
    fn message_tool_calls_keep_emitted_order() {
        let msg = Message {
            role: Role::Assistant,
            parts: vec![
                Part::ToolCall(ToolCall {
                    id: "1".into(),
                    name: "geogebra_plot_function".into(),
                    input: json!({ "name": "f", "expression": "x^2" }),
                }),
                Part::ToolCall(ToolCall {
                    id: "2".into(),
                    name: "geogebra_plot_integral".into(),
                    input: json!({ "name": "i1", "functionName": "f" }),
                }),
            ],
        };
        let calls = msg.tool_calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "geogebra_plot_function");
        assert_eq!(calls[1].name, "geogebra_plot_integral");
    }

    #[test]
    fn tool_results_turn_has_tool_role() {
        let msg = Message::tool_results(vec![ToolResult::success("a", json!("ok"))]);
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_results_iter().count(), 1);
        assert!(msg.content().is_empty());
    }
}
