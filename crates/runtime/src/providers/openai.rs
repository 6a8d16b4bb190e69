//! OpenAI-compatible Chat Completions backend.
//!
//! Serves both the `openai` provider and `custom` endpoints that speak the
//! same wire format.

use crate::model::{Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, Usage};
use crate::tools::{ToolCall, ToolSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

// ─────────────────────────────────────────────────────────────────────────────
// API Wire Types
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<ChatTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ChatFunction,
}

#[derive(Debug, Serialize)]
struct ChatFunction {
    name: String,
    description: String,
    parameters: Value,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunctionCall,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    /// JSON-encoded argument object.
    #[serde(default)]
    arguments: String,
}

fn function_kind() -> String {
    "function".to_string()
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Backend Implementation
// ─────────────────────────────────────────────────────────────────────────────

/// Builder for creating an OpenAI-compatible backend.
#[derive(Debug, Clone)]
pub struct OpenAiBackendBuilder {
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
    temperature: f32,
    client: Option<reqwest::Client>,
}

impl OpenAiBackendBuilder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_tokens: super::DEFAULT_MAX_TOKENS,
            temperature: super::DEFAULT_TEMPERATURE,
            client: None,
        }
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn client(mut self, client: reqwest::Client) -> Self {
        self.client = Some(client);
        self
    }

    pub fn build(self) -> OpenAiBackend {
        OpenAiBackend {
            client: self.client.unwrap_or_default(),
            api_key: self.api_key,
            endpoint: format!("{}/chat/completions", self.base_url.trim_end_matches('/')),
            model: self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        }
    }
}

/// OpenAI-compatible API backend.
pub struct OpenAiBackend {
    client: reqwest::Client,
    api_key: String,
    endpoint: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
}

impl OpenAiBackend {
    pub fn builder(api_key: impl Into<String>, model: impl Into<String>) -> OpenAiBackendBuilder {
        OpenAiBackendBuilder::new(api_key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One canonical message can expand into several wire messages: every
    /// tool result is its own `tool` message.
    fn messages_to_api(messages: &[Message]) -> Vec<ChatMessage> {
        let mut out = Vec::with_capacity(messages.len());
        for msg in messages {
            match msg.role {
                Role::Tool => {
                    out.extend(msg.tool_results_iter().map(|result| ChatMessage {
                        role: "tool",
                        content: Some(result.content()),
                        tool_calls: Vec::new(),
                        tool_call_id: Some(result.tool_call_id().to_string()),
                    }));
                }
                role => {
                    let tool_calls: Vec<WireToolCall> = msg
                        .parts
                        .iter()
                        .filter_map(|part| match part {
                            Part::ToolCall(call) => Some(WireToolCall {
                                id: call.id.clone(),
                                kind: function_kind(),
                                function: WireFunctionCall {
                                    name: call.name.clone(),
                                    arguments: call.input.to_string(),
                                },
                            }),
                            _ => None,
                        })
                        .collect();
                    let text = msg.content();
                    out.push(ChatMessage {
                        role: match role {
                            Role::System => "system",
                            Role::Assistant => "assistant",
                            _ => "user",
                        },
                        content: (!text.is_empty() || tool_calls.is_empty()).then_some(text),
                        tool_calls,
                        tool_call_id: None,
                    });
                }
            }
        }
        out
    }

    fn tool_to_api(spec: &ToolSpec) -> ChatTool {
        ChatTool {
            kind: "function",
            function: ChatFunction {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.schema.clone(),
            },
        }
    }

    fn response_to_message(message: ResponseMessage) -> Message {
        let mut parts = Vec::new();
        if let Some(text) = message.content.filter(|text| !text.is_empty()) {
            parts.push(Part::Text(text));
        }
        parts.extend(
            message
                .tool_calls
                .unwrap_or_default()
                .into_iter()
                .filter(|call| call.kind == "function")
                .map(|call| {
                    Part::ToolCall(ToolCall {
                        id: call.id,
                        input: parse_arguments(&call.function.arguments),
                        name: call.function.name,
                    })
                }),
        );
        Message {
            role: Role::Assistant,
            parts,
        }
    }
}

/// Decode a function call's argument string.
///
/// An empty string means no arguments. Text that is not JSON is kept as a
/// string so validation can report it to the model.
fn parse_arguments(raw: &str) -> Value {
    if raw.trim().is_empty() {
        return Value::Object(Default::default());
    }
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

impl std::fmt::Display for OpenAiBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "openai({}, {})", self.model, self.endpoint)
    }
}

impl Backend for OpenAiBackend {
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
        let tools: Vec<ChatTool> = request.tools.iter().map(Self::tool_to_api).collect();
        let body = ChatRequest {
            model: self.model.clone(),
            messages: Self::messages_to_api(request.messages),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            tool_choice: (!tools.is_empty()).then_some("auto"),
            tools,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ModelError::Network(e.to_string()))?;

        let status = response.status();
        debug!(model = %self.model, %status, "chat completions response");

        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(ModelError::Auth(format!(
                "provider rejected the API key ({status})"
            )));
        }
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ModelError::Api(format!("{status}: {text}")));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;
        let usage = parsed
            .usage
            .map(|u| Usage {
                input_tokens: u.prompt_tokens,
                output_tokens: u.completion_tokens,
            })
            .unwrap_or_default();
        let choice = parsed.choices.into_iter().next().ok_or_else(|| {
            ModelError::InvalidResponse("missing choices[0].message".to_string())
        })?;

        Ok(ModelResponse {
            message: Self::response_to_message(choice.message),
            usage,
        })
    }
}
