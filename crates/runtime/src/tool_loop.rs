//! The tool-call loop.
//!
//! One chat request runs one loop: invoke the model, dispatch whatever
//! tools it asks for, feed the results back, and repeat until the model
//! answers without tools or the iteration ceiling is reached.

use crate::model::{Backend, Message, ModelError, ModelRequest, Part, Usage};
use crate::tools::{ToolCall, ToolHost, ToolResult};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Limits and canned replies for the loop.
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum number of model invocations per request.
    pub max_iterations: u32,
    /// Reply used when the model ends with neither text nor tool calls.
    pub fallback_reply: String,
    /// Reply used when the ceiling is reached while the model still calls tools.
    pub exhausted_reply: String,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 5,
            fallback_reply: "Operation completed.".to_string(),
            exhausted_reply: "All operations have been carried out.".to_string(),
        }
    }
}

/// How the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model answered with text and no tool calls.
    Completed,
    /// The model answered with neither text nor tool calls.
    Fallback,
    /// The iteration ceiling was reached while the model still called tools.
    Exhausted,
}

/// One dispatched tool call and its outcome.
#[derive(Debug, Clone)]
pub struct ToolCallRecord {
    pub call: ToolCall,
    pub result: ToolResult,
}

impl ToolCallRecord {
    pub fn is_failure(&self) -> bool {
        self.result.is_failure()
    }
}

/// Everything a finished loop produced.
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    pub reply: String,
    /// Every dispatched call, in dispatch order.
    pub tool_calls: Vec<ToolCallRecord>,
    pub termination: Termination,
    pub model_calls: u32,
    pub usage: Usage,
}

impl LoopOutcome {
    pub fn failed_calls(&self) -> usize {
        self.tool_calls.iter().filter(|r| r.is_failure()).count()
    }
}

/// Drives a backend and a tool host through one request.
pub struct ToolLoop<'a, B, H> {
    backend: &'a B,
    host: &'a H,
    config: &'a LoopConfig,
}

impl<'a, B: Backend, H: ToolHost> ToolLoop<'a, B, H> {
    pub fn new(backend: &'a B, host: &'a H, config: &'a LoopConfig) -> Self {
        Self {
            backend,
            host,
            config,
        }
    }

    /// Run the loop over `history`, which ends with the new user message.
    ///
    /// A provider failure aborts the run; tool failures never do.
    pub async fn run(
        &self,
        system_prompt: &str,
        history: Vec<Message>,
    ) -> Result<LoopOutcome, ModelError> {
        let mut conversation = Vec::with_capacity(history.len() + 1);
        conversation.push(Message::system(system_prompt));
        conversation.extend(history);

        let tools = self.host.specs();
        let mut records = Vec::new();
        let mut usage = Usage::default();
        let mut iteration = 0;

        while iteration < self.config.max_iterations {
            iteration += 1;
            let response = self
                .backend
                .call(ModelRequest {
                    messages: &conversation,
                    tools,
                })
                .await?;
            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;

            let mut message = response.message;
            assign_missing_ids(&mut message);
            let calls = message.tool_calls();
            let content = message.content();
            info!(
                iteration,
                max = self.config.max_iterations,
                tool_calls = calls.len(),
                has_content = !content.trim().is_empty(),
                "model responded"
            );

            if calls.is_empty() {
                let (reply, termination) = if content.trim().is_empty() {
                    (self.config.fallback_reply.clone(), Termination::Fallback)
                } else {
                    (content, Termination::Completed)
                };
                info!(?termination, model_calls = iteration, "tool loop finished");
                return Ok(LoopOutcome {
                    reply,
                    tool_calls: records,
                    termination,
                    model_calls: iteration,
                    usage,
                });
            }

            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                let result = match self.host.execute(&call).await {
                    Ok(output) => {
                        debug!(iteration, tool = %call.name, id = %call.id, "tool succeeded");
                        ToolResult::success(&call.id, output)
                    }
                    Err(error) => {
                        warn!(iteration, tool = %call.name, id = %call.id, %error, "tool failed");
                        ToolResult::failure(&call.id, error)
                    }
                };
                results.push(result.clone());
                records.push(ToolCallRecord { call, result });
            }

            conversation.push(message);
            conversation.push(Message::tool_results(results));
        }

        warn!(
            max = self.config.max_iterations,
            tool_calls = records.len(),
            "tool loop reached iteration ceiling"
        );
        Ok(LoopOutcome {
            reply: self.config.exhausted_reply.clone(),
            tool_calls: records,
            termination: Termination::Exhausted,
            model_calls: iteration,
            usage,
        })
    }
}

fn assign_missing_ids(message: &mut Message) {
    for part in &mut message.parts {
        if let Part::ToolCall(call) = part {
            if call.id.trim().is_empty() {
                call.id = format!("call_{}", Uuid::new_v4());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelResponse, Role};
    use crate::tools::{ToolError, ToolSpec};
    use serde_json::{Value, json};
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays canned model turns and records every request it sees.
    #[derive(Default)]
    struct ScriptedBackend {
        script: Mutex<VecDeque<Message>>,
        requests: Mutex<Vec<Vec<Message>>>,
        /// Returned once the script runs dry.
        repeat: Option<Message>,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Message>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Self::default()
            }
        }

        fn repeating(message: Message) -> Self {
            Self {
                repeat: Some(message),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    impl Backend for ScriptedBackend {
        async fn call(&self, request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
            self.requests.lock().unwrap().push(request.messages.to_vec());
            let message = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .or_else(|| self.repeat.clone())
                .ok_or_else(|| ModelError::Api("script exhausted".into()))?;
            Ok(ModelResponse {
                message,
                usage: Usage {
                    input_tokens: 10,
                    output_tokens: 5,
                },
            })
        }
    }

    struct FailingBackend;

    impl Backend for FailingBackend {
        async fn call(&self, _request: ModelRequest<'_>) -> Result<ModelResponse, ModelError> {
            Err(ModelError::Auth("401 Unauthorized".into()))
        }
    }

    /// Knows every `geogebra_*` tool except `geogebra_teleport`.
    #[derive(Default)]
    struct RecordingHost {
        executed: Mutex<Vec<String>>,
    }

    impl ToolHost for RecordingHost {
        fn specs(&self) -> &[ToolSpec] {
            &[]
        }

        async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
            self.executed.lock().unwrap().push(call.id.clone());
            if call.name == "geogebra_teleport" {
                return Err(ToolError::NotFound(call.name.clone()));
            }
            Ok(json!({ "success": true, "command": call.name }))
        }
    }

    fn tool_turn(calls: &[(&str, &str)]) -> Message {
        Message {
            role: Role::Assistant,
            parts: calls
                .iter()
                .map(|(id, name)| {
                    Part::ToolCall(ToolCall {
                        id: id.to_string(),
                        name: name.to_string(),
                        input: json!({}),
                    })
                })
                .collect(),
        }
    }

    async fn run<B: Backend>(backend: &B, host: &RecordingHost) -> Result<LoopOutcome, ModelError> {
        let config = LoopConfig::default();
        ToolLoop::new(backend, host, &config)
            .run("You draw graphs.", vec![Message::user("Plot x^2")])
            .await
    }

    #[tokio::test]
    async fn text_reply_ends_loop_immediately() {
        let backend = ScriptedBackend::new(vec![Message::assistant("Done")]);
        let host = RecordingHost::default();

        let outcome = run(&backend, &host).await.unwrap();

        assert_eq!(outcome.reply, "Done");
        assert!(outcome.tool_calls.is_empty());
        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.model_calls, 1);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(requests[0][0].role, Role::System);
        assert_eq!(requests[0][1].content(), "Plot x^2");
    }

    #[tokio::test]
    async fn empty_reply_uses_fallback() {
        let backend = ScriptedBackend::new(vec![Message {
            role: Role::Assistant,
            parts: Vec::new(),
        }]);
        let outcome = run(&backend, &RecordingHost::default()).await.unwrap();
        assert_eq!(outcome.reply, "Operation completed.");
        assert_eq!(outcome.termination, Termination::Fallback);
    }

    #[tokio::test]
    async fn all_calls_dispatched_before_next_invocation() {
        let backend = ScriptedBackend::new(vec![
            tool_turn(&[
                ("a", "geogebra_plot_function"),
                ("b", "geogebra_plot_integral"),
                ("c", "geogebra_create_point"),
            ]),
            Message::assistant("Here is the area under f."),
        ]);
        let host = RecordingHost::default();

        let outcome = run(&backend, &host).await.unwrap();

        assert_eq!(backend.calls(), 2);
        assert_eq!(*host.executed.lock().unwrap(), vec!["a", "b", "c"]);
        assert_eq!(outcome.reply, "Here is the area under f.");
        assert_eq!(outcome.tool_calls.len(), 3);
        assert_eq!(outcome.usage.input_tokens, 20);

        // Second request carries the model turn, then one result turn.
        let requests = backend.requests.lock().unwrap();
        let second = &requests[1];
        assert_eq!(second.len(), 4);
        assert_eq!(second[2].tool_calls().len(), 3);
        let ids: Vec<_> = second[3]
            .tool_results_iter()
            .map(|r| r.tool_call_id().to_string())
            .collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn unknown_tool_is_reported_and_loop_continues() {
        let backend = ScriptedBackend::new(vec![
            tool_turn(&[("t1", "geogebra_teleport"), ("t2", "geogebra_create_point")]),
            Message::assistant("I cannot teleport, but I drew the point."),
        ]);
        let host = RecordingHost::default();

        let outcome = run(&backend, &host).await.unwrap();

        assert_eq!(outcome.termination, Termination::Completed);
        assert_eq!(outcome.failed_calls(), 1);
        assert!(outcome.tool_calls[0].is_failure());
        assert!(!outcome.tool_calls[1].is_failure());

        let requests = backend.requests.lock().unwrap();
        let results: Vec<_> = requests[1][3].tool_results_iter().collect();
        assert_eq!(results[0].content(), "Error: tool not found: geogebra_teleport");
    }

    #[tokio::test]
    async fn ceiling_stops_a_model_that_never_stops_calling_tools() {
        let backend = ScriptedBackend::repeating(tool_turn(&[("x", "geogebra_create_point")]));
        let host = RecordingHost::default();

        let outcome = run(&backend, &host).await.unwrap();

        assert_eq!(backend.calls(), 5);
        assert_eq!(outcome.model_calls, 5);
        assert_eq!(outcome.termination, Termination::Exhausted);
        assert_eq!(outcome.reply, "All operations have been carried out.");
        assert_eq!(outcome.tool_calls.len(), 5);
        assert_eq!(host.executed.lock().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn missing_ids_are_generated_and_fed_back() {
        let backend = ScriptedBackend::new(vec![
            tool_turn(&[("", "geogebra_create_point")]),
            Message::assistant("ok"),
        ]);
        let outcome = run(&backend, &RecordingHost::default()).await.unwrap();

        let id = &outcome.tool_calls[0].call.id;
        assert!(id.starts_with("call_"));
        assert_eq!(outcome.tool_calls[0].result.tool_call_id(), id);

        let requests = backend.requests.lock().unwrap();
        assert_eq!(&requests[1][2].tool_calls()[0].id, id);
    }

    #[tokio::test]
    async fn provider_failure_aborts_the_run() {
        let err = run(&FailingBackend, &RecordingHost::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ModelError::Auth(_)));
    }
}
