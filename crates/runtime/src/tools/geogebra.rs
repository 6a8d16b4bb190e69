//! GeoGebra command executor.

use crate::tools::catalog::{self, Arguments};
use crate::tools::{ToolCall, ToolError, ToolHost, ToolSpec};
use engine::{Command, Engine, ObjectInfo};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

/// Outcome of one executed tool call, as reported to the model and the
/// browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
    pub success: bool,
    /// The command string the call rendered to.
    pub command: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object_info: Option<ObjectInfo>,
}

impl ExecutionResult {
    fn succeeded(command: String) -> Self {
        Self {
            success: true,
            command,
            error: None,
            output: None,
            object_info: None,
        }
    }

    fn failed(command: String, error: impl Into<String>) -> Self {
        Self {
            success: false,
            command,
            error: Some(error.into()),
            output: None,
            object_info: None,
        }
    }
}

/// Executes catalog tools as GeoGebra commands.
///
/// Without an engine the host runs in local mode: commands are rendered
/// and returned for the browser to run. With an engine (managed mode) each
/// command is evaluated and the created object is queried afterwards.
pub struct GeoGebraHost<'a, E> {
    engine: Option<&'a E>,
}

impl<E> GeoGebraHost<'_, E> {
    /// A host that only renders commands.
    pub fn local() -> Self {
        Self { engine: None }
    }

    pub fn is_managed(&self) -> bool {
        self.engine.is_some()
    }
}

impl<'a, E: Engine> GeoGebraHost<'a, E> {
    /// A host that runs commands against a live engine.
    pub fn managed(engine: &'a E) -> Self {
        Self {
            engine: Some(engine),
        }
    }

    /// Run one tool.
    ///
    /// Unknown tools and invalid arguments are errors raised before anything
    /// is rendered. Engine failures are not errors: they come back as a
    /// result with `success: false`.
    pub async fn dispatch(&self, tool: &str, input: &Value) -> Result<ExecutionResult, ToolError> {
        let command = render_call(tool, input)?;
        let rendered = command.render();

        let Some(engine) = self.engine else {
            debug!(tool, command = %rendered, "rendered command");
            return Ok(ExecutionResult::succeeded(rendered));
        };

        if matches!(command, Command::Clear) {
            return Ok(match engine.new_construction().await {
                Ok(()) => ExecutionResult::succeeded(rendered),
                Err(err) => {
                    warn!(error = %err, "failed to reset construction");
                    ExecutionResult::failed(rendered, err.to_string())
                }
            });
        }

        let outcome = match engine.eval_command(&rendered).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(tool, command = %rendered, error = %err, "engine unavailable");
                return Ok(ExecutionResult::failed(rendered, err.to_string()));
            }
        };
        if !outcome.success {
            let reason = outcome
                .error
                .unwrap_or_else(|| "command rejected by engine".to_string());
            debug!(tool, command = %rendered, %reason, "engine rejected command");
            return Ok(ExecutionResult::failed(rendered, reason));
        }

        let object_info = match command.object_name() {
            Some(name) => match engine.object_info(name).await {
                Ok(info) => info,
                Err(err) => {
                    warn!(object = name, error = %err, "could not query created object");
                    None
                }
            },
            None => None,
        };
        debug!(tool, command = %rendered, "command evaluated");

        Ok(ExecutionResult {
            output: outcome.result.map(|value| match value {
                Value::String(text) => text,
                other => other.to_string(),
            }),
            object_info,
            ..ExecutionResult::succeeded(rendered)
        })
    }
}

impl<E: Engine> ToolHost for GeoGebraHost<'_, E> {
    fn specs(&self) -> &[ToolSpec] {
        catalog::specs()
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ToolError> {
        let result = self.dispatch(&call.name, &call.input).await?;
        if !result.success {
            return Err(ToolError::Rejected {
                reason: result.error.unwrap_or_default(),
                command: result.command,
            });
        }
        serde_json::to_value(&result)
            .map_err(|err| ToolError::InvalidInput(format!("unserializable result: {err}")))
    }
}

/// Translate one tool call into its engine command.
///
/// The translation is pure: the same tool and arguments always produce the
/// same command.
pub fn render_call(tool: &str, input: &Value) -> Result<Command, ToolError> {
    let definition = catalog::find(tool).ok_or_else(|| ToolError::NotFound(tool.to_string()))?;
    let args = definition.validate(input)?;
    build(tool, &args)
}

fn build(tool: &str, args: &Arguments) -> Result<Command, ToolError> {
    let name = || args.string("name").map(str::to_string);
    let command = match tool {
        catalog::CREATE_POINT => Command::Point {
            name: name()?,
            x: args.number("x")?,
            y: args.number("y")?,
        },
        catalog::CREATE_LINE => Command::Line {
            name: name()?,
            point1: args.string("point1")?.to_string(),
            point2: args.string("point2")?.to_string(),
        },
        catalog::CREATE_CIRCLE => Command::Circle {
            name: name()?,
            center: args.string("center")?.to_string(),
            radius: args.number("radius")?,
        },
        catalog::PLOT_FUNCTION => Command::Function {
            name: name()?,
            expression: args.string("expression")?.to_string(),
            domain: args
                .optional_number("xMin")
                .zip(args.optional_number("xMax")),
        },
        catalog::CREATE_POLYGON => Command::Polygon {
            name: name()?,
            vertices: args.string_list("vertices")?,
        },
        catalog::CLEAR_CONSTRUCTION => Command::Clear,
        catalog::PLOT_INTEGRAL => Command::Integral {
            name: name()?,
            function: args.string("functionName")?.to_string(),
            lower: args.number("lowerBound")?,
            upper: args.number("upperBound")?,
        },
        catalog::EVAL_COMMAND => Command::Raw(args.string("command")?.to_string()),
        other => return Err(ToolError::NotFound(other.to_string())),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::CommandOutcome;
    use serde_json::json;
    use std::sync::Mutex;

    /// In-memory engine that records commands and rejects a chosen one.
    #[derive(Default)]
    struct RecordingEngine {
        commands: Mutex<Vec<String>>,
        resets: Mutex<u32>,
        reject: Option<&'static str>,
        offline: bool,
    }

    impl Engine for RecordingEngine {
        async fn eval_command(&self, command: &str) -> engine::Result<CommandOutcome> {
            if self.offline {
                return Err(engine::Error::Transport("connection refused".into()));
            }
            self.commands.lock().unwrap().push(command.to_string());
            if self.reject == Some(command) {
                return Ok(CommandOutcome::rejected("Undefined variable"));
            }
            Ok(CommandOutcome::accepted())
        }

        async fn object_info(&self, name: &str) -> engine::Result<Option<ObjectInfo>> {
            Ok(Some(ObjectInfo {
                name: name.to_string(),
                kind: "function".into(),
                value: None,
                visible: true,
                defined: true,
                x: None,
                y: None,
                z: None,
                color: None,
            }))
        }

        async fn object_names(&self) -> engine::Result<Vec<String>> {
            Ok(Vec::new())
        }

        async fn new_construction(&self) -> engine::Result<()> {
            *self.resets.lock().unwrap() += 1;
            Ok(())
        }

        async fn export_png(&self) -> engine::Result<String> {
            Ok(String::new())
        }
    }

    fn local() -> GeoGebraHost<'static, RecordingEngine> {
        GeoGebraHost::local()
    }

    #[tokio::test]
    async fn plots_function_locally() {
        let result = local()
            .dispatch("geogebra_plot_function", &json!({ "name": "f", "expression": "x^2" }))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.command, "f(x) = x^2");
        assert!(result.object_info.is_none());
    }

    #[tokio::test]
    async fn plots_integral_locally() {
        let result = local()
            .dispatch(
                "geogebra_plot_integral",
                &json!({ "name": "i1", "functionName": "f", "lowerBound": 0, "upperBound": 2 }),
            )
            .await
            .unwrap();
        assert_eq!(result.command, "i1 = Integral(f, 0, 2)");
    }

    #[test]
    fn renders_every_catalog_tool() {
        let cases = [
            ("geogebra_create_point", json!({ "name": "A", "x": 1, "y": "2.5" }), "A = (1, 2.5)"),
            (
                "geogebra_create_line",
                json!({ "name": "l", "point1": "A", "point2": "B" }),
                "l = Line(A, B)",
            ),
            (
                "geogebra_create_circle",
                json!({ "name": "c", "center": "M", "radius": 3 }),
                "c = Circle(M, 3)",
            ),
            (
                "geogebra_plot_function",
                json!({ "name": "g", "expression": "sin(x)", "xMin": -1, "xMax": 1, "color": "red" }),
                "g(x) = If(-1 <= x <= 1, sin(x), ?)",
            ),
            (
                "geogebra_create_polygon",
                json!({ "name": "t", "vertices": ["A", "B", "C"] }),
                "t = Polygon(A, B, C)",
            ),
            ("geogebra_clear_construction", json!({}), "Delete(*)"),
            (
                "geogebra_eval_command",
                json!({ "command": "Tangent(A, c)" }),
                "Tangent(A, c)",
            ),
        ];
        for (tool, input, expected) in cases {
            assert_eq!(render_call(tool, &input).unwrap().render(), expected, "{tool}");
        }
    }

    #[test]
    fn one_sided_domain_is_ignored() {
        let command = render_call(
            "geogebra_plot_function",
            &json!({ "name": "f", "expression": "x^2", "xMin": 0 }),
        )
        .unwrap();
        assert_eq!(command.render(), "f(x) = x^2");
    }

    #[test]
    fn rendering_is_idempotent() {
        let input = json!({ "name": "i1", "functionName": "f", "lowerBound": 0, "upperBound": 2 });
        let first = render_call("geogebra_plot_integral", &input).unwrap();
        let second = render_call("geogebra_plot_integral", &input).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.render(), second.render());
    }

    #[tokio::test]
    async fn unknown_tool_is_not_found() {
        let err = local()
            .dispatch("geogebra_teleport", &json!({ "to": "mars" }))
            .await
            .unwrap_err();
        assert_eq!(err, ToolError::NotFound("geogebra_teleport".into()));
    }

    #[tokio::test]
    async fn invalid_arguments_never_reach_the_engine() {
        let engine = RecordingEngine::default();
        let host = GeoGebraHost::managed(&engine);
        let err = host
            .dispatch("geogebra_create_point", &json!({ "name": "A" }))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
        assert!(engine.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn managed_mode_queries_created_object() {
        let engine = RecordingEngine::default();
        let host = GeoGebraHost::managed(&engine);
        assert!(host.is_managed());

        let result = host
            .dispatch("geogebra_plot_function", &json!({ "name": "f", "expression": "x^2" }))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.object_info.unwrap().name, "f");
        assert_eq!(*engine.commands.lock().unwrap(), vec!["f(x) = x^2".to_string()]);
    }

    #[tokio::test]
    async fn engine_rejection_is_a_failed_result() {
        let engine = RecordingEngine {
            reject: Some("i1 = Integral(g, 0, 2)"),
            ..RecordingEngine::default()
        };
        let host = GeoGebraHost::managed(&engine);
        let input = json!({ "name": "i1", "functionName": "g", "lowerBound": 0, "upperBound": 2 });

        let result = host.dispatch("geogebra_plot_integral", &input).await.unwrap();
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("Undefined variable"));

        let call = ToolCall {
            id: "call_1".into(),
            name: "geogebra_plot_integral".into(),
            input,
        };
        let err = host.execute(&call).await.unwrap_err();
        assert_eq!(
            err,
            ToolError::Rejected {
                command: "i1 = Integral(g, 0, 2)".into(),
                reason: "Undefined variable".into(),
            }
        );
    }

    #[tokio::test]
    async fn unreachable_engine_is_a_failed_result() {
        let engine = RecordingEngine {
            offline: true,
            ..RecordingEngine::default()
        };
        let result = GeoGebraHost::managed(&engine)
            .dispatch("geogebra_create_point", &json!({ "name": "A", "x": 0, "y": 0 }))
            .await
            .unwrap();
        assert!(!result.success);
        assert!(result.error.unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn managed_clear_starts_new_construction() {
        let engine = RecordingEngine::default();
        let result = GeoGebraHost::managed(&engine)
            .dispatch("geogebra_clear_construction", &Value::Null)
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.command, "Delete(*)");
        assert_eq!(*engine.resets.lock().unwrap(), 1);
        assert!(engine.commands.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn execute_returns_camel_case_payload() {
        let call = ToolCall {
            id: "call_1".into(),
            name: "geogebra_create_point".into(),
            input: json!({ "name": "A", "x": 1, "y": 2 }),
        };
        let output = local().execute(&call).await.unwrap();
        assert_eq!(output, json!({ "success": true, "command": "A = (1, 2)" }));
        assert_eq!(local().specs().len(), 8);
    }
}
