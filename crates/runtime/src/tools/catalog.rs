//! The GeoGebra tool catalog.
//!
//! Every tool the model may call is declared here once, with a typed
//! parameter list. The same declaration produces the JSON Schema advertised
//! to the model and validates the arguments the model sends back, so the
//! two can never drift apart.

use crate::tools::{ToolError, ToolSpec};
use serde_json::{Map, Value, json};
use std::sync::LazyLock;

pub const CREATE_POINT: &str = "geogebra_create_point";
pub const CREATE_LINE: &str = "geogebra_create_line";
pub const CREATE_CIRCLE: &str = "geogebra_create_circle";
pub const PLOT_FUNCTION: &str = "geogebra_plot_function";
pub const CREATE_POLYGON: &str = "geogebra_create_polygon";
pub const CLEAR_CONSTRUCTION: &str = "geogebra_clear_construction";
pub const PLOT_INTEGRAL: &str = "geogebra_plot_integral";
pub const EVAL_COMMAND: &str = "geogebra_eval_command";

/// The JSON type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Number,
    StringList,
}

impl ParamType {
    fn schema(self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Number => json!({ "type": "number" }),
            Self::StringList => json!({ "type": "array", "items": { "type": "string" } }),
        }
    }
}

/// One named parameter of a tool.
#[derive(Debug, Clone, Copy)]
pub struct ParameterSpec {
    pub name: &'static str,
    pub kind: ParamType,
    pub required: bool,
    pub description: &'static str,
}

const fn required(name: &'static str, kind: ParamType, description: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        required: true,
        description,
    }
}

const fn optional(name: &'static str, kind: ParamType, description: &'static str) -> ParameterSpec {
    ParameterSpec {
        name,
        kind,
        required: false,
        description,
    }
}

/// A statically declared tool.
#[derive(Debug, Clone, Copy)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: &'static [ParameterSpec],
}

static CATALOG: [ToolDefinition; 8] = [
    ToolDefinition {
        name: CREATE_POINT,
        description: "Create a point in GeoGebra.",
        parameters: &[
            required("name", ParamType::String, "Name of the point, e.g. \"A\" or \"P1\""),
            required("x", ParamType::Number, "X coordinate of the point"),
            required("y", ParamType::Number, "Y coordinate of the point"),
        ],
    },
    ToolDefinition {
        name: CREATE_LINE,
        description: "Create a line through two existing points.",
        parameters: &[
            required("name", ParamType::String, "Name of the line"),
            required("point1", ParamType::String, "Name of the first point"),
            required("point2", ParamType::String, "Name of the second point"),
        ],
    },
    ToolDefinition {
        name: CREATE_CIRCLE,
        description: "Create a circle around an existing center point.",
        parameters: &[
            required("name", ParamType::String, "Name of the circle"),
            required("center", ParamType::String, "Name of the center point"),
            required("radius", ParamType::Number, "Radius of the circle"),
        ],
    },
    ToolDefinition {
        name: PLOT_FUNCTION,
        description: "Plot a function of x.",
        parameters: &[
            required("name", ParamType::String, "Name of the function, e.g. \"f\" or \"g\""),
            required(
                "expression",
                ParamType::String,
                "Function expression, e.g. \"x^2\" or \"sin(x)\"",
            ),
            optional("xMin", ParamType::Number, "Lower end of the domain (optional)"),
            optional("xMax", ParamType::Number, "Upper end of the domain (optional)"),
            optional("color", ParamType::String, "Color of the graph (optional)"),
        ],
    },
    ToolDefinition {
        name: CREATE_POLYGON,
        description: "Create a polygon from existing points.",
        parameters: &[
            required("name", ParamType::String, "Name of the polygon"),
            required("vertices", ParamType::StringList, "Names of the vertex points, in order"),
        ],
    },
    ToolDefinition {
        name: CLEAR_CONSTRUCTION,
        description: "Remove every object from the GeoGebra construction.",
        parameters: &[],
    },
    ToolDefinition {
        name: PLOT_INTEGRAL,
        description: "Visualize a definite integral by shading the area between a function and \
                      the x-axis. The function must be defined before this tool is called.",
        parameters: &[
            required("name", ParamType::String, "Name of the integral object"),
            required(
                "functionName",
                ParamType::String,
                "Name of an already defined function to integrate",
            ),
            required("lowerBound", ParamType::Number, "Lower bound of integration"),
            required("upperBound", ParamType::Number, "Upper bound of integration"),
        ],
    },
    ToolDefinition {
        name: EVAL_COMMAND,
        description: "Run a raw GeoGebra command. Use only when no other tool fits.",
        parameters: &[required(
            "command",
            ParamType::String,
            "GeoGebra command, e.g. \"A = (1, 2)\" or \"Integral(f, 0, 2)\"",
        )],
    },
];

static SPECS: LazyLock<Vec<ToolSpec>> =
    LazyLock::new(|| CATALOG.iter().map(ToolDefinition::to_spec).collect());

/// Every tool in the catalog.
pub fn definitions() -> &'static [ToolDefinition] {
    &CATALOG
}

/// Look up a tool by name.
pub fn find(name: &str) -> Option<&'static ToolDefinition> {
    CATALOG.iter().find(|def| def.name == name)
}

/// The catalog in the provider-neutral format offered to the model.
pub fn specs() -> &'static [ToolSpec] {
    &SPECS
}

impl ToolDefinition {
    /// JSON Schema for the tool's arguments object.
    pub fn json_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in self.parameters {
            let mut schema = param.kind.schema();
            schema["description"] = Value::String(param.description.to_string());
            properties.insert(param.name.to_string(), schema);
        }
        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|param| param.required)
            .map(|param| param.name)
            .collect();

        let mut schema = json!({
            "type": "object",
            "properties": properties,
            "additionalProperties": false,
        });
        if !required.is_empty() {
            schema["required"] = json!(required);
        }
        schema
    }

    pub fn to_spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name.to_string(),
            description: self.description.to_string(),
            schema: self.json_schema(),
        }
    }

    /// Check and coerce the arguments of one call.
    ///
    /// Numbers sent as numeric strings are accepted, scalars are accepted
    /// where a string is expected, and keys the tool does not declare are
    /// dropped. A required parameter that is absent or `null` is an error.
    pub fn validate(&self, input: &Value) -> Result<Arguments, ToolError> {
        let empty = Map::new();
        let fields = match input {
            Value::Object(fields) => fields,
            Value::Null => &empty,
            other => {
                return Err(ToolError::InvalidInput(format!(
                    "{}: arguments must be an object, got {other}",
                    self.name
                )));
            }
        };

        let mut values = Map::new();
        for param in self.parameters {
            match fields.get(param.name) {
                None | Some(Value::Null) if param.required => {
                    return Err(ToolError::InvalidInput(format!(
                        "{}: missing required parameter `{}`",
                        self.name, param.name
                    )));
                }
                None | Some(Value::Null) => {}
                Some(value) => {
                    let coerced = coerce(param, value).ok_or_else(|| {
                        ToolError::InvalidInput(format!(
                            "{}: parameter `{}` must be {}, got {value}",
                            self.name,
                            param.name,
                            expected(param.kind)
                        ))
                    })?;
                    values.insert(param.name.to_string(), coerced);
                }
            }
        }
        Ok(Arguments {
            tool: self.name,
            values,
        })
    }
}

fn expected(kind: ParamType) -> &'static str {
    match kind {
        ParamType::String => "a string",
        ParamType::Number => "a number",
        ParamType::StringList => "a list of strings",
    }
}

fn coerce(param: &ParameterSpec, value: &Value) -> Option<Value> {
    match param.kind {
        ParamType::String => scalar_text(value).map(Value::String),
        ParamType::Number => {
            let number = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => s.trim().parse::<f64>().ok(),
                _ => None,
            }?;
            if !number.is_finite() {
                return None;
            }
            serde_json::Number::from_f64(number).map(Value::Number)
        }
        ParamType::StringList => {
            let items = value.as_array()?;
            items
                .iter()
                .map(|item| scalar_text(item).map(Value::String))
                .collect::<Option<Vec<_>>>()
                .map(Value::Array)
        }
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Arguments of one call after validation.
///
/// Every required parameter is present with its declared type.
#[derive(Debug, Clone)]
pub struct Arguments {
    tool: &'static str,
    values: Map<String, Value>,
}

impl Arguments {
    pub fn string(&self, name: &str) -> Result<&str, ToolError> {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| self.missing(name))
    }

    pub fn number(&self, name: &str) -> Result<f64, ToolError> {
        self.optional_number(name).ok_or_else(|| self.missing(name))
    }

    pub fn optional_number(&self, name: &str) -> Option<f64> {
        self.values.get(name).and_then(Value::as_f64)
    }

    pub fn string_list(&self, name: &str) -> Result<Vec<String>, ToolError> {
        let items = self
            .values
            .get(name)
            .and_then(Value::as_array)
            .ok_or_else(|| self.missing(name))?;
        Ok(items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect())
    }

    fn missing(&self, name: &str) -> ToolError {
        ToolError::InvalidInput(format!("{}: missing parameter `{name}`", self.tool))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_are_unique() {
        let mut names: Vec<_> = definitions().iter().map(|def| def.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 8);
        assert_eq!(specs().len(), 8);
    }

    #[test]
    fn schema_lists_required_parameters() {
        let schema = find(PLOT_FUNCTION).unwrap().json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["required"], json!(["name", "expression"]));
        assert_eq!(schema["properties"]["xMin"]["type"], "number");
        assert_eq!(schema["additionalProperties"], false);
    }

    #[test]
    fn polygon_vertices_are_a_string_array() {
        let schema = find(CREATE_POLYGON).unwrap().json_schema();
        assert_eq!(schema["properties"]["vertices"]["type"], "array");
        assert_eq!(schema["properties"]["vertices"]["items"]["type"], "string");
    }

    #[test]
    fn clear_has_no_required_list() {
        let schema = find(CLEAR_CONSTRUCTION).unwrap().json_schema();
        assert!(schema.get("required").is_none());
        assert!(schema["properties"].as_object().unwrap().is_empty());
    }

    #[test]
    fn validate_coerces_numeric_strings() {
        let args = find(PLOT_INTEGRAL)
            .unwrap()
            .validate(&json!({
                "name": "i1",
                "functionName": "f",
                "lowerBound": "0",
                "upperBound": 2,
            }))
            .unwrap();
        assert_eq!(args.number("lowerBound").unwrap(), 0.0);
        assert_eq!(args.number("upperBound").unwrap(), 2.0);
    }

    #[test]
    fn validate_coerces_scalars_to_strings() {
        let args = find(CREATE_POINT)
            .unwrap()
            .validate(&json!({ "name": 1, "x": 0, "y": 0 }))
            .unwrap();
        assert_eq!(args.string("name").unwrap(), "1");
    }

    #[test]
    fn validate_rejects_missing_and_null_required() {
        let def = find(CREATE_POINT).unwrap();

        let err = def.validate(&json!({ "name": "A", "x": 1 })).unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("`y`")));

        let err = def
            .validate(&json!({ "name": "A", "x": 1, "y": null }))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }

    #[test]
    fn validate_rejects_non_numeric_numbers() {
        let err = find(CREATE_CIRCLE)
            .unwrap()
            .validate(&json!({ "name": "c", "center": "M", "radius": "big" }))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(msg) if msg.contains("a number")));
    }

    #[test]
    fn validate_ignores_unknown_keys_and_accepts_null_input() {
        let args = find(EVAL_COMMAND)
            .unwrap()
            .validate(&json!({ "command": "A = (1, 2)", "extra": true }))
            .unwrap();
        assert_eq!(args.string("command").unwrap(), "A = (1, 2)");
        assert!(args.string("extra").is_err());

        assert!(find(CLEAR_CONSTRUCTION).unwrap().validate(&Value::Null).is_ok());
    }

    #[test]
    fn validate_rejects_non_object_input() {
        let err = find(EVAL_COMMAND)
            .unwrap()
            .validate(&json!("Delete(*)"))
            .unwrap_err();
        assert!(matches!(err, ToolError::InvalidInput(_)));
    }
}
