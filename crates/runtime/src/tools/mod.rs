//! Tool catalog, tool hosts and the GeoGebra command executor.

pub mod catalog;
pub mod errors;
mod empty;
mod geogebra;
mod host;
mod types;

pub use catalog::{Arguments, ParamType, ParameterSpec, ToolDefinition};
pub use empty::EmptyToolHost;
pub use errors::ToolError;
pub use geogebra::{ExecutionResult, GeoGebraHost, render_call};
pub use host::ToolHost;
pub use types::{ToolCall, ToolResult, ToolSpec};
