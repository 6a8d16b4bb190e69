//! Tutor runtime: the LLM tool-call loop and everything it drives.
//!
//! # Overview
//!
//! - **Model** ([`model`]): provider-neutral messages and the [`Backend`]
//!   trait.
//! - **Providers** ([`providers`]): Anthropic Messages and OpenAI-compatible
//!   Chat Completions backends, selected per session through [`Provider`].
//! - **Tools** ([`tools`]): the GeoGebra tool catalog and the
//!   [`GeoGebraHost`] executor that turns tool calls into engine commands.
//! - **Loop** ([`ToolLoop`]): invokes the model, dispatches tool calls in
//!   order, feeds results back, and stops on a plain reply or at the
//!   iteration ceiling.
//! - **Agents** ([`AgentRegistry`]): tutoring personas with their prompts.
//!
//! # Example
//!
//! ```no_run
//! use engine::BridgeEngine;
//! use runtime::{AgentRegistry, GeoGebraHost, LoopConfig, Message, Provider, ToolLoop};
//! use storage::SessionConfig;
//!
//! # async fn example() -> runtime::Result<()> {
//! let config = SessionConfig::new(storage::Provider::OpenAi, "sk-...", "gpt-4");
//! let backend = Provider::from_config(&config, reqwest::Client::new())?;
//! let agent = AgentRegistry::builtin().resolve(None)?;
//! let host = GeoGebraHost::<BridgeEngine>::local();
//! let loop_config = LoopConfig::default();
//!
//! let outcome = ToolLoop::new(&backend, &host, &loop_config)
//!     .run(agent.system_prompt, vec![Message::user("Plot x^2")])
//!     .await?;
//! println!("{}", outcome.reply);
//! # Ok(())
//! # }
//! ```

pub mod agents;
mod error;
pub mod model;
pub mod providers;
mod tool_loop;
pub mod tools;

pub use agents::{Agent, AgentRegistry};
pub use error::{Error, Result};
pub use model::{Backend, Message, ModelError, ModelRequest, ModelResponse, Part, Role, Usage};
pub use providers::Provider;
pub use tool_loop::{LoopConfig, LoopOutcome, Termination, ToolCallRecord, ToolLoop};
pub use tools::{
    EmptyToolHost, ExecutionResult, GeoGebraHost, ToolCall, ToolError, ToolHost, ToolResult,
    ToolSpec,
};
