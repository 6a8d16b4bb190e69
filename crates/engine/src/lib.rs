//! GeoGebra engine access for the tutor backend.
//!
//! This crate knows two things about the graphing engine:
//!
//! 1. **Its command language.** [`Command`] is a typed construction that
//!    renders to exactly one command string (`f(x) = x^2`,
//!    `i1 = Integral(f, 0, 2)`, ...). Rendering is pure string
//!    interpolation, so the same command always renders the same text.
//!
//! 2. **How to talk to a live instance.** The [`Engine`] trait is the subset
//!    of the applet's scripting API the backend needs. [`BridgeEngine`]
//!    reaches an applet hosted in a headless browser over HTTP, and
//!    [`EnginePool`] hands instances out one checkout at a time, since an
//!    applet only tolerates a single writer.
//!
//! # Example
//!
//! ```no_run
//! use engine::{BridgeEngine, Command, Engine, EnginePool};
//!
//! # async fn example() -> engine::Result<()> {
//! let pool = EnginePool::new(vec![BridgeEngine::new("http://127.0.0.1:4010")?])?;
//! let engine = pool.acquire().await?;
//!
//! let command = Command::Function {
//!     name: "f".into(),
//!     expression: "x^2".into(),
//!     domain: None,
//! };
//! let outcome = engine.eval_command(&command.render()).await?;
//! assert!(outcome.success);
//! # Ok(())
//! # }
//! ```

mod bridge;
mod command;
mod engine;
mod error;
mod object;
mod pool;

pub use bridge::BridgeEngine;
pub use command::Command;
pub use engine::{Engine, snapshot};
pub use error::{Error, Result};
pub use object::{CommandOutcome, ObjectInfo};
pub use pool::{EnginePool, PooledEngine};
