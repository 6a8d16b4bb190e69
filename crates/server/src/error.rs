//! Server error types.

use crate::config::ConfigError;
use thiserror::Error;

/// Startup and runtime errors of the server binary.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Configuration is invalid or unreadable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An error occurred in the runtime layer.
    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    /// The engine pool could not be built.
    #[error(transparent)]
    Engine(#[from] engine::Error),

    /// Building the shared HTTP client failed.
    #[error("http client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// An I/O error occurred.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
