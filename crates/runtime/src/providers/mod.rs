//! LLM provider adapters.
//!
//! Each provider implements the backend trait for its specific API.
//! [`Provider`] picks one at runtime from a session's settings.

mod anthropic;
mod openai;

pub use anthropic::{AnthropicBackend, AnthropicBackendBuilder};
pub use openai::{OpenAiBackend, OpenAiBackendBuilder};

use crate::Result;
use crate::model::{Backend, ModelError, ModelRequest, ModelResponse};
use storage::SessionConfig;

pub const DEFAULT_MAX_TOKENS: u32 = 4096;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// The backend selected for one session.
pub enum Provider {
    Anthropic(AnthropicBackend),
    OpenAi(OpenAiBackend),
}

impl Provider {
    /// Build the backend described by a session's settings.
    ///
    /// `client` is shared across sessions so connections and the request
    /// timeout are configured once.
    pub fn from_config(config: &SessionConfig, client: reqwest::Client) -> Result<Self> {
        config.ensure_usable()?;
        let model = config.effective_model();
        let provider = match config.provider {
            storage::Provider::Anthropic => {
                let mut builder = AnthropicBackend::builder(config.api_key.trim(), model).client(client);
                if let Some(url) = config.base_url() {
                    builder = builder.base_url(url);
                }
                Self::Anthropic(builder.build())
            }
            storage::Provider::OpenAi | storage::Provider::Custom => {
                let mut builder = OpenAiBackend::builder(config.api_key.trim(), model).client(client);
                if let Some(url) = config.base_url() {
                    builder = builder.base_url(url);
                }
                Self::OpenAi(builder.build())
            }
        };
        Ok(provider)
    }

    pub fn model(&self) -> &str {
        match self {
            Self::Anthropic(backend) => backend.model(),
            Self::OpenAi(backend) => backend.model(),
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Anthropic(backend) => std::fmt::Display::fmt(backend, f),
            Self::OpenAi(backend) => std::fmt::Display::fmt(backend, f),
        }
    }
}

impl Backend for Provider {
    async fn call(&self, request: ModelRequest<'_>) -> std::result::Result<ModelResponse, ModelError> {
        match self {
            Self::Anthropic(backend) => backend.call(request).await,
            Self::OpenAi(backend) => backend.call(request).await,
        }
    }
}
