//! Session configuration types.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier chosen by the client for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SessionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// LLM provider family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI Chat Completions.
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Any OpenAI-compatible endpoint; requires a base URL.
    Custom,
}

impl Provider {
    /// Model used when the session leaves the model empty.
    pub fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi | Self::Custom => "gpt-4-turbo-preview",
            Self::Anthropic => "claude-3-5-sonnet-20241022",
        }
    }

    /// Models offered to the user for this provider.
    pub fn known_models(self) -> &'static [&'static str] {
        match self {
            Self::OpenAi => &["gpt-4-turbo-preview", "gpt-4", "gpt-3.5-turbo"],
            Self::Anthropic => &[
                "claude-3-5-sonnet-20241022",
                "claude-3-opus-20240229",
                "claude-3-sonnet-20240229",
            ],
            Self::Custom => &[
                "gpt-4",
                "gpt-3.5-turbo",
                "gpt-5-chat",
                "claude-3-5-sonnet",
                "claude-3-opus",
                "claude-3-sonnet",
                "custom-model",
            ],
        }
    }

    fn key_prefix(self) -> Option<&'static str> {
        match self {
            Self::OpenAi => Some("sk-"),
            Self::Anthropic => Some("sk-ant-"),
            Self::Custom => None,
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenAi => write!(f, "openai"),
            Self::Anthropic => write!(f, "anthropic"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Provider settings for one session.
///
/// Replaced wholesale whenever the client reconfigures.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    pub provider: Provider,
    pub api_key: String,
    #[serde(default)]
    pub model: String,
    #[serde(default, rename = "baseURL", skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

impl SessionConfig {
    pub fn new(provider: Provider, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider,
            api_key: api_key.into(),
            model: model.into(),
            base_url: None,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// The configured model, or the provider default when empty.
    pub fn effective_model(&self) -> &str {
        let model = self.model.trim();
        if model.is_empty() {
            self.provider.default_model()
        } else {
            model
        }
    }

    /// Base URL, ignoring blank values.
    pub fn base_url(&self) -> Option<&str> {
        self.base_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    /// Check the fields a provider client cannot work without.
    pub fn ensure_usable(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }
        match (self.provider, self.base_url()) {
            (Provider::Custom, None) => Err(Error::MissingBaseUrl),
            (_, Some(url)) => parse_url(url),
            _ => Ok(()),
        }
    }

    /// Stricter check used when the user submits new settings: also
    /// verifies the key looks like one issued by the provider.
    pub fn validate(&self) -> Result<()> {
        self.ensure_usable()?;
        if let Some(prefix) = self.provider.key_prefix() {
            if !self.api_key.trim().starts_with(prefix) {
                return Err(Error::InvalidApiKey(self.provider));
            }
        }
        Ok(())
    }
}

fn parse_url(url: &str) -> Result<()> {
    url::Url::parse(url)
        .map(|_| ())
        .map_err(|e| Error::InvalidBaseUrl(format!("{url}: {e}")))
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("provider", &self.provider)
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish()
    }
}
