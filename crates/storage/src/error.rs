use crate::Provider;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("API key is missing")]
    MissingApiKey,

    #[error("API key format is not valid for provider {0}")]
    InvalidApiKey(Provider),

    #[error("custom provider requires a base URL")]
    MissingBaseUrl,

    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

pub type Result<T> = std::result::Result<T, Error>;
