use thiserror::Error;

/// Errors from LLM provider calls.
///
/// Any of these aborts the chat request: the tool loop never retries or
/// synthesizes a reply on a provider failure.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ModelError {
    /// A network error occurred during the API call.
    #[error("network: {0}")]
    Network(String),

    /// The provider rejected the credentials.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The LLM provider returned an error response.
    #[error("provider api: {0}")]
    Api(String),

    /// The provider response could not be parsed.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}
