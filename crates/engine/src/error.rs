use thiserror::Error;

/// Errors from talking to a live engine.
///
/// Command rejections are not errors: they come back as a
/// [`CommandOutcome`](crate::CommandOutcome) with `success == false`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The bridge could not be reached.
    #[error("engine transport: {0}")]
    Transport(String),

    /// The bridge answered with a non-success status.
    #[error("engine bridge returned {status}: {body}")]
    Bridge { status: u16, body: String },

    /// The bridge answered with a body that could not be decoded.
    #[error("invalid engine response: {0}")]
    InvalidResponse(String),

    /// The engine pool was shut down while waiting for an instance.
    #[error("engine pool closed")]
    PoolClosed,

    /// A pool was built without any engines.
    #[error("engine pool needs at least one engine")]
    EmptyPool,

    /// The bridge base URL cannot address an object.
    #[error("invalid bridge URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
