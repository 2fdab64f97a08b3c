//! Application error types.
//!
//! All errors use `thiserror` for automatic Error trait derivation. Run-level
//! failures use [`Error`]; failures scoped to a single trial use
//! [`TrialError`] and are recorded on that trial's result instead of
//! propagating.

use thiserror::Error;

/// Application result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Run-level error. Anything surfacing as this aborts the whole run.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration (bad scenario name, out-of-range field, bad URL).
    #[error("configuration error: {0}")]
    Config(String),

    /// Broken internal invariant (e.g. a result slot written twice).
    #[error("internal error: {0}")]
    Internal(String),

    /// HTTP client construction errors.
    #[error("http client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization errors.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O errors.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// Convenience constructors
impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Failure of a single trial.
///
/// The `Display` output is what lands in `TrialResult::error`, so the
/// timeout message format is part of the result-file contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrialError {
    /// The per-trial deadline fired before the terminal event arrived.
    #[error("Timeout after {0}ms")]
    Timeout(u64),

    /// The response carried no body to stream.
    #[error("Missing response body")]
    MissingBody,

    /// Connection or read failure reported by the HTTP client.
    #[error("{0}")]
    Transport(String),
}

impl From<reqwest::Error> for TrialError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}
