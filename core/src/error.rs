//! Error types for the Gerrit REST client.
//!
//! # Design
//! Every failure the core can produce lands in one enum so callers can branch
//! on the kind without downcasting. `Status` keeps the numeric code because
//! the compatibility shim and most callers key their decisions on it.

use thiserror::Error;

use crate::capabilities::Operation;

/// Errors returned by `GerritClient` operations.
#[derive(Debug, Error)]
pub enum GerritError {
    /// The request never produced an HTTP response (connect, timeout, TLS, I/O).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {code}: {message}")]
    Status { code: u16, message: String },

    /// The response JSON does not have the shape the parser expects.
    #[error("unexpected response format: {0}")]
    Format(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// The client configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The operation is not part of this client's capability set. No request
    /// was sent.
    #[error("operation not supported by this client: {0}")]
    Unsupported(Operation),
}

impl GerritError {
    /// Numeric HTTP status for `Status` errors, `None` for every other kind.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            GerritError::Status { code, .. } => Some(*code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, GerritError>;
