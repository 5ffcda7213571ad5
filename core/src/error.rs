//! Error types for the API clients.
//!
//! # Design
//! Three layers of failure are kept apart. `TransportError` is the network
//! refusing to produce a response at all and is never retried.
//! `ValidationError` is a response that arrived but broke one expectation.
//! `ApiError::Application` is a well-formed response whose envelope carries
//! a non-zero `code`. The driver treats the last two (and decode failures) as
//! test failures and everything else as unexpected errors.

use thiserror::Error;

/// How a transport failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// DNS resolution failed or the connection was refused/reset.
    Connect,
    Timeout,
    Other,
}

/// The request never produced a response.
#[derive(Debug, Error)]
#[error("{kind:?} error for {url}: {message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub url: String,
    pub message: String,
}

/// One response expectation did not hold.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("request failed, expected status {expected}, got {actual}")]
    StatusMismatch { expected: u16, actual: u16 },

    #[error("response too slow, expected < {threshold_ms}ms, got {elapsed_ms:.2}ms")]
    TooSlow { threshold_ms: f64, elapsed_ms: f64 },

    #[error("response is not valid JSON: {reason}")]
    InvalidJson { reason: String },

    #[error("response is not JSON (content-type: {content_type})")]
    NotJsonContent { content_type: String },

    #[error("{context} is missing field `{field}`")]
    MissingField { context: String, field: String },

    #[error("{0}")]
    Assertion(String),
}

/// Errors returned by the clients and the driver.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The envelope carried a non-zero `code`.
    #[error("API returned error {code}: {message}")]
    Application { code: i64, message: String },

    /// The response body could not be decoded into the expected shape.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether this error means a response failed an expectation, as opposed
    /// to the run breaking for some other reason.
    pub fn is_assertion(&self) -> bool {
        matches!(
            self,
            ApiError::Validation(_) | ApiError::Application { .. } | ApiError::Deserialization(_)
        )
    }
}
