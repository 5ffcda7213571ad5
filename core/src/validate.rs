//! Shared response validation.
//!
//! One routine serves every client: status, then latency, then (optionally)
//! JSON parseability. The first broken expectation is returned and nothing
//! after it is checked.

use std::fs;
use std::path::PathBuf;

use crate::error::ValidationError;
use crate::http::HttpResponse;

/// File the movie tester dumps unparseable bodies to.
pub const DUMP_FILE: &str = "response_content.txt";

/// What a response must satisfy to pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Expectation {
    pub status: u16,
    pub max_elapsed_ms: f64,
    pub check_json: bool,
    /// Where to write the raw body when it fails to parse as JSON.
    pub dump_path: Option<PathBuf>,
}

impl Expectation {
    /// Expect `200`, a JSON body, and a response faster than `max_elapsed_ms`.
    pub fn ok_json(max_elapsed_ms: f64) -> Self {
        Self {
            status: 200,
            max_elapsed_ms,
            check_json: true,
            dump_path: None,
        }
    }

    pub fn dump_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_path = Some(path.into());
        self
    }
}

pub fn validate_response(
    response: &HttpResponse,
    expectation: &Expectation,
) -> Result<(), ValidationError> {
    if response.status != expectation.status {
        return Err(ValidationError::StatusMismatch {
            expected: expectation.status,
            actual: response.status,
        });
    }

    if response.elapsed_ms >= expectation.max_elapsed_ms {
        return Err(ValidationError::TooSlow {
            threshold_ms: expectation.max_elapsed_ms,
            elapsed_ms: response.elapsed_ms,
        });
    }

    if expectation.check_json {
        if let Err(e) = serde_json::from_slice::<serde_json::Value>(&response.body) {
            if let Some(path) = &expectation.dump_path {
                match fs::write(path, &response.body) {
                    Ok(()) => tracing::info!(path = %path.display(), "saved unparseable body"),
                    Err(err) => {
                        tracing::warn!(path = %path.display(), error = %err, "could not save body")
                    }
                }
            }
            return Err(ValidationError::InvalidJson {
                reason: e.to_string(),
            });
        }
    }

    Ok(())
}
