//! The I/O side of the clients.
//!
//! # Design
//! The clients only build `HttpRequest` values and read `HttpResponse`
//! values; a `Transport` performs the round-trip in between. `Session` is the
//! real transport: a blocking `ureq` agent that reuses connections and stamps
//! the configured default headers onto every request. Unit tests substitute a
//! canned transport at this seam.

use std::fmt;
use std::io::ErrorKind;
use std::time::Instant;

use ureq::Agent;

use crate::config::ClientConfig;
use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one request and returns the response as data.
///
/// Implementations must return 4xx/5xx responses as `Ok`; only failures to
/// obtain a response at all are errors.
pub trait Transport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Connection-reusing transport with default headers.
#[derive(Clone)]
pub struct Session {
    agent: Agent,
    headers: Vec<(String, String)>,
}

impl Session {
    pub fn new(config: &ClientConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self {
            agent,
            headers: config.effective_headers(),
        }
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.headers
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

impl Transport for Session {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let headers = merge_headers(&self.headers, &request.headers);
        tracing::debug!(method = ?request.method, url = %request.url, "sending request");

        let start = Instant::now();
        let result = match request.method {
            HttpMethod::Get => {
                let mut builder = self.agent.get(&request.url);
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                for (name, value) in &request.query {
                    builder = builder.query(name.as_str(), value.as_str());
                }
                builder.call()
            }
            HttpMethod::Post => {
                let mut builder = self.agent.post(&request.url);
                for (name, value) in &headers {
                    builder = builder.header(name.as_str(), value.as_str());
                }
                for (name, value) in &request.query {
                    builder = builder.query(name.as_str(), value.as_str());
                }
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };

        let mut response = result.map_err(|e| transport_error(&request.url, e))?;
        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_vec()
            .map_err(|e| transport_error(&request.url, e))?;
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

        tracing::debug!(url = %request.url, status, elapsed_ms, "received response");
        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
            elapsed_ms,
        })
    }
}

/// Defaults first, then per-request headers; a per-request header replaces a
/// default of the same name.
fn merge_headers(
    defaults: &[(String, String)],
    overrides: &[(String, String)],
) -> Vec<(String, String)> {
    let mut merged: Vec<(String, String)> = defaults
        .iter()
        .filter(|(name, _)| !overrides.iter().any(|(o, _)| o.eq_ignore_ascii_case(name)))
        .cloned()
        .collect();
    merged.extend(overrides.iter().cloned());
    merged
}

fn transport_error(url: &str, err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::HostNotFound | ureq::Error::ConnectionFailed => TransportErrorKind::Connect,
        ureq::Error::Timeout(_) => TransportErrorKind::Timeout,
        ureq::Error::Io(io) => match io.kind() {
            ErrorKind::ConnectionRefused
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::NotConnected => TransportErrorKind::Connect,
            ErrorKind::TimedOut => TransportErrorKind::Timeout,
            _ => TransportErrorKind::Other,
        },
        _ => TransportErrorKind::Other,
    };
    TransportError {
        kind,
        url: url.to_string(),
        message: err.to_string(),
    }
}

/// Log the request URL, status, content type, length and a body preview.
pub fn log_response(url: &str, response: &HttpResponse) {
    tracing::info!(
        url,
        status = response.status,
        content_type = response.content_type().unwrap_or("-"),
        length = response.body.len(),
        "response received"
    );
    tracing::info!("first 500 characters of body:\n{}", response.body_preview(500));
}
