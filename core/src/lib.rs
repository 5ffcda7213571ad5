//! Synchronous API clients with a shared response validator.
//!
//! # Overview
//! Each client turns a logical operation into an `HttpRequest`, sends it
//! through a `Transport`, and either returns the raw `HttpResponse` or runs
//! it through `validate_response` before decoding the JSON body.
//!
//! # Design
//! - `Session` is the only type that touches the network; clients are
//!   generic over `Transport` so tests feed them canned responses.
//! - Latency is measured by the transport and carried on the response, so
//!   validation is a pure function of the response and an `Expectation`.
//! - `Driver` runs a fixed sequence of calls inside one error boundary and
//!   reports progress as console text.

pub mod config;
pub mod direct;
pub mod driver;
pub mod envelope;
pub mod error;
pub mod http;
pub mod school;
pub mod session;
pub mod types;
pub mod validate;
pub mod video;

#[cfg(test)]
mod testing;

pub use config::ClientConfig;
pub use driver::{Driver, Outcome};
pub use envelope::{record_count, ApiEnvelope};
pub use error::{ApiError, TransportError, TransportErrorKind, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use school::SchoolClient;
pub use session::{Session, Transport};
pub use types::{
    CourseFilter, GradeQuery, HotListQuery, Movie, SearchHit, SearchQuery, TitleSearch, VideoInfo,
    WhitelistQuery,
};
pub use validate::{validate_response, Expectation, DUMP_FILE};
pub use video::VideoClient;
