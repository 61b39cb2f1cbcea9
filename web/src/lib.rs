//! Axum plumbing for the YaMDb HTTP API.
//!
//! The server crate owns routes and handlers; this crate holds the pieces
//! every handler shares:
//!
//! - [`AppError`]: maps [`yamdb_core::YamdbError`] onto status codes and a
//!   `{code, message, errors?}` JSON body
//! - [`extractors`]: bearer credentials and body/path/query extractors whose
//!   rejections render as [`AppError`]
//! - [`middleware`]: request ids and `tracing` spans per request
//!
//! # Request Flow
//!
//! 1. **Request id** assigned and a span opened
//! 2. **Extract** the bearer token, path and body
//! 3. **Authorize** against a permission policy
//! 4. **Call** the repository
//! 5. **Map** the result or [`AppError`] to a response

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod middleware;

pub use error::AppError;
pub use extractors::{BearerToken, JsonBody, PathParams, QueryParams, RequestId};
pub use middleware::{REQUEST_ID_HEADER, with_request_tracing};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
