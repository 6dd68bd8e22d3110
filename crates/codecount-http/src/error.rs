//! Error types for codecount-http

use thiserror::Error;

/// Errors raised while setting up the HTTP source.
///
/// Request-time failures are reported as `codecount_core::FetchError`.
#[derive(Error, Debug)]
pub enum HttpSourceError {
    /// The HTTP client could not be built
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}
