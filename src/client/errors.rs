//! Error taxonomy for API calls.
//!
//! Every failure surfaced by the client is one of a small set of kinds:
//!
//! - [`RequestBuildError`]: the request could not be constructed (malformed
//!   path, unencodable options or body) - never sent, never retried
//! - [`ClientError::Transport`]: connection-level failure - never retried
//! - [`ResponseDecodingError`]: a body that could not be parsed, carrying the
//!   raw bytes and status
//! - [`ResponseError`]: a normalized API error with a message and a flattened
//!   list of sub-messages
//! - [`RateLimitError`]: a [`ResponseError`] plus the server-advertised
//!   retry-after; the only kind (besides 503 responses) retried automatically
//!
//! # Example
//!
//! ```rust,ignore
//! match client.get::<ProductsEnvelope, _>("products.json", None::<&()>).await {
//!     Ok(products) => { /* ... */ }
//!     Err(ClientError::RateLimit(e)) => {
//!         println!("throttled, retry after {}s", e.retry_after);
//!     }
//!     Err(ClientError::Api(e)) => {
//!         println!("API error {}: {}", e.status, e);
//!     }
//!     Err(other) => return Err(other),
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// Error returned when a request could not be constructed.
///
/// These occur before anything is sent and are never retried.
#[derive(Debug, Error)]
pub enum RequestBuildError {
    /// The relative path did not resolve against the shop base URL.
    #[error("invalid request path '{path}': {source}")]
    InvalidPath {
        /// The path that failed to resolve.
        path: String,
        /// The underlying URL parse failure.
        source: url::ParseError,
    },

    /// The options value could not be encoded as query parameters.
    #[error("could not encode request options: {0}")]
    Options(#[from] serde_urlencoded::ser::Error),

    /// The body value could not be encoded as JSON.
    #[error("could not encode request body: {0}")]
    Body(#[from] serde_json::Error),
}

/// A general response error following Shopify's layout: either a single
/// message or a list of messages.
///
/// The display form is the message when present; otherwise the sorted,
/// comma-joined sub-messages; otherwise `"Unknown Error"`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseError {
    /// The HTTP status code of the response.
    pub status: u16,
    /// The primary error message.
    pub message: String,
    /// The flattened list of error messages.
    pub errors: Vec<String>,
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.message.is_empty() {
            return f.write_str(&self.message);
        }

        let mut errors = self.errors.clone();
        errors.sort();
        let joined = errors.join(", ");

        if joined.is_empty() {
            f.write_str("Unknown Error")
        } else {
            f.write_str(&joined)
        }
    }
}

impl std::error::Error for ResponseError {}

/// Error returned when a response body could not be parsed.
///
/// Carries the raw bytes so callers can inspect what the server actually
/// sent. Also used for malformed `Link` pagination headers, where `status`
/// is zero and `body` is empty.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ResponseDecodingError {
    /// The raw response body.
    pub body: Vec<u8>,
    /// The parser's failure message.
    pub message: String,
    /// The HTTP status code of the response.
    pub status: u16,
}

/// An error specific to a rate-limiting response.
///
/// Wraps the normalized [`ResponseError`] so consumers can handle it the same
/// way, adding the advertised wait in whole seconds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{error}")]
pub struct RateLimitError {
    /// The normalized response error.
    pub error: ResponseError,
    /// Seconds to wait before retrying, from the `Retry-After` header or the
    /// GraphQL cost computation. Zero when the server advertised nothing.
    pub retry_after: u64,
}

/// Unified error type for all API call failures.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The request could not be constructed.
    #[error(transparent)]
    Request(#[from] RequestBuildError),

    /// Network or connection failure.
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response body could not be parsed.
    #[error(transparent)]
    Decoding(#[from] ResponseDecodingError),

    /// A normalized API error response.
    #[error(transparent)]
    Api(#[from] ResponseError),

    /// A rate-limiting response.
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),
}
