//! Internal error types for feed operations.
//!
//! These errors are mapped to the core `FeedError` at the port boundary.

use thiserror::Error;

/// Result type alias for feed HTTP operations.
pub type FeedHttpResult<T> = Result<T, FeedHttpError>;

/// Errors related to feed API operations.
#[derive(Debug, Error)]
pub enum FeedHttpError {
    /// API request failed with an HTTP error status.
    #[error("Feed API request failed with status {status}: {url}")]
    ApiRequestFailed {
        /// HTTP status code
        status: u16,
        /// The URL that was requested
        url: String,
        /// Response body text
        body: String,
    },

    /// The API answered 200 but reported the resource as missing.
    #[error("Feed API reported errors: {body}")]
    NotFound {
        /// Serialized `errors` array from the response
        body: String,
    },

    /// API returned an invalid or unexpected response.
    #[error("Invalid response from feed API: {message}")]
    InvalidResponse {
        /// Description of what was invalid
        message: String,
    },

    /// The HTTP client could not be constructed.
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),

    /// Network or HTTP client error.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON parsing error.
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
