//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the core domain expects from infrastructure.
//! They contain no implementation details and use only domain types.
//!
//! # Design Rules
//!
//! - No `reqwest` or wire-format types in any signature
//! - Upstream failures are reported as [`FeedError`], never as HTTP client errors

pub mod feed;

use thiserror::Error;

pub use feed::{FeedAuthor, FeedError, FeedPort, FeedPost, RootPost};
#[cfg(test)]
pub use feed::MockFeedPort;

use crate::services::AssemblyError;

/// Core error type for semantic domain errors.
///
/// Adapters should map this to their own error types (HTTP status codes,
/// CLI exit codes).
#[derive(Debug, Error)]
pub enum CoreError {
    /// Thread assembly failed terminally.
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// An adapter could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}
