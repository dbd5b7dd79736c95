//! Upstream feed port: the two read operations Thread Assembly needs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Author of an upstream post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedAuthor {
    /// Upstream user identifier.
    pub id: String,
    /// Handle without the leading `@`.
    pub username: Option<String>,
    /// Display name shown in titles.
    pub display_name: Option<String>,
}

/// A single upstream post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPost {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub author_id: Option<String>,
}

/// The post a thread URL points at, with its grouping metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RootPost {
    pub post: FeedPost,
    /// Conversation-group identifier shared by every post in the thread.
    pub conversation_id: Option<String>,
    /// Resolved author, if the upstream expanded it.
    pub author: Option<FeedAuthor>,
}

/// Errors from upstream feed operations.
///
/// Implementation-specific errors (HTTP, JSON) are mapped to these.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FeedError {
    /// The upstream answered with a non-success status.
    #[error("Upstream returned status {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Network or connectivity error (including timeouts).
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream answered with something we could not interpret.
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
}

/// Port trait for the upstream social feed.
///
/// The implementation lives in `threadcast-feed`. Both operations require a
/// bearer credential; an assembler without a configured port reports
/// `MissingCredential` instead of calling it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedPort: Send + Sync {
    /// Fetch one post by identifier, including author and conversation-group
    /// identifiers.
    async fn fetch_post(&self, id: &str) -> Result<RootPost, FeedError>;

    /// Search for posts in `conversation_id` written by `author`.
    ///
    /// Returns at most `max_results` posts in upstream response order.
    async fn search_conversation(
        &self,
        conversation_id: &str,
        author: &FeedAuthor,
        max_results: u8,
    ) -> Result<Vec<FeedPost>, FeedError>;
}
