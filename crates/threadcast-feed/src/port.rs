//! Port trait implementation for `FeedClient`.
//!
//! Implements the core-owned `FeedPort` and maps internal HTTP errors onto the
//! core `FeedError` the assembler classifies.

use async_trait::async_trait;
use threadcast_core::{FeedAuthor, FeedError, FeedPort, FeedPost, RootPost};

use crate::client::FeedClient;
use crate::error::FeedHttpError;
use crate::http::HttpBackend;

// ============================================================================
// Error Mapping
// ============================================================================

/// Convert internal `FeedHttpError` to core `FeedError`.
fn map_error(err: FeedHttpError) -> FeedError {
    match err {
        FeedHttpError::ApiRequestFailed { status, body, .. } => FeedError::Upstream { status, body },
        FeedHttpError::NotFound { body } => FeedError::Upstream { status: 404, body },
        FeedHttpError::InvalidResponse { message } => FeedError::InvalidResponse(message),
        FeedHttpError::ClientBuild(message) => FeedError::Network(message),
        FeedHttpError::Network(e) => {
            if e.is_timeout() {
                FeedError::Network(format!("request timed out: {e}"))
            } else {
                FeedError::Network(e.to_string())
            }
        }
        FeedHttpError::InvalidUrl(e) => FeedError::InvalidResponse(e.to_string()),
        FeedHttpError::JsonParse(e) => FeedError::InvalidResponse(e.to_string()),
    }
}

/// The search operator wants a handle; fall back to the numeric id.
fn search_author(author: &FeedAuthor) -> &str {
    author
        .username
        .as_deref()
        .filter(|u| !u.is_empty())
        .unwrap_or(&author.id)
}

// ============================================================================
// Port Implementation
// ============================================================================

#[async_trait]
impl<B: HttpBackend> FeedPort for FeedClient<B> {
    async fn fetch_post(&self, id: &str) -> Result<RootPost, FeedError> {
        self.lookup(id).await.map_err(map_error)
    }

    async fn search_conversation(
        &self,
        conversation_id: &str,
        author: &FeedAuthor,
        max_results: u8,
    ) -> Result<Vec<FeedPost>, FeedError> {
        self.search(conversation_id, search_author(author), max_results)
            .await
            .map_err(map_error)
    }
}
