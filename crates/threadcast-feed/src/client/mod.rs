//! Feed client for post lookup and conversation search.

use crate::config::FeedClientConfig;
use crate::endpoints::{build_lookup_url, build_search_url};
use crate::error::FeedHttpResult;
use crate::http::{HttpBackend, ReqwestBackend};
use crate::models::{FeedConfig, LookupResponse, SearchResponse};
use crate::parsing::{parse_lookup, parse_search};
use threadcast_core::{FeedPost, RootPost};
use url::Url;

// ============================================================================
// Type Aliases
// ============================================================================

/// Default feed client using the reqwest HTTP backend.
pub type DefaultFeedClient = FeedClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the upstream feed API.
///
/// Generic over the HTTP backend so tests can substitute canned responses.
/// External code should use `DefaultFeedClient::new()` through `FeedPort`.
pub struct FeedClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: FeedConfig,
}

impl DefaultFeedClient {
    /// Create a new client with the given configuration.
    pub fn new(config: &FeedClientConfig) -> FeedHttpResult<Self> {
        let internal_config = Self::to_internal_config(config)?;
        let backend = ReqwestBackend::new(&internal_config)?;
        Ok(Self {
            backend,
            config: internal_config,
        })
    }

    fn to_internal_config(config: &FeedClientConfig) -> FeedHttpResult<FeedConfig> {
        Ok(FeedConfig {
            base_url: Url::parse(&config.base_url)?,
            token: config.token.clone(),
            max_retries: config.max_retries,
            #[allow(clippy::cast_possible_truncation)] // Duration milliseconds won't exceed u64 in practice
            retry_base_delay_ms: config.retry_base_delay.as_millis() as u64,
            #[allow(clippy::cast_possible_truncation)]
            timeout_ms: config.timeout.as_millis() as u64,
            user_agent: config.user_agent.clone(),
        })
    }
}

impl<B: HttpBackend> FeedClient<B> {
    /// Create a new client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: FeedConfig, backend: B) -> Self {
        Self { backend, config }
    }

    /// Look up one post with its author expansion.
    pub(crate) async fn lookup(&self, post_id: &str) -> FeedHttpResult<RootPost> {
        let url = build_lookup_url(&self.config, post_id);
        tracing::debug!(post_id, "Looking up post");
        let response: LookupResponse = self.backend.get_json(&url).await?;
        parse_lookup(response)
    }

    /// Run one page of recent search over a conversation.
    pub(crate) async fn search(
        &self,
        conversation_id: &str,
        author: &str,
        max_results: u8,
    ) -> FeedHttpResult<Vec<FeedPost>> {
        let url = build_search_url(&self.config, conversation_id, author, max_results);
        tracing::debug!(conversation_id, author, "Searching conversation");
        let response: SearchResponse = self.backend.get_json(&url).await?;
        Ok(parse_search(response))
    }
}
