//! Internal API response types for the feed API.
//!
//! These types are internal to `threadcast-feed`. External consumers use the
//! port types defined in `threadcast-core`.

use serde::{Deserialize, Serialize};
use url::Url;

// ============================================================================
// Configuration (used internally, see config.rs for public config)
// ============================================================================

/// Internal configuration for the feed client.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Base URL for the API (default: <https://api.twitter.com/2>)
    pub base_url: Url,
    /// Bearer credential
    pub token: Option<String>,
    /// Maximum number of retry attempts for transient errors (default: 2)
    pub max_retries: u8,
    /// Base delay in milliseconds for exponential backoff (default: 500)
    pub retry_base_delay_ms: u64,
    /// Request timeout in milliseconds (default: 15000)
    pub timeout_ms: u64,
    /// User agent header
    pub user_agent: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://api.twitter.com/2").expect("default feed API URL is valid"),
            token: None,
            max_retries: 2,
            retry_base_delay_ms: 500,
            timeout_ms: 15_000,
            user_agent: concat!("threadcast-feed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

// ============================================================================
// Wire Types
// ============================================================================

/// A post object as returned by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiPost {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub author_id: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// A user object from `includes.users`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiUser {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// Expansion objects attached to a response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiIncludes {
    #[serde(default)]
    pub users: Vec<ApiUser>,
}

/// Response of the single-post lookup endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LookupResponse {
    #[serde(default)]
    pub data: Option<ApiPost>,
    #[serde(default)]
    pub includes: Option<ApiIncludes>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
}

/// Response of the recent-search endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Option<Vec<ApiPost>>,
    #[serde(default)]
    pub meta: Option<SearchMeta>,
}

/// Search pagination metadata.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchMeta {
    #[serde(default)]
    pub result_count: Option<u32>,
    #[serde(default)]
    pub next_token: Option<String>,
}
