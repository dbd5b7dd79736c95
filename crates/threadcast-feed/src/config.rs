//! Settings for reaching the feed API.

use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.twitter.com/2";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const DEFAULT_MAX_RETRIES: u8 = 2;
const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// Feed client settings.
///
/// | Setting       | Default                      |
/// |---------------|------------------------------|
/// | base URL      | `https://api.twitter.com/2`  |
/// | timeout       | 15 s per request             |
/// | retries       | 2, on 5xx and network errors |
/// | retry delay   | 500 ms, doubled per attempt  |
/// | bearer token  | none (remote assembly off)   |
///
/// ```
/// use threadcast_feed::FeedClientConfig;
/// use std::time::Duration;
///
/// let config = FeedClientConfig::new()
///     .with_timeout(Duration::from_secs(5))
///     .with_token("bearer-token");
/// assert!(config.has_token());
/// ```
#[derive(Clone)]
pub struct FeedClientConfig {
    pub(crate) base_url: String,
    pub(crate) user_agent: String,
    pub(crate) timeout: Duration,
    pub(crate) token: Option<String>,
    pub(crate) max_retries: u8,
    pub(crate) retry_base_delay: Duration,
}

impl Default for FeedClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("threadcast-feed/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: DEFAULT_TIMEOUT,
            token: None,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_base_delay: DEFAULT_RETRY_DELAY,
        }
    }
}

// The token never reaches logs.
impl std::fmt::Debug for FeedClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedClientConfig")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("timeout", &self.timeout)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("max_retries", &self.max_retries)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

impl FeedClientConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Point the client at another API root, e.g. a local stub server.
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Convenience for wiring an environment lookup straight through.
    #[must_use]
    pub fn with_optional_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    /// Retries after the first attempt; `0` disables retrying.
    #[must_use]
    pub const fn with_max_retries(mut self, retries: u8) -> Self {
        self.max_retries = retries;
        self
    }

    #[must_use]
    pub const fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    /// Whether a non-blank credential is configured.
    pub fn has_token(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_documented_table() {
        let config = FeedClientConfig::new();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.user_agent.starts_with("threadcast-feed/"));
        assert_eq!(config.timeout, Duration::from_secs(15));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_base_delay, Duration::from_millis(500));
        assert!(!config.has_token());
    }

    #[test]
    fn builders_override_defaults() {
        let config = FeedClientConfig::new()
            .with_base_url("http://localhost:9999/2")
            .with_user_agent("test-agent")
            .with_timeout(Duration::from_secs(2))
            .with_token("secret")
            .with_max_retries(0);

        assert_eq!(config.base_url, "http://localhost:9999/2");
        assert_eq!(config.user_agent, "test-agent");
        assert_eq!(config.timeout, Duration::from_secs(2));
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn blank_token_counts_as_missing() {
        assert!(!FeedClientConfig::new().with_token("  ").has_token());
        assert!(!FeedClientConfig::new().with_optional_token(None).has_token());
    }

    #[test]
    fn debug_redacts_token() {
        let config = FeedClientConfig::new().with_token("super-secret");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
    }
}
