//! HTTP backend abstraction for the feed API.
//!
//! The production implementation uses reqwest with bearer authentication and
//! retries transient failures with exponential backoff.

use crate::error::{FeedHttpError, FeedHttpResult};
use crate::models::FeedConfig;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can fetch JSON from URLs.
///
/// This is an implementation detail - external code should use the core
/// `FeedPort` trait.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// Fetch JSON from a URL and deserialize it.
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> FeedHttpResult<T>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Upper bound for a single backoff sleep.
const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Delay before retry number `attempt` (1-based): `base * 2^(attempt - 1)`,
/// capped at [`MAX_RETRY_DELAY`].
fn backoff_delay(base_ms: u64, attempt: u8) -> Duration {
    let factor = 2u64
        .checked_pow(u32::from(attempt.saturating_sub(1)))
        .unwrap_or(u64::MAX);
    Duration::from_millis(base_ms.saturating_mul(factor)).min(MAX_RETRY_DELAY)
}

/// Production HTTP backend using reqwest with retry logic.
///
/// Server errors (5xx) and network errors are retried; everything else fails
/// on the first attempt.
pub struct ReqwestBackend {
    client: reqwest::Client,
    max_retries: u8,
    retry_base_delay_ms: u64,
    auth_token: Option<String>,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &FeedConfig) -> FeedHttpResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| FeedHttpError::ClientBuild(e.to_string()))?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            retry_base_delay_ms: config.retry_base_delay_ms,
            auth_token: config.token.clone(),
        })
    }

    fn build_request(&self, url: &Url) -> reqwest::RequestBuilder {
        let request = self.client.get(url.as_str());
        match self.auth_token {
            Some(ref token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Fetch a URL with automatic retry for transient errors.
    async fn fetch_with_retry(&self, url: &Url) -> FeedHttpResult<reqwest::Response> {
        let mut last_error: Option<FeedHttpError> = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = backoff_delay(self.retry_base_delay_ms, attempt);
                tracing::debug!(%url, attempt, ?delay, "Retrying feed request");
                tokio::time::sleep(delay).await;
            }

            match self.build_request(url).send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }

                    let body = response.text().await.unwrap_or_default();
                    let error = FeedHttpError::ApiRequestFailed {
                        status: status.as_u16(),
                        url: url.to_string(),
                        body,
                    };

                    if status.is_server_error() && attempt < self.max_retries {
                        last_error = Some(error);
                        continue;
                    }

                    return Err(error);
                }
                Err(e) => {
                    if attempt < self.max_retries {
                        last_error = Some(e.into());
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FeedHttpError::InvalidResponse {
            message: "Unknown error during fetch".to_string(),
        }))
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn get_json<T: DeserializeOwned + Send>(&self, url: &Url) -> FeedHttpResult<T> {
        let response = self.fetch_with_retry(url).await?;
        let data: T = response.json().await?;
        Ok(data)
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// How the local server answers every request.
    #[derive(Clone, Copy)]
    enum Reply {
        Status(u16),
        HangUp,
    }

    /// Serve `reply` on a loopback port, counting accepted connections.
    async fn serve(reply: Reply) -> (Url, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = Url::parse(&format!("http://{}/2/tweets/42", listener.local_addr().unwrap()))
            .unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    return;
                };
                counter.fetch_add(1, Ordering::SeqCst);

                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }

                if let Reply::Status(status) = reply {
                    let body = "{\"title\":\"canned\"}";
                    let response = format!(
                        "HTTP/1.1 {status} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
                let _ = socket.shutdown().await;
            }
        });

        (url, hits)
    }

    fn backend(max_retries: u8) -> ReqwestBackend {
        let config = FeedConfig {
            max_retries,
            retry_base_delay_ms: 1,
            timeout_ms: 2_000,
            ..FeedConfig::default()
        };
        ReqwestBackend::new(&config).unwrap()
    }

    #[tokio::test]
    async fn server_errors_are_retried() {
        let (url, hits) = serve(Reply::Status(503)).await;
        let err = tokio_test::assert_err!(backend(2).get_json::<serde_json::Value>(&url).await);

        assert_eq!(hits.load(Ordering::SeqCst), 3);
        match err {
            FeedHttpError::ApiRequestFailed { status, body, .. } => {
                assert_eq!(status, 503);
                assert!(body.contains("canned"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn client_errors_are_not_retried() {
        for status in [404, 429] {
            let (url, hits) = serve(Reply::Status(status)).await;
            let err =
                tokio_test::assert_err!(backend(2).get_json::<serde_json::Value>(&url).await);

            assert_eq!(hits.load(Ordering::SeqCst), 1, "status {status}");
            assert!(
                matches!(err, FeedHttpError::ApiRequestFailed { status: s, .. } if s == status)
            );
        }
    }

    #[tokio::test]
    async fn dropped_connections_are_retried() {
        let (url, hits) = serve(Reply::HangUp).await;
        let err = tokio_test::assert_err!(backend(1).get_json::<serde_json::Value>(&url).await);

        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(matches!(err, FeedHttpError::Network(_)));
    }

    #[test]
    fn backoff_doubles_and_saturates() {
        assert_eq!(backoff_delay(500, 1), Duration::from_millis(500));
        assert_eq!(backoff_delay(500, 2), Duration::from_millis(1000));
        assert_eq!(backoff_delay(500, 3), Duration::from_millis(2000));
        assert_eq!(backoff_delay(500, u8::MAX), MAX_RETRY_DELAY);
        assert_eq!(backoff_delay(u64::MAX, 2), MAX_RETRY_DELAY);
    }

    #[test]
    fn test_reqwest_backend_creation() {
        let config = FeedConfig {
            token: Some("secret".to_string()),
            ..FeedConfig::default()
        };
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.max_retries, 2);
        assert_eq!(backend.auth_token.as_deref(), Some("secret"));
    }
}
