//! Integration tests for the `/api/thread*` and `/api/health` endpoints.
//!
//! The router is built over a stub `FeedPort`, so no network or credential
//! is needed.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use threadcast_axum::{AxumContext, CorsConfig, create_router};
use threadcast_core::{FeedAuthor, FeedError, FeedPort, FeedPost, RootPost, ThreadAssembler};

// ── Stub feed ─────────────────────────────────────────────────────────────────

struct StubFeed {
    root: Result<RootPost, FeedError>,
    search: Result<Vec<FeedPost>, FeedError>,
}

#[async_trait]
impl FeedPort for StubFeed {
    async fn fetch_post(&self, _id: &str) -> Result<RootPost, FeedError> {
        self.root.clone()
    }

    async fn search_conversation(
        &self,
        _conversation_id: &str,
        _author: &FeedAuthor,
        _max_results: u8,
    ) -> Result<Vec<FeedPost>, FeedError> {
        self.search.clone()
    }
}

fn post(id: &str, text: &str) -> FeedPost {
    FeedPost {
        id: id.to_string(),
        text: text.to_string(),
        created_at: None,
        author_id: Some("7".to_string()),
    }
}

fn root_post() -> RootPost {
    RootPost {
        post: post("42", "Root post"),
        conversation_id: Some("42".to_string()),
        author: Some(FeedAuthor {
            id: "7".to_string(),
            username: Some("alice".to_string()),
            display_name: Some("Alice".to_string()),
        }),
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn app(feed: Option<StubFeed>) -> axum::Router {
    let feed = feed.map(|f| Arc::new(f) as Arc<dyn FeedPort>);
    create_router(
        AxumContext::new(ThreadAssembler::new(feed)),
        &CorsConfig::AllowAll,
    )
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body)
        .unwrap_or_else(|e| panic!("Expected valid JSON body: {e}"));
    (status, json)
}

// ── GET /api/health ───────────────────────────────────────────────────────────

#[tokio::test]
async fn health_reports_feed_configuration() {
    let request = || Request::builder().uri("/api/health").body(Body::empty()).unwrap();

    let (status, json) = send(app(None), request()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["feedConfigured"], false);

    let configured = StubFeed {
        root: Ok(root_post()),
        search: Ok(vec![]),
    };
    let (_, json) = send(app(Some(configured)), request()).await;
    assert_eq!(json["feedConfigured"], true);
}

// ── POST /api/thread ──────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_credential_is_501() {
    let (status, json) = send(
        app(None),
        post_json("/api/thread", r#"{"url":"https://x.com/alice/status/42"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
    assert!(json["error"].as_str().unwrap().contains("not configured"));
}

#[tokio::test]
async fn url_without_status_id_is_400() {
    let (status, json) = send(
        app(None),
        post_json("/api/thread", r#"{"url":"https://x.com/alice"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn malformed_body_is_400() {
    let (status, json) = send(app(None), post_json("/api/thread", "{not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());

    let (status, _) = send(app(None), post_json("/api/thread", r#"{"link":"x"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn thread_is_assembled() {
    let feed = StubFeed {
        root: Ok(root_post()),
        search: Ok(vec![post("42", "Root post"), post("43", "Second post")]),
    };
    let (status, json) = send(
        app(Some(feed)),
        post_json("/api/thread", r#"{"url":"https://x.com/alice/status/42"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["title"], "Alice (2 posts)");
    assert_eq!(json["authorHandle"], "alice");
    assert_eq!(json["sourceUrl"], "https://x.com/alice/status/42");
    assert_eq!(json["segments"][1]["id"], "43");
    assert!(json.get("warning").is_none());
}

#[tokio::test]
async fn search_failure_returns_warning_with_root() {
    let feed = StubFeed {
        root: Ok(root_post()),
        search: Err(FeedError::Upstream {
            status: 429,
            body: "rate limited".to_string(),
        }),
    };
    let (status, json) = send(
        app(Some(feed)),
        post_json("/api/thread", r#"{"url":"https://x.com/alice/status/42"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["segments"].as_array().unwrap().len(), 1);
    assert!(json["warning"].is_string());
}

#[tokio::test]
async fn root_failure_is_502_with_details() {
    let feed = StubFeed {
        root: Err(FeedError::Upstream {
            status: 401,
            body: "Unauthorized".to_string(),
        }),
        search: Ok(vec![]),
    };
    let (status, json) = send(
        app(Some(feed)),
        post_json("/api/thread", r#"{"url":"https://x.com/alice/status/42"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["details"]["status"], 401);
    assert_eq!(json["details"]["body"], "Unauthorized");
}

// ── POST /api/thread/text ─────────────────────────────────────────────────────

#[tokio::test]
async fn pasted_text_is_split_into_segments() {
    let (status, json) = send(
        app(None),
        post_json("/api/thread/text", r#"{"text":"a\n\nb\nc"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let texts: Vec<_> = json["segments"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["text"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(texts, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn blank_text_is_400() {
    let (status, _) = send(app(None), post_json("/api/thread/text", r#"{"text":"  \n "}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
