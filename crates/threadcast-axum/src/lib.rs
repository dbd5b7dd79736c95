//! # threadcast-axum
//!
//! HTTP adapter exposing Thread Assembly to a browser UI:
//!
//! | Method | Path               | Body               | Success            |
//! |--------|--------------------|--------------------|--------------------|
//! | POST   | `/api/thread`      | `{ "url": … }`     | `ThreadPayload`    |
//! | POST   | `/api/thread/text` | `{ "text": … }`    | `ThreadPayload`    |
//! | GET    | `/api/health`      |                    | `{ status, feedConfigured }` |
//!
//! Failures are `{ "error": string, "details"?: any }` with 400 for bad
//! input, 501 when no feed credential is configured and 502 for upstream
//! failures.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Silence unused dev-dependency warnings
#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use routes::create_router;
pub use state::AppState;
