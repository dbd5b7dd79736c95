//! # threadcast-feed
//!
//! Client for the upstream social feed (X API v2 shape). It implements the
//! core-owned [`FeedPort`](threadcast_core::FeedPort) over an injectable HTTP
//! backend so that parsing and error mapping can be tested without network.
//!
//! ```no_run
//! use threadcast_feed::{FeedClientConfig, build_assembler};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = FeedClientConfig::new().with_optional_token(std::env::var("X_BEARER_TOKEN").ok());
//! let assembler = build_assembler(&config)?;
//! let payload = assembler.assemble_url("https://x.com/alice/status/42").await?;
//! println!("{}", payload.title);
//! # Ok(()) }
//! ```
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]
// FeedClient's backend parameter is an implementation detail; DefaultFeedClient
// is meant to be used through the FeedPort trait
#![allow(private_interfaces)]

mod client;
mod config;
mod endpoints;
mod error;
mod http;
mod models;
mod parsing;
mod port;

use std::sync::Arc;

use threadcast_core::{CoreError, ThreadAssembler};

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::DefaultFeedClient;

// Configuration
pub use config::FeedClientConfig;

// Errors
pub use error::FeedHttpError;

/// Build a [`ThreadAssembler`] from client configuration.
///
/// A missing or blank token yields an unconfigured assembler, which reports
/// `MissingCredential` for every remote assembly instead of calling upstream.
/// A client that cannot be built (bad base URL, TLS setup) is a
/// [`CoreError::Configuration`].
pub fn build_assembler(config: &FeedClientConfig) -> Result<ThreadAssembler, CoreError> {
    if !config.has_token() {
        tracing::info!("No feed credential configured; remote threads are disabled");
        return Ok(ThreadAssembler::unconfigured());
    }
    let client = DefaultFeedClient::new(config)
        .map_err(|e| CoreError::Configuration(format!("feed client: {e}")))?;
    Ok(ThreadAssembler::new(Some(Arc::new(client))))
}
