//! Axum server bootstrap - the composition root.
//!
//! Builds the [`ThreadAssembler`] from feed configuration and serves the
//! router until Ctrl-C.

use anyhow::{Context, Result};
use threadcast_core::ThreadAssembler;
use threadcast_feed::{FeedClientConfig, build_assembler};
use tracing::info;

/// CORS configuration for the web server.
#[derive(Debug, Clone, Default)]
pub enum CorsConfig {
    /// Allow all origins (development mode).
    #[default]
    AllowAll,
    /// Allow specific origins (production mode).
    AllowOrigins(Vec<String>),
}

/// Server configuration for the Axum adapter.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port for the HTTP server.
    pub port: u16,
    /// CORS configuration.
    pub cors: CorsConfig,
    /// Upstream feed client settings, including the optional credential.
    pub feed: FeedClientConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8787,
            cors: CorsConfig::default(),
            feed: FeedClientConfig::default(),
        }
    }
}

impl ServerConfig {
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set CORS to allow specific origins.
    #[must_use]
    pub fn with_allowed_origins(mut self, origins: Vec<String>) -> Self {
        self.cors = CorsConfig::AllowOrigins(origins);
        self
    }

    #[must_use]
    pub fn with_feed(mut self, feed: FeedClientConfig) -> Self {
        self.feed = feed;
        self
    }
}

/// Application context for the Axum adapter.
#[derive(Debug, Clone)]
pub struct AxumContext {
    /// Thread assembly service; unconfigured when no credential is set.
    pub assembler: ThreadAssembler,
}

impl AxumContext {
    pub const fn new(assembler: ThreadAssembler) -> Self {
        Self { assembler }
    }
}

/// Build the server context from configuration.
pub fn bootstrap(config: &ServerConfig) -> Result<AxumContext> {
    let assembler =
        build_assembler(&config.feed).context("Failed to initialise the feed client")?;
    info!(
        feed_configured = assembler.is_configured(),
        "threadcast server context ready"
    );
    Ok(AxumContext::new(assembler))
}

/// Start the web server on the configured port.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    use tokio::net::TcpListener;

    let ctx = bootstrap(&config)?;
    let app = crate::routes::create_router(ctx, &config.cors);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("threadcast web server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("threadcast web server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
