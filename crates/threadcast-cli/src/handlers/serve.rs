//! Serve command handler.

use anyhow::Result;
use threadcast_axum::{ServerConfig, start_server};
use threadcast_feed::FeedClientConfig;

/// Execute the serve command.
pub async fn execute(feed: FeedClientConfig, port: u16, allow_origin: Vec<String>) -> Result<()> {
    let mut config = ServerConfig::default().with_port(port).with_feed(feed);
    if !allow_origin.is_empty() {
        config = config.with_allowed_origins(allow_origin);
    }
    start_server(config).await
}
