//! # threadcast-cli
//!
//! The `threadcast` binary: fetch or paste a thread, print it as JSON,
//! narrate it through a local synthesizer, or serve the HTTP API.
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used by main.rs binary
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

// Re-export primary types for convenient access
pub use bootstrap::feed_config;
pub use commands::Commands;
pub use parser::Cli;
