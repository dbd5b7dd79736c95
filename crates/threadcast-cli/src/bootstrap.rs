//! Translate global CLI options into adapter configuration.

use std::time::Duration;

use threadcast_feed::FeedClientConfig;

use crate::parser::Cli;

/// Feed client settings from the global flags and environment.
pub fn feed_config(cli: &Cli) -> FeedClientConfig {
    let mut config = FeedClientConfig::new()
        .with_optional_token(cli.token.clone())
        .with_timeout(Duration::from_secs(cli.timeout_secs));
    if let Some(base) = &cli.api_base {
        config = config.with_base_url(base.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn token_flag_configures_credential() {
        let cli = Cli::parse_from(["threadcast", "--token", "abc", "voices"]);
        assert!(feed_config(&cli).has_token());
    }

    #[test]
    fn blank_token_is_not_a_credential() {
        let cli = Cli::parse_from(["threadcast", "--token", "  ", "voices"]);
        assert!(!feed_config(&cli).has_token());
    }
}
