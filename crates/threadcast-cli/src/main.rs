//! CLI entry point - the composition root.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use threadcast_cli::handlers::narrate::{NarrateOptions, NarrationSource};
use threadcast_cli::{Cli, Commands, feed_config, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before clap reads `env` defaults
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let feed = feed_config(&cli);
    match cli.command {
        Commands::Fetch { url, pretty } => handlers::fetch::execute(&feed, &url, pretty).await,
        Commands::Text { file, pretty } => handlers::text::execute(file.as_deref(), pretty).await,
        Commands::Voices { program } => handlers::voices::execute(&program).await,
        Commands::Narrate {
            url,
            file,
            rate,
            voice,
            program,
        } => {
            let source = match (url, file) {
                (Some(url), _) => NarrationSource::Url(url),
                (None, Some(file)) => NarrationSource::File(file),
                (None, None) => anyhow::bail!("narrate needs --url or --file"),
            };
            let options = NarrateOptions {
                source,
                rate,
                voice,
                program,
            };
            handlers::narrate::execute(&feed, options).await
        }
        Commands::Serve { port, allow_origin } => {
            handlers::serve::execute(feed, port, allow_origin).await
        }
    }
}
