//! Fetch command handler.

use anyhow::{Result, anyhow};
use threadcast_core::{AssemblyError, CoreError, ThreadPayload};
use threadcast_feed::{FeedClientConfig, build_assembler};

/// Assemble the thread behind `url`.
pub async fn assemble(config: &FeedClientConfig, url: &str) -> Result<ThreadPayload> {
    let assembler = build_assembler(config).map_err(describe)?;
    assembler
        .assemble_url(url)
        .await
        .map_err(|e| describe(e.into()))
}

/// Turn a failure into a message that says what to do next.
fn describe(err: CoreError) -> anyhow::Error {
    match err {
        CoreError::Assembly(AssemblyError::MissingCredential) => {
            anyhow!("{err}. Set X_BEARER_TOKEN or pass --token.")
        }
        CoreError::Assembly(AssemblyError::InvalidUrl(_)) => {
            anyhow!("{err}. Expected a link like https://x.com/<user>/status/<id>.")
        }
        CoreError::Assembly(AssemblyError::Upstream { status, ref body }) => {
            anyhow!("Upstream request failed with status {status}: {body}")
        }
        CoreError::Configuration(_) => anyhow!("{err}. Check --api-base."),
    }
}

/// Execute the fetch command.
pub async fn execute(config: &FeedClientConfig, url: &str, pretty: bool) -> Result<()> {
    let payload = assemble(config, url).await?;
    super::print_payload(&payload, pretty)
}
