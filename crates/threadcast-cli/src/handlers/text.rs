//! Text command handler.

use std::path::Path;

use anyhow::{Context, Result, bail};
use threadcast_core::{ThreadPayload, assemble_text};
use tokio::io::AsyncReadExt;

/// Read raw text from `file`, or stdin when `None`.
pub async fn read_source(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut raw = String::new();
            tokio::io::stdin()
                .read_to_string(&mut raw)
                .await
                .context("Failed to read stdin")?;
            Ok(raw)
        }
    }
}

/// Assemble pasted text; blank input is refused.
pub fn assemble(raw: &str) -> Result<ThreadPayload> {
    if raw.trim().is_empty() {
        bail!("No text to narrate: the input is empty");
    }
    Ok(assemble_text(raw))
}

/// Execute the text command.
pub async fn execute(file: Option<&Path>, pretty: bool) -> Result<()> {
    let raw = read_source(file).await?;
    let payload = assemble(&raw)?;
    super::print_payload(&payload, pretty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_is_refused() {
        assert!(assemble(" \n\t\n").is_err());
    }

    #[test]
    fn lines_become_segments() {
        let payload = assemble("first\n\nsecond\n").unwrap();
        assert_eq!(payload.len(), 2);
        assert_eq!(payload.segments[1].text, "second");
    }
}
