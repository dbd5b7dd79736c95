//! Voices command handler.

use std::time::Duration;

use anyhow::Result;
use threadcast_voice::{CommandBackend, CommandBackendConfig, SpeechBackend};

/// How long to wait for the synthesizer to report its voices.
const VOICE_LIST_WAIT: Duration = Duration::from_secs(3);

/// Execute the voices command.
pub async fn execute(program: &str) -> Result<()> {
    let backend = CommandBackend::new(CommandBackendConfig::new().with_program(program))?;
    let mut updates = backend.subscribe_voices();

    if backend.voices().is_empty() {
        // The list is loaded asynchronously; a timeout just means none arrived.
        let _ = tokio::time::timeout(VOICE_LIST_WAIT, updates.changed()).await;
    }

    let voices = backend.voices();
    if voices.is_empty() {
        println!("No voices reported by {program}.");
        return Ok(());
    }
    println!("{:<24} {:<12} NAME", "ID", "LANGUAGE");
    for voice in voices {
        println!("{:<24} {:<12} {}", voice.id, voice.language_tag, voice.name);
    }
    Ok(())
}
