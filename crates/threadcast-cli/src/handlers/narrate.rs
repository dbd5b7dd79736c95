//! Narrate command handler.
//!
//! Loads a payload into a [`NarrationSession`], runs the engine on its own
//! task and feeds it transport commands read line by line from stdin.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use threadcast_core::ThreadPayload;
use threadcast_feed::FeedClientConfig;
use threadcast_voice::{
    CommandBackend, CommandBackendConfig, NarrationSession, PlaybackConfig, PlaybackEvent,
    PlaybackStatus, SpeechBackend, TransportCommand,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

/// Step used by the `+` and `-` commands.
const RATE_STEP: f32 = 0.25;

const HELP: &str = "\
commands: p play/pause | n next | b back | g <n> go to segment | r restart
          s stop | + faster | - slower | v <id> voice (v alone: default) | q quit";

/// Where the narrated text comes from.
#[derive(Debug, Clone)]
pub enum NarrationSource {
    Url(String),
    File(PathBuf),
}

#[derive(Debug, Clone)]
pub struct NarrateOptions {
    pub source: NarrationSource,
    pub rate: f32,
    pub voice: Option<String>,
    pub program: String,
}

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(TransportCommand),
    Help,
    Quit,
    Nothing,
}

/// Parse one input line. `g` takes a 1-based segment number.
pub fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map_or((line, ""), |(head, rest)| (head, rest.trim()));

    let command = match head {
        "" => return Ok(Input::Nothing),
        "q" | "quit" => return Ok(Input::Quit),
        "h" | "?" | "help" => return Ok(Input::Help),
        "p" => TransportCommand::Toggle,
        "n" => TransportCommand::Skip(1),
        "b" => TransportCommand::Skip(-1),
        "r" => TransportCommand::Restart,
        "s" => TransportCommand::Stop,
        "+" => TransportCommand::AdjustRate(RATE_STEP),
        "-" => TransportCommand::AdjustRate(-RATE_STEP),
        "v" if rest.is_empty() => TransportCommand::SetVoice(None),
        "v" => TransportCommand::SetVoice(Some(rest.to_string())),
        "g" => {
            let number: usize = rest
                .parse()
                .map_err(|_| format!("expected a segment number after g, got {rest:?}"))?;
            let index = number
                .checked_sub(1)
                .ok_or_else(|| "segment numbers start at 1".to_string())?;
            TransportCommand::JumpTo(index)
        }
        other => return Err(format!("unknown command {other:?}, type h for help")),
    };
    Ok(Input::Command(command))
}

async fn load_payload(feed: &FeedClientConfig, source: &NarrationSource) -> Result<ThreadPayload> {
    match source {
        NarrationSource::Url(url) => super::fetch::assemble(feed, url).await,
        NarrationSource::File(path) => {
            let raw = super::text::read_source(Some(path)).await?;
            super::text::assemble(&raw)
        }
    }
}

fn speech_backend(program: &str) -> Option<Arc<dyn SpeechBackend>> {
    match CommandBackend::new(CommandBackendConfig::new().with_program(program)) {
        Ok(backend) => Some(Arc::new(backend)),
        Err(e) => {
            tracing::warn!(error = %e, "Speech backend unavailable");
            None
        }
    }
}

fn report(event: &PlaybackEvent, payload: &ThreadPayload) {
    match event {
        PlaybackEvent::SegmentStarted { index, .. } => {
            if let Some(segment) = payload.segment(*index) {
                println!("[{}/{}] {}", index + 1, payload.len(), segment.text);
            }
        }
        PlaybackEvent::StateChanged(status) => println!("({status})"),
        PlaybackEvent::Error(e) => eprintln!("playback error: {e}"),
    }
}

/// Execute the narrate command.
pub async fn execute(feed: &FeedClientConfig, options: NarrateOptions) -> Result<()> {
    let config = PlaybackConfig::default()
        .with_rate(options.rate)
        .with_voice(options.voice.clone());
    let mut session = NarrationSession::new(speech_backend(&options.program), config);

    let ticket = session.begin_fetch();
    let payload = load_payload(feed, &options.source).await?;
    session.load(ticket, payload);

    let engine = session
        .take_engine()
        .context("Narration session has no payload loaded")?;
    let mut events = session
        .take_events()
        .context("Narration session has no event stream")?;
    let payload = engine.payload().clone();

    println!("{}", payload.title);
    if let Some(warning) = &payload.warning {
        eprintln!("warning: {warning}");
    }
    println!("{HELP}");

    let (commands, rx) = mpsc::channel(16);
    let driver = tokio::spawn(engine.run(rx));
    commands.send(TransportCommand::Play).await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut input_open = true;
    let mut status = PlaybackStatus::Idle;

    loop {
        tokio::select! {
            line = lines.next_line(), if input_open => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    // Without input, narrate to the end and exit.
                    input_open = false;
                    if matches!(status, PlaybackStatus::Ended | PlaybackStatus::Error) {
                        break;
                    }
                    continue;
                };
                match parse_input(&line) {
                    Ok(Input::Command(command)) => commands.send(command).await?,
                    Ok(Input::Help) => println!("{HELP}"),
                    Ok(Input::Quit) => break,
                    Ok(Input::Nothing) => {}
                    Err(message) => eprintln!("{message}"),
                }
            }
            event = events.recv() => {
                let Some(event) = event else { break };
                report(&event, &payload);
                if let PlaybackEvent::StateChanged(next) = event {
                    status = next;
                    if !input_open && matches!(status, PlaybackStatus::Ended | PlaybackStatus::Error) {
                        break;
                    }
                }
            }
        }
    }

    // The driver may already be gone if the command channel closed.
    let _ = commands.send(TransportCommand::Shutdown).await;
    let final_state = driver.await.context("Playback task failed")?;
    tracing::debug!(?final_state, "Narration finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_keys() {
        assert_eq!(parse_input("p"), Ok(Input::Command(TransportCommand::Toggle)));
        assert_eq!(parse_input(" n "), Ok(Input::Command(TransportCommand::Skip(1))));
        assert_eq!(parse_input("b"), Ok(Input::Command(TransportCommand::Skip(-1))));
        assert_eq!(parse_input("r"), Ok(Input::Command(TransportCommand::Restart)));
        assert_eq!(parse_input("s"), Ok(Input::Command(TransportCommand::Stop)));
        assert_eq!(parse_input("q"), Ok(Input::Quit));
        assert_eq!(parse_input(""), Ok(Input::Nothing));
    }

    #[test]
    fn go_to_is_one_based() {
        assert_eq!(parse_input("g 3"), Ok(Input::Command(TransportCommand::JumpTo(2))));
        assert!(parse_input("g 0").is_err());
        assert!(parse_input("g x").is_err());
    }

    #[test]
    fn rate_and_voice() {
        assert_eq!(
            parse_input("+"),
            Ok(Input::Command(TransportCommand::AdjustRate(RATE_STEP)))
        );
        assert_eq!(
            parse_input("v gmw/en-US"),
            Ok(Input::Command(TransportCommand::SetVoice(Some(
                "gmw/en-US".to_string()
            ))))
        );
        assert_eq!(parse_input("v"), Ok(Input::Command(TransportCommand::SetVoice(None))));
    }

    #[test]
    fn unknown_input_is_reported() {
        assert!(parse_input("dance").is_err());
    }
}
