//! Process-based speech backend: one synthesizer process per utterance.
//!
//! Defaults to `espeak-ng`. Pausing stops the process with `SIGSTOP` and
//! resuming continues it with `SIGCONT`, so a paused utterance picks up
//! exactly where it left off.

use std::process::Stdio;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use threadcast_core::Voice;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

use super::{SpeechBackend, Utterance, UtteranceTag};
use crate::error::SpeechError;

/// Configuration for [`CommandBackend`].
#[derive(Debug, Clone)]
pub struct CommandBackendConfig {
    pub(crate) program: String,
    pub(crate) base_words_per_minute: u32,
    pub(crate) extra_args: Vec<String>,
}

impl Default for CommandBackendConfig {
    fn default() -> Self {
        Self {
            program: "espeak-ng".to_string(),
            base_words_per_minute: 175,
            extra_args: Vec::new(),
        }
    }
}

impl CommandBackendConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Synthesizer executable; it must accept `-s <wpm>`, `-v <voice>` and
    /// `--voices` the way `espeak-ng` does.
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Words per minute at a rate of 1.0.
    #[must_use]
    pub const fn with_base_words_per_minute(mut self, wpm: u32) -> Self {
        self.base_words_per_minute = wpm;
        self
    }

    /// Arguments placed before the generated ones on every invocation.
    #[must_use]
    pub fn with_extra_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

struct ActiveUtterance {
    tag: UtteranceTag,
    pid: Option<u32>,
    paused: bool,
    cancel: oneshot::Sender<()>,
}

/// Speech backend that spawns a synthesizer process for every utterance.
pub struct CommandBackend {
    config: CommandBackendConfig,
    runtime: Handle,
    active: Arc<Mutex<Option<ActiveUtterance>>>,
    voices: Arc<watch::Sender<Vec<Voice>>>,
}

impl CommandBackend {
    /// Create the backend and start loading the voice list in the background.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: CommandBackendConfig) -> Result<Self, SpeechError> {
        let runtime = Handle::try_current()
            .map_err(|e| SpeechError::Unavailable(format!("no async runtime: {e}")))?;
        let (voices, _) = watch::channel(Vec::new());
        let backend = Self {
            config,
            runtime,
            active: Arc::new(Mutex::new(None)),
            voices: Arc::new(voices),
        };
        backend.refresh_voices();
        Ok(backend)
    }

    /// Re-run `<program> --voices` and publish the result to subscribers.
    pub fn refresh_voices(&self) {
        let program = self.config.program.clone();
        let voices = Arc::clone(&self.voices);
        self.runtime.spawn(async move {
            match tokio::process::Command::new(&program)
                .arg("--voices")
                .stdin(Stdio::null())
                .output()
                .await
            {
                Ok(output) if output.status.success() => {
                    let parsed = parse_voice_table(&String::from_utf8_lossy(&output.stdout));
                    debug!(program = %program, count = parsed.len(), "Loaded synthesizer voices");
                    voices.send_replace(parsed);
                }
                Ok(output) => {
                    warn!(program = %program, status = %output.status, "Voice listing failed");
                }
                Err(e) => {
                    warn!(program = %program, error = %e, "Could not run synthesizer for voice listing");
                }
            }
        });
    }

    fn speech_args(&self, utterance: &Utterance) -> Vec<String> {
        let mut args = self.config.extra_args.clone();
        args.push("-s".to_string());
        args.push(words_per_minute(self.config.base_words_per_minute, utterance.rate).to_string());
        if let Some(voice) = &utterance.voice_id {
            args.push("-v".to_string());
            args.push(voice.clone());
        }
        // Keep text that looks like a flag from being parsed as one.
        if utterance.text.starts_with('-') {
            args.push(format!(" {}", utterance.text));
        } else {
            args.push(utterance.text.clone());
        }
        args
    }
}

impl std::fmt::Debug for CommandBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBackend")
            .field("config", &self.config)
            .field("voices", &self.voices.borrow().len())
            .finish_non_exhaustive()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clear the active slot if it still belongs to `tag`.
fn release_if_current(active: &Mutex<Option<ActiveUtterance>>, tag: UtteranceTag) -> bool {
    let mut slot = lock(active);
    if slot.as_ref().is_some_and(|a| a.tag == tag) {
        *slot = None;
        true
    } else {
        false
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn words_per_minute(base: u32, rate: f32) -> u32 {
    (base as f32 * rate).round().max(1.0) as u32
}

/// Parse the table printed by `espeak-ng --voices`.
///
/// ```text
/// Pty Language       Age/Gender VoiceName          File                 Other Languages
///  5  en-us           --/M      English_(America)  gmw/en-US            (en 3)
/// ```
pub(crate) fn parse_voice_table(output: &str) -> Vec<Voice> {
    output
        .lines()
        .filter_map(|line| {
            let columns: Vec<&str> = line.split_whitespace().collect();
            if columns.len() < 4 || columns[0].eq_ignore_ascii_case("pty") {
                return None;
            }
            let language = columns[1];
            let name = columns[3];
            let id = columns.get(4).copied().unwrap_or(name);
            Some(Voice::new(id, name.replace('_', " "), language))
        })
        .collect()
}

#[cfg(unix)]
fn signal_process(pid: u32, signal: nix::sys::signal::Signal) -> Result<(), SpeechError> {
    use nix::unistd::Pid;

    let raw = i32::try_from(pid).map_err(|_| SpeechError::Control(format!("invalid pid {pid}")))?;
    nix::sys::signal::kill(Pid::from_raw(raw), signal)
        .map_err(|e| SpeechError::Control(format!("{signal:?} failed: {e}")))
}

impl CommandBackend {
    #[cfg(unix)]
    fn set_paused(&self, paused: bool) -> Result<(), SpeechError> {
        use nix::sys::signal::Signal;

        let mut slot = lock(&self.active);
        let Some(active) = slot.as_mut() else {
            return Ok(());
        };
        if active.paused == paused {
            return Ok(());
        }
        let pid = active
            .pid
            .ok_or_else(|| SpeechError::Control("synthesizer process has exited".to_string()))?;
        let signal = if paused { Signal::SIGSTOP } else { Signal::SIGCONT };
        signal_process(pid, signal)?;
        active.paused = paused;
        Ok(())
    }

    #[cfg(not(unix))]
    fn set_paused(&self, _paused: bool) -> Result<(), SpeechError> {
        Err(SpeechError::Control(
            "pausing a synthesizer process is not supported on this platform".to_string(),
        ))
    }
}

impl SpeechBackend for CommandBackend {
    fn voices(&self) -> Vec<Voice> {
        self.voices.borrow().clone()
    }

    fn subscribe_voices(&self) -> watch::Receiver<Vec<Voice>> {
        self.voices.subscribe()
    }

    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError> {
        self.cancel()?;

        let args = self.speech_args(&utterance);
        let mut command = tokio::process::Command::new(&self.config.program);
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let mut child = {
            let _guard = self.runtime.enter();
            command
                .spawn()
                .map_err(|e| SpeechError::Submit(format!("{}: {e}", self.config.program)))?
        };

        let tag = utterance.tag;
        let (cancel_tx, cancel_rx) = oneshot::channel();
        *lock(&self.active) = Some(ActiveUtterance {
            tag,
            pid: child.id(),
            paused: false,
            cancel: cancel_tx,
        });
        debug!(index = tag.index, generation = tag.generation, pid = ?child.id(), "Synthesizer started");
        utterance.events.started();

        let active = Arc::clone(&self.active);
        let sink = utterance.events;
        self.runtime.spawn(async move {
            tokio::select! {
                status = child.wait() => {
                    if !release_if_current(&active, tag) {
                        return;
                    }
                    match status {
                        Ok(status) if status.success() => sink.finished(),
                        Ok(status) => sink.failed(format!("synthesizer exited with {status}")),
                        Err(e) => sink.failed(e.to_string()),
                    }
                }
                _ = cancel_rx => {
                    if let Err(e) = child.kill().await {
                        debug!(error = %e, "Synthesizer already gone at cancel");
                    }
                }
            }
        });
        Ok(())
    }

    fn pause(&self) -> Result<(), SpeechError> {
        self.set_paused(true)
    }

    fn resume(&self) -> Result<(), SpeechError> {
        self.set_paused(false)
    }

    fn cancel(&self) -> Result<(), SpeechError> {
        if let Some(active) = lock(&self.active).take() {
            debug!(index = active.tag.index, generation = active.tag.generation, "Cancelling utterance");
            let _ = active.cancel.send(());
        }
        Ok(())
    }

    fn is_paused(&self) -> bool {
        lock(&self.active).as_ref().is_some_and(|a| a.paused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{SpeechEvent, SpeechEventKind, SpeechEventSink};
    use std::time::Duration;
    use tokio::sync::mpsc;

    const TABLE: &str = "\
Pty Language       Age/Gender VoiceName          File                 Other Languages
 5  af              --/M      Afrikaans          gmw/af
 2  en-us           --/M      English_(America)  gmw/en-US            (en 3)
 5  x
";

    fn utterance(
        text: &str,
        voice: Option<&str>,
        rate: f32,
    ) -> (Utterance, mpsc::UnboundedReceiver<SpeechEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let tag = UtteranceTag {
            generation: 1,
            index: 0,
        };
        (
            Utterance {
                tag,
                text: text.to_string(),
                rate,
                voice_id: voice.map(str::to_string),
                events: SpeechEventSink::new(tag, tx),
            },
            rx,
        )
    }

    #[test]
    fn voice_table_parsing() {
        let voices = parse_voice_table(TABLE);
        assert_eq!(voices.len(), 2);
        assert_eq!(voices[1].id, "gmw/en-US");
        assert_eq!(voices[1].name, "English (America)");
        assert_eq!(voices[1].language_tag, "en-us");
    }

    #[test]
    fn rate_maps_to_words_per_minute() {
        assert_eq!(words_per_minute(175, 1.0), 175);
        assert_eq!(words_per_minute(175, 2.0), 350);
        assert_eq!(words_per_minute(175, 0.001), 1);
    }

    #[tokio::test]
    async fn args_carry_rate_voice_and_text() {
        let backend = CommandBackend::new(CommandBackendConfig::new().with_program("true")).unwrap();
        let (u, _rx) = utterance("hello", Some("gmw/en-US"), 1.5);
        assert_eq!(
            backend.speech_args(&u),
            vec!["-s", "263", "-v", "gmw/en-US", "hello"]
        );

        let (dash, _rx) = utterance("-v is not a flag", None, 1.0);
        assert_eq!(backend.speech_args(&dash).last().unwrap(), " -v is not a flag");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn successful_exit_reports_started_then_finished() {
        let backend = CommandBackend::new(CommandBackendConfig::new().with_program("true")).unwrap();
        let (u, mut rx) = utterance("hello", None, 1.0);
        tokio_test::assert_ok!(backend.speak(u));

        assert_eq!(rx.recv().await.unwrap().kind, SpeechEventKind::Started);
        let done = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(done.kind, SpeechEventKind::Finished);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_exit_reports_failed() {
        let backend = CommandBackend::new(CommandBackendConfig::new().with_program("false")).unwrap();
        let (u, mut rx) = utterance("hello", None, 1.0);
        backend.speak(u).unwrap();

        assert_eq!(rx.recv().await.unwrap().kind, SpeechEventKind::Started);
        let done = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(done.kind, SpeechEventKind::Failed(_)));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancelled_utterance_never_reports_completion() {
        let backend = CommandBackend::new(
            CommandBackendConfig::new()
                .with_program("sh")
                .with_extra_args(["-c", "sleep 5"]),
        )
        .unwrap();
        let (u, mut rx) = utterance("hello", None, 1.0);
        backend.speak(u).unwrap();
        assert_eq!(rx.recv().await.unwrap().kind, SpeechEventKind::Started);

        backend.pause().unwrap();
        assert!(backend.is_paused());
        backend.cancel().unwrap();
        assert!(!backend.is_paused());

        let next = tokio::time::timeout(Duration::from_millis(300), rx.recv()).await;
        assert!(!matches!(next, Ok(Some(_))));
    }

    #[tokio::test]
    async fn missing_program_fails_submission() {
        let backend = CommandBackend::new(
            CommandBackendConfig::new().with_program("threadcast-no-such-synthesizer"),
        )
        .unwrap();
        let (u, _rx) = utterance("hello", None, 1.0);
        assert!(matches!(backend.speak(u), Err(SpeechError::Submit(_))));
        assert!(backend.voices().is_empty());
    }

    #[test]
    fn construction_outside_runtime_is_unavailable() {
        let err = CommandBackend::new(CommandBackendConfig::new()).unwrap_err();
        assert!(matches!(err, SpeechError::Unavailable(_)));
    }
}
