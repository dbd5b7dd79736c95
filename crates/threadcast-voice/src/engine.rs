//! Sequential playback engine.
//!
//! A [`PlaybackEngine`] owns one [`ThreadPayload`] and drives a speech backend
//! through its segments one utterance at a time:
//!
//! ```text
//!   Idle ──play──▶ (submitted) ──Started──▶ Playing ──Finished──▶ next segment
//!     ▲                                       │  ▲                    │
//!     │                                 pause │  │ play               ▼
//!   stop                                      ▼  │               Ended (last)
//!                                            Paused
//! ```
//!
//! Every transition that submits speech first cancels the outstanding
//! utterance. Each submission carries a fresh [`UtteranceTag`]; backend events
//! for any other tag are stale and ignored, so a late completion from a
//! cancelled utterance can never advance the queue.
//!
//! Rate and voice changes apply to the next utterance only. Speech already in
//! flight keeps the rate and voice it was submitted with.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use threadcast_core::{ThreadPayload, Voice};
use tokio::sync::{mpsc, watch};
use tokio::time::Instant;

use crate::backend::{
    SpeechBackend, SpeechEvent, SpeechEventKind, SpeechEventSink, Utterance, UtteranceTag,
};
use crate::error::PlaybackError;

/// Slowest accepted rate multiplier.
pub const MIN_RATE: f32 = 0.1;
/// Fastest accepted rate multiplier.
pub const MAX_RATE: f32 = 10.0;

// ── State ──────────────────────────────────────────────────────────

/// Playback status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Idle,
    Playing,
    Paused,
    Ended,
    Error,
}

impl std::fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Idle => "idle",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Error => "error",
        };
        f.write_str(label)
    }
}

/// Snapshot of the engine's transport state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    pub status: PlaybackStatus,
    /// Index into the payload's segments, kept within `[0, len - 1]`.
    pub current_index: usize,
    pub rate: f32,
    pub voice_id: Option<String>,
}

/// Engine configuration.
#[derive(Debug, Clone)]
pub struct PlaybackConfig {
    /// Initial rate multiplier (default: 1.0).
    pub rate: f32,
    /// Initial voice; `None` uses the platform default.
    pub voice_id: Option<String>,
    /// How long to wait for a backend start event before failing (default: 5 s).
    pub start_timeout: Duration,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            rate: 1.0,
            voice_id: None,
            start_timeout: Duration::from_secs(5),
        }
    }
}

impl PlaybackConfig {
    #[must_use]
    pub const fn with_rate(mut self, rate: f32) -> Self {
        self.rate = rate;
        self
    }

    #[must_use]
    pub fn with_voice(mut self, voice_id: Option<String>) -> Self {
        self.voice_id = voice_id;
        self
    }

    #[must_use]
    pub const fn with_start_timeout(mut self, timeout: Duration) -> Self {
        self.start_timeout = timeout;
        self
    }
}

/// Events emitted from the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEvent {
    /// Status changed.
    StateChanged(PlaybackStatus),
    /// The backend started speaking a segment.
    SegmentStarted { index: usize, id: String },
    /// Playback failed; status is now `error`.
    Error(PlaybackError),
}

/// Transport commands accepted by [`PlaybackEngine::run`].
#[derive(Debug, Clone, PartialEq)]
pub enum TransportCommand {
    Play,
    Pause,
    Toggle,
    Restart,
    Skip(i64),
    SetIndex(usize),
    JumpTo(usize),
    Stop,
    SetRate(f32),
    AdjustRate(f32),
    SetVoice(Option<String>),
    Shutdown,
}

/// The submission the engine is waiting on.
#[derive(Debug, Clone, Copy)]
struct Pending {
    tag: UtteranceTag,
    started: bool,
    /// Start deadline, only while waiting for a start event.
    deadline: Option<Instant>,
}

// ── Engine ─────────────────────────────────────────────────────────

/// State machine narrating one payload.
pub struct PlaybackEngine {
    backend: Option<Arc<dyn SpeechBackend>>,
    payload: ThreadPayload,
    state: PlaybackState,
    start_timeout: Duration,
    generation: u64,
    pending: Option<Pending>,
    event_tx: mpsc::UnboundedSender<PlaybackEvent>,
    speech_tx: mpsc::UnboundedSender<SpeechEvent>,
    speech_rx: Option<mpsc::UnboundedReceiver<SpeechEvent>>,
}

impl PlaybackEngine {
    /// Create an idle engine for `payload`.
    ///
    /// `backend` is `None` when the host has no speech support; playing then
    /// moves straight to `error`.
    pub fn new(
        backend: Option<Arc<dyn SpeechBackend>>,
        payload: ThreadPayload,
        config: PlaybackConfig,
    ) -> (Self, mpsc::UnboundedReceiver<PlaybackEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (speech_tx, speech_rx) = mpsc::unbounded_channel();
        let rate = if config.rate.is_finite() {
            config.rate.clamp(MIN_RATE, MAX_RATE)
        } else {
            1.0
        };
        let engine = Self {
            backend,
            payload,
            state: PlaybackState {
                status: PlaybackStatus::Idle,
                current_index: 0,
                rate,
                voice_id: config.voice_id,
            },
            start_timeout: config.start_timeout,
            generation: 0,
            pending: None,
            event_tx,
            speech_tx,
            speech_rx: Some(speech_rx),
        };
        (engine, event_rx)
    }

    pub const fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub const fn status(&self) -> PlaybackStatus {
        self.state.status
    }

    pub const fn payload(&self) -> &ThreadPayload {
        &self.payload
    }

    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    /// Voices the backend reports right now.
    pub fn available_voices(&self) -> Vec<Voice> {
        self.backend
            .as_ref()
            .map(|backend| backend.voices())
            .unwrap_or_default()
    }

    /// Change notifications for the backend's voice list.
    pub fn voice_updates(&self) -> Option<watch::Receiver<Vec<Voice>>> {
        self.backend.as_ref().map(|backend| backend.subscribe_voices())
    }

    // ── Transport ──────────────────────────────────────────────────

    /// Resume when paused, otherwise start speaking from the current index.
    pub fn play(&mut self) {
        if self.payload.is_empty() {
            return;
        }
        match self.state.status {
            PlaybackStatus::Paused if self.pending.is_some() => self.resume(),
            PlaybackStatus::Playing => {}
            _ if self.pending.is_some() => {
                tracing::debug!("Play ignored, utterance already submitted");
            }
            _ => self.speak_from(self.state.current_index),
        }
    }

    /// Pause the backend. A start deadline still outstanding is suspended
    /// until [`play`](Self::play) resumes.
    pub fn pause(&mut self) {
        if self.state.status != PlaybackStatus::Playing {
            return;
        }
        let Some(backend) = self.backend.clone() else {
            return;
        };
        match backend.pause() {
            Ok(()) => {
                if let Some(pending) = self.pending.as_mut() {
                    pending.deadline = None;
                }
                self.set_status(PlaybackStatus::Paused);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend pause failed");
                self.fail(PlaybackError::Utterance(e.to_string()));
            }
        }
    }

    /// Pause while playing, play otherwise.
    pub fn toggle(&mut self) {
        if self.state.status == PlaybackStatus::Playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Start over from the first segment regardless of status.
    pub fn restart(&mut self) {
        self.state.current_index = 0;
        self.speak_from(0);
    }

    /// Move `delta` segments, clamped to the payload, and speak from there.
    pub fn skip(&mut self, delta: i64) {
        let len = self.payload.len();
        if len == 0 {
            return;
        }
        let last = i64::try_from(len - 1).unwrap_or(i64::MAX);
        let current = i64::try_from(self.state.current_index).unwrap_or(last);
        let target = current.saturating_add(delta).clamp(0, last);
        self.speak_from(usize::try_from(target).unwrap_or(0));
    }

    /// Select a segment without speaking it.
    pub fn set_index(&mut self, index: usize) {
        if let Some(last) = self.payload.len().checked_sub(1) {
            self.state.current_index = index.min(last);
        }
    }

    /// Stop, select `index`, then speak from it.
    pub fn jump_to(&mut self, index: usize) {
        if self.payload.is_empty() {
            return;
        }
        self.stop();
        self.set_index(index);
        self.speak_from(self.state.current_index);
    }

    /// Cancel speech and return to `idle`, keeping the current index.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.set_status(PlaybackStatus::Idle);
    }

    /// Set the rate for the next utterance. Non-finite values are ignored.
    pub fn set_rate(&mut self, rate: f32) {
        if !rate.is_finite() {
            tracing::warn!(rate, "Ignoring non-finite speech rate");
            return;
        }
        self.state.rate = rate.clamp(MIN_RATE, MAX_RATE);
    }

    pub fn adjust_rate(&mut self, delta: f32) {
        self.set_rate(self.state.rate + delta);
    }

    /// Set the voice for the next utterance.
    pub fn set_voice(&mut self, voice_id: Option<String>) {
        self.state.voice_id = voice_id;
    }

    /// Apply one transport command. `Shutdown` stops playback.
    pub fn apply(&mut self, command: TransportCommand) {
        tracing::debug!(?command, "Transport command");
        match command {
            TransportCommand::Play => self.play(),
            TransportCommand::Pause => self.pause(),
            TransportCommand::Toggle => self.toggle(),
            TransportCommand::Restart => self.restart(),
            TransportCommand::Skip(delta) => self.skip(delta),
            TransportCommand::SetIndex(index) => self.set_index(index),
            TransportCommand::JumpTo(index) => self.jump_to(index),
            TransportCommand::Stop | TransportCommand::Shutdown => self.stop(),
            TransportCommand::SetRate(rate) => self.set_rate(rate),
            TransportCommand::AdjustRate(delta) => self.adjust_rate(delta),
            TransportCommand::SetVoice(voice_id) => self.set_voice(voice_id),
        }
    }

    // ── Backend events ─────────────────────────────────────────────

    /// Apply a backend event. Events for anything but the pending submission
    /// are ignored.
    pub fn handle_speech_event(&mut self, event: SpeechEvent) {
        let Some(pending) = self.pending.filter(|p| p.tag == event.tag) else {
            tracing::debug!(
                index = event.tag.index,
                generation = event.tag.generation,
                kind = ?event.kind,
                "Ignoring stale speech event"
            );
            return;
        };
        let index = pending.tag.index;

        match event.kind {
            SpeechEventKind::Started => {
                if !pending.started {
                    self.pending = Some(Pending {
                        started: true,
                        deadline: None,
                        ..pending
                    });
                    if self.state.status == PlaybackStatus::Paused {
                        // Started behind a held pause: report it, stay paused.
                        self.announce(index);
                    } else {
                        self.mark_started(index);
                    }
                }
            }
            SpeechEventKind::Finished => {
                self.pending = None;
                tracing::debug!(index, "Segment finished");
                self.speak_from(index + 1);
            }
            SpeechEventKind::Failed(message) => {
                self.pending = None;
                tracing::warn!(index, error = %message, "Utterance failed");
                self.fail(PlaybackError::Utterance(message));
            }
        }
    }

    /// Process every backend event already queued. Returns how many were
    /// handled. Only meaningful before [`run`](Self::run) takes the queue.
    pub fn drain_speech_events(&mut self) -> usize {
        let mut handled = 0;
        while let Some(event) = self.speech_rx.as_mut().and_then(|rx| rx.try_recv().ok()) {
            self.handle_speech_event(event);
            handled += 1;
        }
        handled
    }

    /// When the pending submission must have started by.
    pub fn start_deadline(&self) -> Option<Instant> {
        self.pending.and_then(|p| p.deadline)
    }

    /// Fail the pending submission if it has not started by `now`.
    ///
    /// Returns `true` if the engine moved to `error`.
    pub fn check_start_timeout(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.start_deadline() else {
            return false;
        };
        if now < deadline {
            return false;
        }
        tracing::warn!(
            index = self.state.current_index,
            timeout = ?self.start_timeout,
            "Speech backend did not start in time"
        );
        self.cancel_pending();
        self.fail(PlaybackError::Utterance(format!(
            "speech backend did not start within {:?}",
            self.start_timeout
        )));
        true
    }

    /// Drive the engine from transport commands and backend events until
    /// `Shutdown` or the command channel closes. Returns the final state.
    pub async fn run(mut self, mut commands: mpsc::Receiver<TransportCommand>) -> PlaybackState {
        let Some(mut speech_rx) = self.speech_rx.take() else {
            return self.state;
        };

        loop {
            let deadline = self.start_deadline();
            tokio::select! {
                command = commands.recv() => match command {
                    Some(TransportCommand::Shutdown) | None => break,
                    Some(command) => self.apply(command),
                },
                Some(event) = speech_rx.recv() => self.handle_speech_event(event),
                () = sleep_until(deadline) => {
                    self.check_start_timeout(Instant::now());
                }
            }
        }

        self.stop();
        tracing::debug!(state = ?self.state, "Playback engine shut down");
        self.state
    }

    // ── Internals ──────────────────────────────────────────────────

    /// Speak from `start`, skipping unspeakable segments; past the end the
    /// engine moves to `ended`.
    fn speak_from(&mut self, start: usize) {
        self.cancel_pending();

        let mut index = start;
        loop {
            let Some(segment) = self.payload.segment(index) else {
                if let Some(last) = self.payload.len().checked_sub(1) {
                    self.state.current_index = index.min(last);
                }
                self.set_status(PlaybackStatus::Ended);
                return;
            };
            if segment.is_speakable() {
                break;
            }
            tracing::debug!(index, "Skipping unspeakable segment");
            index += 1;
        }

        let Some(backend) = self.backend.clone() else {
            self.fail(PlaybackError::BackendUnavailable);
            return;
        };
        // A fresh utterance never inherits a pause.
        if backend.is_paused() {
            if let Err(e) = backend.resume() {
                tracing::warn!(error = %e, "Backend resume before submission failed");
            }
        }
        if self.state.status == PlaybackStatus::Paused {
            self.set_status(PlaybackStatus::Idle);
        }
        let text = self
            .payload
            .segment(index)
            .map(|segment| segment.text.clone())
            .unwrap_or_default();

        self.generation += 1;
        let tag = UtteranceTag {
            generation: self.generation,
            index,
        };
        let utterance = Utterance {
            tag,
            text,
            rate: self.state.rate,
            voice_id: self.resolve_voice(backend.as_ref()),
            events: SpeechEventSink::new(tag, self.speech_tx.clone()),
        };
        self.state.current_index = index;

        match backend.speak(utterance) {
            Ok(()) if backend.emits_start_events() => {
                self.pending = Some(Pending {
                    tag,
                    started: false,
                    deadline: Some(Instant::now() + self.start_timeout),
                });
            }
            Ok(()) => {
                self.pending = Some(Pending {
                    tag,
                    started: true,
                    deadline: None,
                });
                self.mark_started(index);
            }
            Err(e) => {
                tracing::warn!(index, error = %e, "Utterance submission failed");
                self.fail(PlaybackError::Utterance(e.to_string()));
            }
        }
    }

    fn resume(&mut self) {
        let Some(backend) = self.backend.clone() else {
            self.fail(PlaybackError::BackendUnavailable);
            return;
        };
        match backend.resume() {
            Ok(()) => {
                let timeout = self.start_timeout;
                if let Some(pending) = self.pending.as_mut().filter(|p| !p.started) {
                    pending.deadline = Some(Instant::now() + timeout);
                }
                self.set_status(PlaybackStatus::Playing);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Backend resume failed");
                self.fail(PlaybackError::Utterance(e.to_string()));
            }
        }
    }

    /// Cancel whatever the backend is doing and forget the pending tag.
    fn cancel_pending(&mut self) {
        self.pending = None;
        if let Some(backend) = &self.backend {
            if let Err(e) = backend.cancel() {
                tracing::warn!(error = %e, "Backend cancel failed");
            }
        }
    }

    /// The configured voice if the backend currently reports it.
    fn resolve_voice(&self, backend: &dyn SpeechBackend) -> Option<String> {
        let wanted = self.state.voice_id.as_deref()?;
        if backend.voices().iter().any(|voice| voice.id == wanted) {
            Some(wanted.to_string())
        } else {
            tracing::debug!(voice_id = wanted, "Voice not available, using platform default");
            None
        }
    }

    fn mark_started(&mut self, index: usize) {
        self.set_status(PlaybackStatus::Playing);
        self.announce(index);
    }

    fn announce(&self, index: usize) {
        if let Some(segment) = self.payload.segment(index) {
            tracing::info!(index, id = %segment.id, "Speaking segment");
            self.emit(PlaybackEvent::SegmentStarted {
                index,
                id: segment.id.clone(),
            });
        }
    }

    fn fail(&mut self, error: PlaybackError) {
        self.pending = None;
        self.set_status(PlaybackStatus::Error);
        self.emit(PlaybackEvent::Error(error));
    }

    fn set_status(&mut self, status: PlaybackStatus) {
        if self.state.status != status {
            tracing::debug!(from = %self.state.status, to = %status, "Playback status changed");
            self.state.status = status;
            self.emit(PlaybackEvent::StateChanged(status));
        }
    }

    fn emit(&self, event: PlaybackEvent) {
        let _ = self.event_tx.send(event);
    }
}

impl std::fmt::Debug for PlaybackEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackEngine")
            .field("state", &self.state)
            .field("segments", &self.payload.len())
            .field("has_backend", &self.backend.is_some())
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use threadcast_core::Segment;

    fn payload(n: usize) -> ThreadPayload {
        let segments = (0..n)
            .map(|i| Segment::new(format!("s{i}"), format!("segment {i}")))
            .collect();
        ThreadPayload::new("Test", segments)
    }

    #[test]
    fn status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&PlaybackStatus::Playing).unwrap(),
            "\"playing\""
        );
        let state = PlaybackState {
            status: PlaybackStatus::Ended,
            current_index: 2,
            rate: 1.0,
            voice_id: None,
        };
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["currentIndex"], 2);
        assert_eq!(json["status"], "ended");
    }

    #[test]
    fn config_rate_is_clamped() {
        let (engine, _rx) =
            PlaybackEngine::new(None, payload(1), PlaybackConfig::default().with_rate(50.0));
        assert!((engine.state().rate - MAX_RATE).abs() < f32::EPSILON);

        let (engine, _rx) =
            PlaybackEngine::new(None, payload(1), PlaybackConfig::default().with_rate(f32::NAN));
        assert!((engine.state().rate - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn set_index_clamps_without_speaking() {
        let (mut engine, _rx) = PlaybackEngine::new(None, payload(3), PlaybackConfig::default());
        engine.set_index(10);
        assert_eq!(engine.state().current_index, 2);
        assert_eq!(engine.status(), PlaybackStatus::Idle);
    }

    #[test]
    fn empty_payload_ignores_transport() {
        let (mut engine, mut rx) = PlaybackEngine::new(None, payload(0), PlaybackConfig::default());
        engine.play();
        engine.skip(3);
        engine.jump_to(1);
        assert_eq!(engine.status(), PlaybackStatus::Idle);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn rate_changes_reject_non_finite() {
        let (mut engine, _rx) = PlaybackEngine::new(None, payload(1), PlaybackConfig::default());
        engine.set_rate(2.0);
        engine.set_rate(f32::INFINITY);
        assert!((engine.state().rate - 2.0).abs() < f32::EPSILON);
        engine.adjust_rate(-5.0);
        assert!((engine.state().rate - MIN_RATE).abs() < f32::EPSILON);
    }
}
