//! The payload currently on display and the engine narrating it.
//!
//! Fetches race: only the newest one may replace what is shown. A loaded
//! payload replaces the previous engine wholesale; segments from separate
//! fetches are never merged.

use std::sync::Arc;

use threadcast_core::{RequestGate, RequestTicket, ThreadPayload};
use tokio::sync::mpsc;

use crate::backend::SpeechBackend;
use crate::engine::{PlaybackConfig, PlaybackEngine, PlaybackEvent};

/// Holds at most one payload and its engine.
pub struct NarrationSession {
    backend: Option<Arc<dyn SpeechBackend>>,
    config: PlaybackConfig,
    gate: RequestGate,
    engine: Option<PlaybackEngine>,
    events: Option<mpsc::UnboundedReceiver<PlaybackEvent>>,
}

impl NarrationSession {
    pub fn new(backend: Option<Arc<dyn SpeechBackend>>, config: PlaybackConfig) -> Self {
        Self {
            backend,
            config,
            gate: RequestGate::new(),
            engine: None,
            events: None,
        }
    }

    /// Start a fetch; any earlier fetch's result will be discarded.
    pub fn begin_fetch(&self) -> RequestTicket {
        self.gate.begin()
    }

    /// Show `payload` if `ticket` is still the newest fetch.
    ///
    /// The previous engine is stopped and dropped. Returns whether the
    /// payload was applied.
    pub fn load(&mut self, ticket: RequestTicket, payload: ThreadPayload) -> bool {
        let Some(payload) = self.gate.accept(ticket, payload) else {
            return false;
        };
        self.discard_engine();

        tracing::info!(
            title = %payload.title,
            segments = payload.len(),
            "Loaded payload for narration"
        );
        let (engine, events) =
            PlaybackEngine::new(self.backend.clone(), payload, self.config.clone());
        self.engine = Some(engine);
        self.events = Some(events);
        true
    }

    /// Stop narration, drop the payload and abandon any in-flight fetch.
    pub fn clear(&mut self) {
        self.gate.invalidate();
        self.discard_engine();
    }

    pub const fn engine(&self) -> Option<&PlaybackEngine> {
        self.engine.as_ref()
    }

    pub const fn engine_mut(&mut self) -> Option<&mut PlaybackEngine> {
        self.engine.as_mut()
    }

    pub fn payload(&self) -> Option<&ThreadPayload> {
        self.engine.as_ref().map(PlaybackEngine::payload)
    }

    /// Take the current engine, e.g. to hand it to [`PlaybackEngine::run`].
    pub fn take_engine(&mut self) -> Option<PlaybackEngine> {
        self.engine.take()
    }

    /// Take the event stream of the current engine.
    pub fn take_events(&mut self) -> Option<mpsc::UnboundedReceiver<PlaybackEvent>> {
        self.events.take()
    }

    fn discard_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            engine.stop();
        }
        self.events = None;
    }
}

impl std::fmt::Debug for NarrationSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NarrationSession")
            .field("engine", &self.engine)
            .field("has_backend", &self.backend.is_some())
            .finish_non_exhaustive()
    }
}
