//! Speech backend trait: the engine-agnostic interface over a platform
//! text-to-speech engine.
//!
//! The [`PlaybackEngine`](crate::PlaybackEngine) holds an
//! `Option<Arc<dyn SpeechBackend>>`; `None` models a host without speech
//! support. Backends report progress asynchronously through the
//! [`SpeechEventSink`] carried by each [`Utterance`].
//!
//! ## Backend implementations
//!
//! | Module      | Engine                                   |
//! |-------------|------------------------------------------|
//! | [`command`] | One synthesizer process per utterance    |

pub mod command;

use threadcast_core::Voice;
use tokio::sync::{mpsc, watch};

use crate::error::SpeechError;

// ── Shared types ───────────────────────────────────────────────────

/// Identifies one submitted utterance.
///
/// `generation` increases on every submission, so a tag is never reused
/// within one engine even when the same index is spoken twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UtteranceTag {
    pub generation: u64,
    /// Segment index the utterance speaks.
    pub index: usize,
}

/// What happened to an utterance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpeechEventKind {
    Started,
    Finished,
    Failed(String),
}

/// A backend notification tagged with the utterance it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechEvent {
    pub tag: UtteranceTag,
    pub kind: SpeechEventKind,
}

/// Where a backend reports events for one utterance.
///
/// Sends never fail from the backend's point of view; if the engine is gone
/// the event is dropped.
#[derive(Debug, Clone)]
pub struct SpeechEventSink {
    tag: UtteranceTag,
    tx: mpsc::UnboundedSender<SpeechEvent>,
}

impl SpeechEventSink {
    pub const fn new(tag: UtteranceTag, tx: mpsc::UnboundedSender<SpeechEvent>) -> Self {
        Self { tag, tx }
    }

    pub const fn tag(&self) -> UtteranceTag {
        self.tag
    }

    pub fn started(&self) {
        self.emit(SpeechEventKind::Started);
    }

    pub fn finished(&self) {
        self.emit(SpeechEventKind::Finished);
    }

    pub fn failed(&self, message: impl Into<String>) {
        self.emit(SpeechEventKind::Failed(message.into()));
    }

    fn emit(&self, kind: SpeechEventKind) {
        let _ = self.tx.send(SpeechEvent {
            tag: self.tag,
            kind,
        });
    }
}

/// One request to synthesize and play a segment's text.
#[derive(Debug, Clone)]
pub struct Utterance {
    pub tag: UtteranceTag,
    pub text: String,
    /// Speaking rate multiplier, 1.0 is the platform default.
    pub rate: f32,
    /// Voice to use; `None` means the platform default.
    pub voice_id: Option<String>,
    pub events: SpeechEventSink,
}

// ── Speech Backend Trait ───────────────────────────────────────────

/// Backend-agnostic text-to-speech engine.
///
/// Implementations must be `Send + Sync` so one backend can be shared by
/// successive engines. At most one utterance is in flight: `speak` is only
/// called after `cancel`.
pub trait SpeechBackend: Send + Sync {
    /// Voices the platform currently reports. Queried fresh on every call.
    fn voices(&self) -> Vec<Voice>;

    /// Change notification for the voice list, which may populate late.
    fn subscribe_voices(&self) -> watch::Receiver<Vec<Voice>>;

    /// Submit an utterance. Progress is reported through `utterance.events`.
    fn speak(&self, utterance: Utterance) -> Result<(), SpeechError>;

    fn pause(&self) -> Result<(), SpeechError>;

    fn resume(&self) -> Result<(), SpeechError>;

    /// Cancel the in-flight utterance, if any.
    ///
    /// Takes effect before the next `speak`; a cancelled utterance must not
    /// report `Finished` or `Failed` afterwards.
    fn cancel(&self) -> Result<(), SpeechError>;

    fn is_paused(&self) -> bool;

    /// Whether the backend reports [`SpeechEventKind::Started`].
    ///
    /// Engines treat a submission as started immediately when this is `false`.
    fn emits_start_events(&self) -> bool {
        true
    }
}
