//! # threadcast-voice
//!
//! Narrates a [`ThreadPayload`](threadcast_core::ThreadPayload) through a
//! speech synthesis backend.
//!
//! - [`backend`]: the [`SpeechBackend`] trait and the process-based
//!   [`CommandBackend`].
//! - [`engine`]: the [`PlaybackEngine`] state machine and its async driver.
//! - [`session`]: [`NarrationSession`], which swaps engines as fetches land.
#![deny(unused_crate_dependencies)]

pub mod backend;
pub mod engine;
pub mod error;
pub mod session;

pub use backend::command::{CommandBackend, CommandBackendConfig};
pub use backend::{
    SpeechBackend, SpeechEvent, SpeechEventKind, SpeechEventSink, Utterance, UtteranceTag,
};
pub use engine::{
    MAX_RATE, MIN_RATE, PlaybackConfig, PlaybackEngine, PlaybackEvent, PlaybackState,
    PlaybackStatus, TransportCommand,
};
pub use error::{PlaybackError, SpeechError};
pub use session::NarrationSession;

