//! Speech and playback error types.

/// Errors reported by a speech backend.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpeechError {
    /// The backend cannot be used at all on this host.
    #[error("Speech backend unavailable: {0}")]
    Unavailable(String),

    /// An utterance could not be submitted.
    #[error("Failed to submit utterance: {0}")]
    Submit(String),

    /// Pause, resume or cancel failed.
    #[error("Speech control failed: {0}")]
    Control(String),
}

/// Failures that move the playback engine to the `error` status.
///
/// These are reported through [`PlaybackEvent::Error`](crate::PlaybackEvent)
/// and the engine status, never returned from transport calls.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    /// No speech backend is available.
    #[error("No speech backend is available")]
    BackendUnavailable,

    /// The backend rejected or failed an utterance.
    #[error("Utterance failed: {0}")]
    Utterance(String),
}
