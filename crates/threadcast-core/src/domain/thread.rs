//! The Segment Model: an ordered list of narratable text fragments.

use serde::{Deserialize, Serialize};

/// One unit of narrated text.
///
/// `id` is unique within a single [`ThreadPayload`] and stable across
/// re-renders of that payload. It is *not* stable across separate fetches of
/// the same logical thread, so payloads must never be merged by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: String,
    pub text: String,
}

impl Segment {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    /// Whether the segment has anything a synthesizer could say.
    pub fn is_speakable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// The result of one assembly action.
///
/// `segments` order is playback order. A payload is constructed once per
/// fetch and replaced wholesale on the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreadPayload {
    /// Human-readable title, e.g. `"Alice (3 posts)"`.
    pub title: String,

    /// Upstream handle of the thread author, when known.
    pub author_handle: Option<String>,

    /// URL the payload was assembled from, when sourced remotely.
    pub source_url: Option<String>,

    /// Ordered segments.
    pub segments: Vec<Segment>,

    /// Non-fatal problem encountered while assembling (degrade path).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl ThreadPayload {
    /// Build a payload with no author, source or warning.
    pub fn new(title: impl Into<String>, segments: Vec<Segment>) -> Self {
        Self {
            title: title.into(),
            author_handle: None,
            source_url: None,
            segments,
            warning: None,
        }
    }

    #[must_use]
    pub fn with_author_handle(mut self, handle: Option<String>) -> Self {
        self.author_handle = handle;
        self
    }

    #[must_use]
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(warning.into());
        self
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether at least one segment can actually be spoken.
    pub fn is_playable(&self) -> bool {
        self.segments.iter().any(Segment::is_speakable)
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }
}
