//! Synthesizer voice descriptor.

use serde::{Deserialize, Serialize};

/// A voice reported by the platform's speech backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Voice {
    /// Backend identifier passed back when speaking.
    pub id: String,

    /// Human-readable display name.
    pub name: String,

    /// BCP 47-ish language tag (e.g. `"en-US"`), as reported by the backend.
    pub language_tag: String,
}

impl Voice {
    pub fn new(id: impl Into<String>, name: impl Into<String>, language_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            language_tag: language_tag.into(),
        }
    }
}
