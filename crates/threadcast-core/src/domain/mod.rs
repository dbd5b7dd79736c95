//! Domain types for threadcast.
//!
//! These types are the wire shapes shared by assembly, playback and the
//! HTTP adapter. They carry no infrastructure concerns.

mod thread;
mod voice;

pub use thread::{Segment, ThreadPayload};
pub use voice::Voice;
