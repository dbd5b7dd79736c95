//! Last-write-wins gating for user-initiated fetches.
//!
//! Each new fetch takes a ticket. A result may only be applied while its
//! ticket is still the newest one issued; responses from superseded fetches
//! are discarded rather than displayed.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Opaque token identifying one fetch attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub const fn sequence(self) -> u64 {
        self.0
    }
}

/// Issues monotonically increasing tickets; clones share the same counter.
#[derive(Debug, Clone, Default)]
pub struct RequestGate {
    latest: Arc<AtomicU64>,
}

impl RequestGate {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new fetch, superseding every earlier ticket.
    pub fn begin(&self) -> RequestTicket {
        RequestTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether `ticket` is the newest one issued.
    pub fn is_current(&self, ticket: RequestTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Return `value` only if `ticket` is still current.
    pub fn accept<T>(&self, ticket: RequestTicket, value: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(value)
        } else {
            tracing::debug!(
                ticket = ticket.0,
                latest = self.latest.load(Ordering::SeqCst),
                "Discarding stale fetch result"
            );
            None
        }
    }

    /// Invalidate every outstanding ticket without starting a fetch.
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }
}
