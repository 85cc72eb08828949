use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Request-sequence guard for overlapping fetches.
///
/// Every fetch takes a ticket with [`FetchSequence::begin`]; when its response
/// arrives it is applied only if [`FetchSequence::is_current`] still holds,
/// i.e. no newer fetch was started in the meantime. Clones share the counter.
#[derive(Debug, Clone, Default)]
pub struct FetchSequence {
    latest: Arc<AtomicU64>,
}

/// Ticket of one fetch, see [`FetchSequence`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket(u64);

impl FetchSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> FetchTicket {
        FetchTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }
}
