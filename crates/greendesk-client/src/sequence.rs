//! Last-request-wins sequencing for fetches that can be superseded.
//!
//! Each fetch takes a ticket from a monotonically increasing counter when it
//! is issued. When it resolves, its result is only handed back as current if
//! no newer ticket has been issued in the meantime. A slow response for an old
//! filter can therefore never overwrite the state of a newer one.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::debug;

/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Outcome of a sequenced fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// Latest request; apply it.
    Current(T),
    /// Superseded by a newer request; drop it.
    Stale,
}

impl<T> Fetched<T> {
    pub fn current(self) -> Option<T> {
        match self {
            Fetched::Current(v) => Some(v),
            Fetched::Stale => None,
        }
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Fetched::Stale)
    }
}

/// Shared request counter. Clones share the same sequence.
#[derive(Debug, Clone, Default)]
pub struct RequestSequence {
    latest: Arc<AtomicU64>,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new ticket, superseding every earlier one.
    pub fn issue(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Run `fut` under a ticket issued now (not at first poll).
    pub fn run<F>(&self, fut: F) -> impl Future<Output = Fetched<F::Output>>
    where
        F: Future,
    {
        let ticket = self.issue();
        let seq = self.clone();
        async move {
            let out = fut.await;
            if seq.is_current(ticket) {
                Fetched::Current(out)
            } else {
                debug!(ticket = ticket.0, "discarding superseded response");
                Fetched::Stale
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn tickets_increase() {
        let seq = RequestSequence::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert!(!seq.is_current(a));
        assert!(seq.is_current(b));
    }

    #[test]
    fn clones_share_counter() {
        let seq = RequestSequence::new();
        let other = seq.clone();
        let a = seq.issue();
        other.issue();
        assert!(!seq.is_current(a));
    }

    #[tokio::test]
    async fn slow_superseded_fetch_is_stale() {
        let seq = RequestSequence::new();
        let slow = seq.run(async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            "old"
        });
        let fast = seq.run(async { "new" });

        let (slow, fast) = tokio::join!(slow, fast);
        assert_eq!(slow, Fetched::Stale);
        assert_eq!(fast, Fetched::Current("new"));
    }

    #[tokio::test]
    async fn ticket_taken_at_issue_not_at_poll() {
        let seq = RequestSequence::new();
        let first = seq.run(async { 1 });
        let second = seq.run(async { 2 });
        // Await in the "wrong" order: the first is still superseded.
        assert_eq!(second.await, Fetched::Current(2));
        assert!(first.await.is_stale());
    }

    #[tokio::test]
    async fn lone_fetch_is_current() {
        let seq = RequestSequence::new();
        assert_eq!(seq.run(async { 7 }).await.current(), Some(7));
    }
}
