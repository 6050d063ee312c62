//! Notification bus for toast-style messages.
//!
//! Operations publish through a [`Notifier`] handed to them explicitly; any
//! number of renderers subscribe. Publishing with no subscribers is not an error.

use std::fmt;

use chrono::{DateTime, Utc};
use tokio::sync::broadcast;
use tracing::trace;

const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub level: Level,
    pub message: String,
    pub at: DateTime<Utc>,
}

/// Sending half of the bus. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notification>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Publish a notification. Returns how many subscribers will see it.
    pub fn notify(&self, level: Level, message: impl Into<String>) -> usize {
        let note = Notification {
            level,
            message: message.into(),
            at: Utc::now(),
        };
        match self.tx.send(note) {
            Ok(n) => n,
            Err(_) => {
                trace!("notification dropped: no subscribers");
                0
            }
        }
    }

    pub fn info(&self, message: impl Into<String>) -> usize {
        self.notify(Level::Info, message)
    }

    pub fn success(&self, message: impl Into<String>) -> usize {
        self.notify(Level::Success, message)
    }

    pub fn warning(&self, message: impl Into<String>) -> usize {
        self.notify(Level::Warning, message)
    }

    pub fn error(&self, message: impl Into<String>) -> usize {
        self.notify(Level::Error, message)
    }
}
