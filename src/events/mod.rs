//! Advisory notifications emitted by the clone workflow
//!
//! The workflow never changes control flow based on these events; they
//! exist so a front end can show progress and downgraded failures.

use std::sync::Mutex;
use tracing::{info, warn};

/// Receiver for `info` and `warn` notifications
pub trait EventSink: Send + Sync {
    /// Progress or diagnostic message
    fn info(&self, message: &str);

    /// A failure that was downgraded and did not abort the clone
    fn warn(&self, message: &str);
}

/// Forwards every event to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}

/// Severity of a recorded event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Info,
    Warn,
}

/// A single recorded event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub level: EventLevel,
    pub message: String,
}

/// Keeps every event in memory, in emission order
///
/// # Example
/// ```
/// use degit::events::{EventSink, RecordingSink};
///
/// let sink = RecordingSink::new();
/// sink.warn("could not remove HEAD.tar.gz");
/// assert_eq!(sink.warnings(), vec!["could not remove HEAD.tar.gz".to_owned()]);
/// ```
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    /// Create an empty recorder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: EventLevel, message: &str) {
        // A poisoned lock still holds valid events
        let mut events = self
            .events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        events.push(Event {
            level,
            message: message.to_owned(),
        });
    }

    /// All events recorded so far
    #[must_use]
    pub fn events(&self) -> Vec<Event> {
        self.events
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Messages of recorded `warn` events
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.messages(EventLevel::Warn)
    }

    /// Messages of recorded `info` events
    #[must_use]
    pub fn infos(&self) -> Vec<String> {
        self.messages(EventLevel::Info)
    }

    fn messages(&self, level: EventLevel) -> Vec<String> {
        self.events()
            .into_iter()
            .filter(|event| event.level == level)
            .map(|event| event.message)
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn info(&self, message: &str) {
        self.push(EventLevel::Info, message);
    }

    fn warn(&self, message: &str) {
        self.push(EventLevel::Warn, message);
    }
}
