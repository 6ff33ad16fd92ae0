//! Destinations for enriched log events.
//!
//! [`VecSink`] keeps events in memory for inspection; [`DelegatingSink`]
//! hands each event to a closure.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::event::LogEvent;

/// Error returned when a sink cannot write an event.
///
/// The logger reports sink errors through `tracing` and carries on; they
/// never reach the code that issued the log statement.
///
/// # Examples
///
/// ```
/// use identity_enrichers::{SinkError, SinkErrorKind};
///
/// let error = SinkError::with_message(SinkErrorKind::Io, "disk full");
/// assert_eq!(error.kind(), SinkErrorKind::Io);
/// assert_eq!(error.to_string(), "sink error (I/O error): disk full");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkError {
    kind: SinkErrorKind,
    message: Option<String>,
}

impl SinkError {
    /// Creates a new sink error with the specified kind.
    pub fn new(kind: SinkErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    /// Creates a new sink error with a custom message.
    pub fn with_message(kind: SinkErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    /// Returns the error kind.
    pub fn kind(&self) -> SinkErrorKind {
        self.kind
    }

    /// Returns the error message, if any.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

impl fmt::Display for SinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(msg) = &self.message {
            write!(f, "sink error ({}): {}", self.kind, msg)
        } else {
            write!(f, "sink error ({})", self.kind)
        }
    }
}

impl std::error::Error for SinkError {}

/// Kind of sink error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkErrorKind {
    /// I/O error occurred while writing.
    Io,
    /// Sink is full or has reached capacity.
    Full,
}

impl fmt::Display for SinkErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io => write!(f, "I/O error"),
            Self::Full => write!(f, "sink full"),
        }
    }
}

/// Destination for fully enriched log events.
pub trait EventSink: Send + Sync {
    /// Writes one event.
    ///
    /// # Errors
    ///
    /// Returns `SinkError` if the event could not be written.
    fn emit(&self, event: &LogEvent) -> Result<(), SinkError>;
}

/// In-memory sink that keeps every event it receives.
///
/// Clones share the same buffer, so one handle can go to the logger while
/// another is kept for inspection.
///
/// # Examples
///
/// ```
/// use identity_enrichers::{LoggerConfig, VecSink};
///
/// let sink = VecSink::new();
/// let logger = LoggerConfig::new().write_to(sink.clone()).build();
///
/// logger.info("first");
/// logger.info("second");
///
/// assert_eq!(sink.len(), 2);
/// assert_eq!(sink.with_events(|events| events[1].message().to_string()), "second");
/// ```
#[derive(Debug, Clone, Default)]
pub struct VecSink {
    events: Arc<Mutex<Vec<LogEvent>>>,
    capacity: Option<usize>,
}

impl VecSink {
    /// Creates a new unbounded sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that rejects events once `capacity` are stored.
    pub fn bounded(capacity: usize) -> Self {
        Self {
            events: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Returns the number of stored events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns `true` if no events have been stored.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Provides borrowed access to the stored events.
    pub fn with_events<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&[LogEvent]) -> R,
    {
        f(&self.events.lock())
    }

    /// Returns the most recently stored event.
    pub fn last(&self) -> Option<LogEvent> {
        self.events.lock().last().cloned()
    }

    /// Removes and returns all stored events.
    pub fn drain(&self) -> Vec<LogEvent> {
        std::mem::take(&mut *self.events.lock())
    }
}

impl EventSink for VecSink {
    fn emit(&self, event: &LogEvent) -> Result<(), SinkError> {
        let mut events = self.events.lock();
        if let Some(capacity) = self.capacity {
            if events.len() >= capacity {
                return Err(SinkError::with_message(
                    SinkErrorKind::Full,
                    format!("capacity of {} events reached", capacity),
                ));
            }
        }
        events.push(event.clone());
        Ok(())
    }
}

/// Sink that hands every event to a closure.
pub struct DelegatingSink<F> {
    write: F,
}

impl<F> DelegatingSink<F>
where
    F: Fn(&LogEvent) + Send + Sync,
{
    /// Creates a sink calling `write` for each event.
    pub fn new(write: F) -> Self {
        Self { write }
    }
}

impl<F> fmt::Debug for DelegatingSink<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelegatingSink").finish_non_exhaustive()
    }
}

impl<F> EventSink for DelegatingSink<F>
where
    F: Fn(&LogEvent) + Send + Sync,
{
    fn emit(&self, event: &LogEvent) -> Result<(), SinkError> {
        (self.write)(event);
        Ok(())
    }
}
