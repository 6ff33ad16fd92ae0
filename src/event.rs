//! Log events and their property bag.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Severity of a log event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Very fine-grained diagnostics
    Trace,
    /// Debugging information
    Debug,
    /// Normal operation
    Info,
    /// Something unexpected but recoverable
    Warn,
    /// A failure
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

impl From<tracing::Level> for LogLevel {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => LogLevel::Trace,
            tracing::Level::DEBUG => LogLevel::Debug,
            tracing::Level::INFO => LogLevel::Info,
            tracing::Level::WARN => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// A named value attached to a log event.
///
/// Enrichers hand out `Arc<LogProperty>` so that every event in a request
/// shares the same instance; compare with [`Arc::ptr_eq`] to observe it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogProperty {
    name: String,
    value: String,
}

impl LogProperty {
    /// Creates a property.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Returns the property name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the property value.
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl fmt::Display for LogProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={:?}", self.name, self.value)
    }
}

/// A log event under construction.
///
/// Properties are keyed by name. Adding is strictly additive: a property
/// that is already present is never replaced.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use identity_enrichers::{LogEvent, LogLevel, LogProperty};
///
/// let mut event = LogEvent::new(LogLevel::Info, "user signed in");
/// assert!(event.add_property_if_absent(Arc::new(LogProperty::new("ObjectId", "abc-123"))));
/// assert!(!event.add_property_if_absent(Arc::new(LogProperty::new("ObjectId", "other"))));
///
/// assert_eq!(event.property_value("ObjectId"), Some("abc-123"));
/// ```
#[derive(Debug, Clone)]
pub struct LogEvent {
    level: LogLevel,
    message: String,
    properties: BTreeMap<String, Arc<LogProperty>>,
}

impl LogEvent {
    /// Creates an event with no properties.
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            properties: BTreeMap::new(),
        }
    }

    /// Returns the event level.
    pub fn level(&self) -> LogLevel {
        self.level
    }

    /// Returns the rendered message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Adds `property` unless one with the same name exists.
    ///
    /// Returns `true` if the property was inserted.
    pub fn add_property_if_absent(&mut self, property: Arc<LogProperty>) -> bool {
        if self.properties.contains_key(property.name()) {
            return false;
        }
        self.properties.insert(property.name().to_string(), property);
        true
    }

    /// Returns the property named `name`.
    pub fn property(&self, name: &str) -> Option<&Arc<LogProperty>> {
        self.properties.get(name)
    }

    /// Returns the value of the property named `name`.
    pub fn property_value(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(|p| p.value())
    }

    /// Returns `true` if a property named `name` is present.
    pub fn contains_property(&self, name: &str) -> bool {
        self.properties.contains_key(name)
    }

    /// Iterates over properties in name order.
    pub fn properties(&self) -> impl Iterator<Item = &Arc<LogProperty>> {
        self.properties.values()
    }

    /// Returns the number of attached properties.
    pub fn property_count(&self) -> usize {
        self.properties.len()
    }
}

impl fmt::Display for LogEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)?;
        for property in self.properties.values() {
            write!(f, " {}", property)?;
        }
        Ok(())
    }
}
