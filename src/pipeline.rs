//! A minimal structured logging pipeline: enrichers, then sinks.
//!
//! [`LoggerConfig`] collects enrichers and sinks; [`Logger`] runs them for
//! each event. The logger can be called directly or installed as a
//! `tracing_subscriber` layer so that ordinary `tracing` macros go through the
//! same enrichment chain.

use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use tracing_subscriber::layer::{Context, Layer};

use crate::enricher::Enricher;
use crate::event::{LogEvent, LogLevel, LogProperty};
use crate::sink::EventSink;

/// Events from this crate's own diagnostics are not fed back into the pipeline.
const CRATE_TARGET: &str = env!("CARGO_CRATE_NAME");

/// Builder for a [`Logger`].
///
/// # Examples
///
/// ```
/// use identity_enrichers::{LogLevel, LoggerConfig, PropertyEnricher, VecSink};
///
/// let sink = VecSink::new();
/// let logger = LoggerConfig::new()
///     .minimum_level(LogLevel::Info)
///     .enrich_with(PropertyEnricher::object_id())
///     .write_to(sink.clone())
///     .build();
///
/// logger.debug("dropped");
/// logger.info("kept");
/// assert_eq!(sink.len(), 1);
/// ```
pub struct LoggerConfig {
    minimum_level: LogLevel,
    enrichers: Vec<Box<dyn Enricher>>,
    sinks: Vec<Box<dyn EventSink>>,
}

impl LoggerConfig {
    /// Creates a configuration that accepts every level and has no enrichers
    /// or sinks.
    pub fn new() -> Self {
        Self {
            minimum_level: LogLevel::Trace,
            enrichers: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Drops events below `level`.
    pub fn minimum_level(mut self, level: LogLevel) -> Self {
        self.minimum_level = level;
        self
    }

    /// Appends an enricher. Enrichers run in registration order.
    pub fn enrich_with(mut self, enricher: impl Enricher + 'static) -> Self {
        self.enrichers.push(Box::new(enricher));
        self
    }

    /// Appends a sink.
    pub fn write_to(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Returns the number of registered enrichers.
    pub fn enricher_count(&self) -> usize {
        self.enrichers.len()
    }

    /// Returns the number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Freezes the configuration into a logger.
    pub fn build(self) -> Logger {
        tracing::debug!(
            enrichers = self.enrichers.len(),
            sinks = self.sinks.len(),
            minimum_level = %self.minimum_level,
            "building logger"
        );
        Logger {
            inner: Arc::new(Pipeline {
                minimum_level: self.minimum_level,
                enrichers: self.enrichers,
                sinks: self.sinks,
            }),
        }
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("minimum_level", &self.minimum_level)
            .field("enrichers", &self.enrichers.len())
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

struct Pipeline {
    minimum_level: LogLevel,
    enrichers: Vec<Box<dyn Enricher>>,
    sinks: Vec<Box<dyn EventSink>>,
}

/// Enriches and writes log events. Cheap to clone.
#[derive(Clone)]
pub struct Logger {
    inner: Arc<Pipeline>,
}

impl Logger {
    /// Returns `true` if events at `level` are written.
    pub fn is_enabled(&self, level: LogLevel) -> bool {
        level >= self.inner.minimum_level
    }

    /// Logs `message` at `level`.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        if self.is_enabled(level) {
            self.dispatch(LogEvent::new(level, message));
        }
    }

    /// Logs at trace level.
    pub fn trace(&self, message: impl Into<String>) {
        self.log(LogLevel::Trace, message);
    }

    /// Logs at debug level.
    pub fn debug(&self, message: impl Into<String>) {
        self.log(LogLevel::Debug, message);
    }

    /// Logs at info level.
    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    /// Logs at warn level.
    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    /// Logs at error level.
    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    /// Runs every enricher on `event`, then writes it to every sink.
    ///
    /// A panicking enricher or a failing sink is reported through `tracing`
    /// and skipped; the remaining enrichers and sinks still run.
    pub fn dispatch(&self, mut event: LogEvent) {
        if !self.is_enabled(event.level()) {
            return;
        }

        for (index, enricher) in self.inner.enrichers.iter().enumerate() {
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| enricher.enrich(&mut event)));
            if outcome.is_err() {
                tracing::warn!(enricher = index, "enricher panicked, skipping it for this event");
            }
        }

        for sink in &self.inner.sinks {
            if let Err(error) = sink.emit(&event) {
                tracing::warn!(%error, "failed to write log event");
            }
        }
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("minimum_level", &self.inner.minimum_level)
            .field("enrichers", &self.inner.enrichers.len())
            .field("sinks", &self.inner.sinks.len())
            .finish()
    }
}

impl<S> Layer<S> for Logger
where
    S: tracing::Subscriber,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        if is_own_target(metadata.target()) {
            return;
        }
        let level = LogLevel::from(*metadata.level());
        if !self.is_enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let mut log_event = LogEvent::new(level, visitor.message.unwrap_or_default());
        for (name, value) in visitor.fields {
            log_event.add_property_if_absent(Arc::new(LogProperty::new(name, value)));
        }
        self.dispatch(log_event);
    }
}

fn is_own_target(target: &str) -> bool {
    target == CRATE_TARGET
        || target
            .strip_prefix(CRATE_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// Collects the message and fields of a `tracing` event as strings.
#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl tracing::field::Visit for FieldVisitor {
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        } else {
            self.fields.push((field.name().to_string(), value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        let formatted = format!("{:?}", value);
        if field.name() == "message" {
            self.message = Some(formatted);
        } else {
            self.fields.push((field.name().to_string(), formatted));
        }
    }
}
