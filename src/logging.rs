//! Structured logging for the health server and latency probe
//!
//! Components never print log lines directly. They hold a [`Logger`] handed
//! to them at construction, and the logger renders entries and forwards them
//! to a [`LogSink`]. The binaries use [`ConsoleSink`]; tests use
//! [`MemorySink`] and assert on captured [`LogEntry`] values.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    /// Trace level - most detailed
    Trace = 0,
    /// Debug level - detailed information for debugging
    Debug = 1,
    /// Info level - general application information
    Info = 2,
    /// Warning level - potentially harmful situations
    Warn = 3,
    /// Error level - error events but application can continue
    Error = 4,
}

impl LogLevel {
    /// Get log level name as string
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    fn colored_tag(&self) -> String {
        use colored::Colorize;
        let tag = format!("{:>5}", self.as_str());
        match self {
            LogLevel::Trace => tag.white().to_string(),
            LogLevel::Debug => tag.cyan().to_string(),
            LogLevel::Info => tag.green().to_string(),
            LogLevel::Warn => tag.yellow().to_string(),
            LogLevel::Error => tag.red().bold().to_string(),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_uppercase().as_str() {
            "TRACE" => Ok(LogLevel::Trace),
            "DEBUG" => Ok(LogLevel::Debug),
            "INFO" => Ok(LogLevel::Info),
            "WARN" | "WARNING" => Ok(LogLevel::Warn),
            "ERROR" => Ok(LogLevel::Error),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Timestamp when log entry was created
    pub timestamp: DateTime<Utc>,
    /// Log level
    pub level: LogLevel,
    /// Log message
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Additional structured fields
    pub fields: BTreeMap<String, serde_json::Value>,
}

impl LogEntry {
    /// Look up a structured field by key
    pub fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.get(key)
    }
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// JSON format for structured logging
    Json,
    /// Compact single-line format
    Compact,
}

/// Logger settings derived from a component's configuration
#[derive(Debug, Clone)]
pub struct LogSettings {
    pub min_level: LogLevel,
    pub format: LogFormat,
    pub use_color: bool,
    /// Append structured fields to console lines
    pub show_fields: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            format: LogFormat::Console,
            use_color: crate::defaults::DEFAULT_ENABLE_COLOR,
            show_fields: false,
        }
    }
}

impl LogSettings {
    /// Build settings from the common output flags
    pub fn from_flags(verbose: bool, debug: bool, enable_color: bool, json: bool) -> Self {
        Self {
            min_level: if debug || verbose { LogLevel::Debug } else { LogLevel::Info },
            format: if json { LogFormat::Json } else { LogFormat::Console },
            use_color: enable_color,
            show_fields: debug,
        }
    }
}

/// Destination for rendered log entries.
///
/// Implementations must be safe to call from many tasks at once; each call
/// carries one complete line.
pub trait LogSink: Send + Sync {
    fn write(&self, entry: &LogEntry, rendered: &str);
}

/// Writes warnings and errors to stderr and everything else to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl LogSink for ConsoleSink {
    fn write(&self, entry: &LogEntry, rendered: &str) {
        // Holding the std lock keeps concurrent lines from interleaving.
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr().lock(), "{}", rendered);
        } else {
            let _ = writeln!(io::stdout().lock(), "{}", rendered);
        }
    }
}

/// Captures entries in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    entries: Mutex<Vec<LogEntry>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every captured entry, in emission order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Captured messages only
    pub fn messages(&self) -> Vec<String> {
        self.entries().into_iter().map(|e| e.message).collect()
    }

    /// Entries at exactly the given level
    pub fn at_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.entries().into_iter().filter(|e| e.level == level).collect()
    }

    /// Whether any captured message contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(needle))
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

impl LogSink for MemorySink {
    fn write(&self, entry: &LogEntry, _rendered: &str) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(entry.clone());
    }
}

/// Shared logging context
#[derive(Debug, Default)]
struct LogContext {
    /// Correlation ID for the whole process run
    session_id: String,
    /// Fields attached to every entry
    context_fields: BTreeMap<String, serde_json::Value>,
}

/// Structured logger handed to each component
#[derive(Clone)]
pub struct Logger {
    name: String,
    settings: LogSettings,
    sink: Arc<dyn LogSink>,
    context: Arc<RwLock<LogContext>>,
}

impl std::fmt::Debug for Logger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Logger")
            .field("name", &self.name)
            .field("settings", &self.settings)
            .finish()
    }
}

impl Logger {
    /// Create a logger writing to the given sink
    pub fn new(name: impl Into<String>, settings: LogSettings, sink: Arc<dyn LogSink>) -> Self {
        let context = LogContext {
            session_id: Uuid::new_v4().to_string(),
            context_fields: BTreeMap::new(),
        };
        Self {
            name: name.into(),
            settings,
            sink,
            context: Arc::new(RwLock::new(context)),
        }
    }

    /// Create a console logger
    pub fn console(name: impl Into<String>, settings: LogSettings) -> Self {
        Self::new(name, settings, Arc::new(ConsoleSink))
    }

    /// Create a logger that captures everything down to trace level
    pub fn capturing(name: impl Into<String>) -> (Self, Arc<MemorySink>) {
        let sink = Arc::new(MemorySink::new());
        let settings = LogSettings {
            min_level: LogLevel::Trace,
            use_color: false,
            ..LogSettings::default()
        };
        (Self::new(name, settings, sink.clone()), sink)
    }

    /// Derive a logger for a sub-component sharing sink and context
    pub fn named(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..self.clone()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn session_id(&self) -> String {
        self.context.read().await.session_id.clone()
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: &str, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key.to_string(), json_value);
        }
    }

    /// Create a log entry builder
    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
    }

    pub fn trace(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Trace, message)
    }

    pub fn debug(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Debug, message)
    }

    pub fn info(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Info, message)
    }

    pub fn warn(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Warn, message)
    }

    pub fn error(&self, message: &str) -> LogEntryBuilder<'_> {
        self.log(LogLevel::Error, message)
    }

    /// Check if a log level would be output
    pub fn would_log(&self, level: LogLevel) -> bool {
        level >= self.settings.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if !self.would_log(entry.level) {
            return;
        }

        {
            let context = self.context.read().await;
            for (key, value) in &context.context_fields {
                entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
            }
            if self.settings.format == LogFormat::Json {
                entry.fields.insert(
                    "session_id".to_string(),
                    serde_json::Value::String(context.session_id.clone()),
                );
            }
        }

        let rendered = self.render(&entry);
        self.sink.write(&entry, &rendered);
    }

    /// Render an entry in the configured format
    pub fn render(&self, entry: &LogEntry) -> String {
        match self.settings.format {
            LogFormat::Console => self.format_console(entry),
            LogFormat::Json => self.format_json(entry),
            LogFormat::Compact => self.format_compact(entry),
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level = if self.settings.use_color {
            entry.level.colored_tag()
        } else {
            format!("{:>5}", entry.level.as_str())
        };

        let mut output = format!("{} {} [{}] {}", timestamp, level, entry.logger, entry.message);

        if self.settings.show_fields && !entry.fields.is_empty() {
            let fields: Vec<String> = entry.fields.iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!("{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}", entry.message),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!("{} {} {}: {}",
            timestamp,
            entry.level.as_str().chars().next().unwrap_or('?'),
            entry.logger,
            entry.message
        )
    }
}

/// Builder pattern for creating log entries
pub struct LogEntryBuilder<'a> {
    logger: &'a Logger,
    entry: LogEntry,
}

impl<'a> LogEntryBuilder<'a> {
    fn new(logger: &'a Logger, level: LogLevel, message: String) -> Self {
        Self {
            logger,
            entry: LogEntry {
                timestamp: Utc::now(),
                level,
                message,
                logger: logger.name.clone(),
                fields: BTreeMap::new(),
            },
        }
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        self.field("error_category", error.category())
            .field("error", error.to_string())
    }

    /// Finalize and write the log entry
    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parsing() {
        assert_eq!("info".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("WARNING".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Warn < LogLevel::Error);
    }

    #[test]
    fn test_settings_from_flags() {
        let quiet = LogSettings::from_flags(false, false, true, false);
        assert_eq!(quiet.min_level, LogLevel::Info);
        assert_eq!(quiet.format, LogFormat::Console);
        assert!(!quiet.show_fields);

        let debug = LogSettings::from_flags(false, true, false, true);
        assert_eq!(debug.min_level, LogLevel::Debug);
        assert_eq!(debug.format, LogFormat::Json);
        assert!(debug.show_fields);
    }

    #[tokio::test]
    async fn test_capturing_logger_records_fields() {
        let (logger, sink) = Logger::capturing("server");
        logger.info("New connection from 127.0.0.1:4000")
            .field("remote_address", "127.0.0.1")
            .field("remote_port", 4000u16)
            .log()
            .await;

        let entries = sink.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].logger, "server");
        assert_eq!(entries[0].level, LogLevel::Info);
        assert_eq!(entries[0].field("remote_port"), Some(&serde_json::json!(4000)));
    }

    #[tokio::test]
    async fn test_min_level_filters_entries() {
        let sink = Arc::new(MemorySink::new());
        let logger = Logger::new("probe", LogSettings::default(), sink.clone());

        logger.debug("hidden").log().await;
        logger.warn("shown").log().await;

        assert_eq!(sink.messages(), vec!["shown".to_string()]);
        assert!(!logger.would_log(LogLevel::Debug));
    }

    #[tokio::test]
    async fn test_context_fields_apply_to_all_entries() {
        let (logger, sink) = Logger::capturing("probe");
        logger.add_context_field("subdomain", "continent-powerful").await;
        logger.info("first").log().await;
        logger.named("setup").info("second").log().await;

        for entry in sink.entries() {
            assert_eq!(entry.field("subdomain"), Some(&serde_json::json!("continent-powerful")));
        }
        assert_eq!(sink.entries()[1].logger, "setup");
    }

    #[tokio::test]
    async fn test_entry_field_overrides_context() {
        let (logger, sink) = Logger::capturing("probe");
        logger.add_context_field("group", "none").await;
        logger.info("x").field("group", "Direct").log().await;
        assert_eq!(sink.entries()[0].field("group"), Some(&serde_json::json!("Direct")));
    }

    #[test]
    fn test_console_format() {
        let logger = Logger::new(
            "server",
            LogSettings { use_color: false, ..LogSettings::default() },
            Arc::new(MemorySink::new()),
        );
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Info,
            message: "Server running on port 8080".to_string(),
            logger: "server".to_string(),
            fields: BTreeMap::new(),
        };
        let line = logger.render(&entry);
        assert!(line.contains(" INFO [server] Server running on port 8080"));
    }

    #[tokio::test]
    async fn test_json_format_carries_session_id() {
        let sink = Arc::new(MemorySink::new());
        let settings = LogSettings { format: LogFormat::Json, ..LogSettings::default() };
        let logger = Logger::new("server", settings, sink.clone());
        logger.info("hello").log().await;

        let entry = &sink.entries()[0];
        let session = logger.session_id().await;
        assert_eq!(entry.field("session_id"), Some(&serde_json::json!(session)));

        let rendered = logger.render(entry);
        let parsed: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed["message"], "hello");
        assert_eq!(parsed["level"], "Info");
    }

    #[test]
    fn test_compact_format() {
        let logger = Logger::new(
            "probe",
            LogSettings { format: LogFormat::Compact, ..LogSettings::default() },
            Arc::new(MemorySink::new()),
        );
        let entry = LogEntry {
            timestamp: Utc::now(),
            level: LogLevel::Error,
            message: "boom".to_string(),
            logger: "probe".to_string(),
            fields: BTreeMap::new(),
        };
        assert!(logger.render(&entry).ends_with(" E probe: boom"));
    }

    #[test]
    fn test_logging_from_sync_context() {
        let (logger, sink) = Logger::capturing("probe");
        tokio_test::block_on(logger.warn("from sync").log());
        assert_eq!(sink.at_level(LogLevel::Warn).len(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writes_are_all_captured() {
        let (logger, sink) = Logger::capturing("server");
        let handles: Vec<_> = (0..20)
            .map(|i| {
                let logger = logger.clone();
                tokio::spawn(async move {
                    logger.info(&format!("line {}", i)).log().await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(sink.entries().len(), 20);
    }
}
