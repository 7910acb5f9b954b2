//! Structured logging for the WAN monitor
//!
//! Provides leveled, structured log entries with:
//! - console, JSON and compact output formats
//! - a per-run correlation ID shared by every entry of a measurement pass
//! - a run logger that records stage timings and stage failures

use crate::error::{AppError, Result};
use crate::models::{ServerIdentity, Settings};
use crate::types::SelectionSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::{self, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Log level enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LogLevel {
    Trace = 0,
    Debug = 1,
    Info = 2,
    Warn = 3,
    Error = 4,
    Fatal = 5,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
            LogLevel::Fatal => "FATAL",
        }
    }

    /// ANSI color code for console output
    pub fn color_code(&self) -> &'static str {
        match self {
            LogLevel::Trace => "\x1b[37m",
            LogLevel::Debug => "\x1b[36m",
            LogLevel::Info => "\x1b[32m",
            LogLevel::Warn => "\x1b[33m",
            LogLevel::Error => "\x1b[31m",
            LogLevel::Fatal => "\x1b[35m",
        }
    }

    pub fn reset_code() -> &'static str {
        "\x1b[0m"
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
            "FATAL" => Ok(LogLevel::Fatal),
            _ => Err(AppError::parse(format!("Invalid log level: {}", s))),
        }
    }
}

/// Log entry structure for structured logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
    /// Logger name/component
    pub logger: String,
    /// Correlation ID tying together the entries of one run
    pub correlation_id: Option<String>,
    pub fields: HashMap<String, serde_json::Value>,
}

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LogFormat {
    /// Human-readable console format
    Console,
    /// One JSON object per line
    Json,
    /// Compact single-line format
    Compact,
}

#[derive(Debug, Default)]
struct LogContext {
    current_correlation_id: Option<String>,
    context_fields: HashMap<String, serde_json::Value>,
}

/// Logger implementation with multiple output formats
pub struct Logger {
    min_level: LogLevel,
    use_color: bool,
    format: LogFormat,
    name: String,
    context: Arc<RwLock<LogContext>>,
}

impl Logger {
    pub fn new(name: String) -> Self {
        Self {
            min_level: LogLevel::Info,
            use_color: true,
            format: LogFormat::Console,
            name,
            context: Arc::new(RwLock::new(LogContext::default())),
        }
    }

    /// Create a logger whose threshold and format follow the settings
    pub fn with_settings(name: String, settings: &Settings) -> Self {
        let min_level = if settings.debug {
            LogLevel::Debug
        } else if settings.verbose {
            LogLevel::Info
        } else {
            LogLevel::Warn
        };

        Self {
            min_level,
            use_color: settings.enable_color,
            format: if settings.debug { LogFormat::Json } else { LogFormat::Console },
            ..Self::new(name)
        }
    }

    /// Add context field for all subsequent log entries
    pub async fn add_context_field<T: Serialize>(&self, key: String, value: T) {
        if let Ok(json_value) = serde_json::to_value(value) {
            let mut context = self.context.write().await;
            context.context_fields.insert(key, json_value);
        }
    }

    /// Attach a correlation ID to every subsequent entry
    pub async fn set_correlation_id(&self, correlation_id: Option<String>) {
        let mut context = self.context.write().await;
        context.current_correlation_id = correlation_id;
    }

    /// Drop the correlation ID and every context field
    pub async fn clear_context(&self) {
        let mut context = self.context.write().await;
        *context = LogContext::default();
    }

    pub fn log(&self, level: LogLevel, message: &str) -> LogEntryBuilder<'_> {
        LogEntryBuilder::new(self, level, message.to_string())
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
        level >= self.min_level
    }

    async fn write_entry(&self, mut entry: LogEntry) {
        if entry.level < self.min_level {
            return;
        }

        let context = self.context.read().await;
        if entry.correlation_id.is_none() {
            entry.correlation_id = context.current_correlation_id.clone();
        }
        for (key, value) in &context.context_fields {
            entry.fields.entry(key.clone()).or_insert_with(|| value.clone());
        }
        drop(context);

        let output = match self.format {
            LogFormat::Console => self.format_console(&entry),
            LogFormat::Json => self.format_json(&entry),
            LogFormat::Compact => self.format_compact(&entry),
        };

        // Warnings and above go to stderr so stdout stays the console summary
        if entry.level >= LogLevel::Warn {
            let _ = writeln!(io::stderr(), "{}", output);
        } else {
            let _ = writeln!(io::stdout(), "{}", output);
        }
    }

    fn format_console(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S%.3f");
        let level_str = entry.level.as_str();

        let formatted_level = if self.use_color {
            format!("{}{:>5}{}", entry.level.color_code(), level_str, LogLevel::reset_code())
        } else {
            format!("{:>5}", level_str)
        };

        let mut output = format!("{} {} [{}] {}", timestamp, formatted_level, entry.logger, entry.message);

        if let Some(correlation_id) = &entry.correlation_id {
            let short: String = correlation_id.chars().take(8).collect();
            output.push_str(&format!(" [{}]", short));
        }

        if !entry.fields.is_empty() {
            let mut fields: Vec<String> = entry.fields.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            fields.sort();
            output.push_str(&format!(" {{{}}}", fields.join(", ")));
        }

        output
    }

    fn format_json(&self, entry: &LogEntry) -> String {
        match serde_json::to_string(entry) {
            Ok(json) => json,
            Err(_) => format!(
                "{{\"error\": \"Failed to serialize log entry\", \"message\": \"{}\"}}",
                entry.message
            ),
        }
    }

    fn format_compact(&self, entry: &LogEntry) -> String {
        let timestamp = entry.timestamp.format("%H:%M:%S");
        format!(
            "{} {} {}: {}",
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
                correlation_id: None,
                fields: HashMap::new(),
            },
        }
    }

    pub fn correlation_id(mut self, id: &str) -> Self {
        self.entry.correlation_id = Some(id.to_string());
        self
    }

    /// Add a structured field
    pub fn field<T: Serialize>(mut self, key: &str, value: T) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.entry.fields.insert(key.to_string(), json_value);
        }
        self
    }

    /// Add the identifying fields of a server
    pub fn server(self, server: &ServerIdentity) -> Self {
        self.field("server_id", &server.id)
            .field("sponsor", &server.sponsor)
            .field("server_name", &server.name)
            .field("country", &server.country)
    }

    /// Add error information
    pub fn error_info(self, error: &AppError) -> Self {
        let builder = self
            .field("error_category", error.category())
            .field("error_exit_code", error.exit_code());

        match error.stage() {
            Some(stage) => builder.field("stage", stage),
            None => builder,
        }
    }

    pub async fn log(self) {
        self.logger.write_entry(self.entry).await;
    }
}

/// Logger for one measurement pass: run boundaries, stage timings and failures
pub struct RunLogger {
    logger: Logger,
}

impl RunLogger {
    pub fn new(settings: &Settings) -> Self {
        Self {
            logger: Logger::with_settings("RUN".to_string(), settings),
        }
    }

    /// Start a pass and return its correlation ID
    pub async fn run_started(&self) -> String {
        let correlation_id = Uuid::new_v4().to_string();
        self.logger.set_correlation_id(Some(correlation_id.clone())).await;

        self.logger
            .info("Starting measurement pass")
            .field("operation_type", "start")
            .log()
            .await;

        correlation_id
    }

    pub async fn run_finished(&self, success: bool, duration: Duration) {
        let level = if success { LogLevel::Info } else { LogLevel::Warn };
        let message = if success {
            format!("Measurement pass completed in {:.1}s", duration.as_secs_f64())
        } else {
            format!("Measurement pass aborted after {:.1}s", duration.as_secs_f64())
        };

        self.logger
            .log(level, &message)
            .field("operation_type", "end")
            .field("success", success)
            .field("duration_ms", duration.as_millis() as u64)
            .log()
            .await;

        self.logger.clear_context().await;
    }

    /// Log the chosen server; later entries of the pass carry its id
    pub async fn server_resolved(&self, server: &ServerIdentity, source: SelectionSource) {
        self.logger.add_context_field("server_id".to_string(), &server.id).await;
        self.logger
            .info(&format!("Using server {} ({})", server, source.label()))
            .server(server)
            .field("auto_selected", source.is_auto_selected())
            .log()
            .await;
    }

    pub async fn stage_started(&self, stage: &str) {
        self.logger
            .debug(&format!("Stage '{}' started", stage))
            .field("stage", stage)
            .log()
            .await;
    }

    pub async fn stage_finished(&self, stage: &str, duration: Duration) {
        self.logger
            .info(&format!("Stage '{}' finished in {}ms", stage, duration.as_millis()))
            .field("stage", stage)
            .field("duration_ms", duration.as_millis() as u64)
            .log()
            .await;
    }

    /// Record a failure with its human-readable cause
    pub async fn stage_failed(&self, error: &AppError) {
        self.logger.error(&error.to_string()).error_info(error).log().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MeasurementStage;
    use std::str::FromStr;

    fn entry(level: LogLevel) -> LogEntry {
        LogEntry {
            timestamp: Utc::now(),
            level,
            message: "Test message".to_string(),
            logger: "TEST".to_string(),
            correlation_id: Some("0123456789abcdef".to_string()),
            fields: {
                let mut map = HashMap::new();
                map.insert("stage".to_string(), serde_json::Value::String("upload".to_string()));
                map
            },
        }
    }

    #[test]
    fn test_log_level_parsing() {
        assert_eq!(LogLevel::from_str("DEBUG").unwrap(), LogLevel::Debug);
        assert_eq!(LogLevel::from_str("info").unwrap(), LogLevel::Info);
        assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
        assert!(LogLevel::from_str("loud").is_err());
    }

    #[test]
    fn test_log_level_ordering() {
        assert!(LogLevel::Trace < LogLevel::Debug);
        assert!(LogLevel::Info < LogLevel::Warn);
        assert!(LogLevel::Error < LogLevel::Fatal);
    }

    #[test]
    fn test_threshold_follows_settings() {
        let quiet = Logger::with_settings("T".to_string(), &Settings::default());
        assert!(!quiet.would_log(LogLevel::Info));
        assert!(quiet.would_log(LogLevel::Warn));

        let verbose = Logger::with_settings(
            "T".to_string(),
            &Settings {
                verbose: true,
                ..Default::default()
            },
        );
        assert!(verbose.would_log(LogLevel::Info));
        assert!(!verbose.would_log(LogLevel::Debug));

        let debug = Logger::with_settings(
            "T".to_string(),
            &Settings {
                debug: true,
                ..Default::default()
            },
        );
        assert!(debug.would_log(LogLevel::Debug));
        assert_eq!(debug.format, LogFormat::Json);
    }

    #[test]
    fn test_console_format() {
        let logger = Logger {
            use_color: false,
            ..Logger::new("TEST".to_string())
        };

        let output = logger.format_console(&entry(LogLevel::Error));
        assert!(output.contains("ERROR [TEST] Test message"));
        assert!(output.contains("[01234567]"));
        assert!(output.contains("stage=\"upload\""));
    }

    #[test]
    fn test_json_format_round_trips() {
        let logger = Logger::new("TEST".to_string());
        let json = logger.format_json(&entry(LogLevel::Info));

        let parsed: LogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.level, LogLevel::Info);
        assert_eq!(parsed.message, "Test message");
    }

    #[test]
    fn test_compact_format() {
        let logger = Logger::new("TEST".to_string());
        let output = logger.format_compact(&entry(LogLevel::Warn));
        assert!(output.contains(" W TEST: Test message"));
    }

    #[tokio::test]
    async fn test_correlation_id_is_applied_and_cleared() {
        let logger = RunLogger::new(&Settings::default());
        let id = logger.run_started().await;
        assert_eq!(id.len(), 36);
        assert_eq!(
            logger.logger.context.read().await.current_correlation_id.as_deref(),
            Some(id.as_str())
        );

        logger.run_finished(true, Duration::from_millis(5)).await;
        assert!(logger.logger.context.read().await.current_correlation_id.is_none());
    }

    #[tokio::test]
    async fn test_resolved_server_tags_rest_of_pass() {
        let logger = RunLogger::new(&Settings::default());
        logger.run_started().await;
        logger
            .server_resolved(&ServerIdentity::new("42", "Acme", "Oslo", "Norway"), SelectionSource::Pinned)
            .await;

        assert_eq!(
            logger.logger.context.read().await.context_fields.get("server_id"),
            Some(&serde_json::Value::String("42".to_string()))
        );

        logger.run_finished(false, Duration::from_millis(5)).await;
        let context = logger.logger.context.read().await;
        assert!(context.context_fields.is_empty());
        assert!(context.current_correlation_id.is_none());
    }

    #[test]
    fn test_explicit_correlation_id_on_entry() {
        let logger = Logger::new("TEST".to_string());
        let builder = logger.info("Bound").correlation_id("abc").field("stage", "bind");

        assert_eq!(builder.entry.correlation_id.as_deref(), Some("abc"));
        assert_eq!(builder.entry.logger, "TEST");
        assert!(builder.entry.fields.contains_key("stage"));
    }

    #[tokio::test]
    async fn test_stage_failure_logging() {
        let logger = RunLogger::new(&Settings::default());
        let error = AppError::measurement(MeasurementStage::Download, "socket closed");

        logger.stage_failed(&error).await;
        logger
            .server_resolved(&ServerIdentity::new("1", "A", "B", "C"), SelectionSource::Pinned)
            .await;
    }
}
