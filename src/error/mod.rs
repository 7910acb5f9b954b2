//! Error handling for the WAN monitor

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Stage of a measurement pass that can fail after a server was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementStage {
    /// Binding the measurement session to the resolved server
    Bind,
    /// Download throughput measurement
    Download,
    /// Upload throughput measurement
    Upload,
    /// Reading ping and jitter from the completed session
    Latency,
}

impl MeasurementStage {
    /// Every stage, in execution order
    pub const ALL: [MeasurementStage; 4] = [Self::Bind, Self::Download, Self::Upload, Self::Latency];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bind => "bind",
            Self::Download => "download",
            Self::Upload => "upload",
            Self::Latency => "latency",
        }
    }
}

impl fmt::Display for MeasurementStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom error types for the WAN monitor
#[derive(Error, Debug)]
pub enum AppError {
    /// The server directory answered with a non-success status or could not be reached
    #[error("Server directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// The server directory answered but the payload was not a server list
    #[error("Server directory response malformed: {0}")]
    DirectoryResponseMalformed(String),

    /// Automatic server selection found nothing usable
    #[error("No measurement server available: {0}")]
    NoServerAvailable(String),

    /// A measurement stage failed; the whole run is discarded
    #[error("Measurement failed at stage '{stage}': {cause}")]
    Measurement {
        stage: MeasurementStage,
        cause: String,
    },

    /// The pinned server configuration could not be written
    #[error("Failed to write server configuration: {0}")]
    ConfigWrite(String),

    /// The report artifact could not be written
    #[error("Failed to write report: {0}")]
    ReportWrite(String),

    /// Application settings or pinned configuration could not be read
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input
    #[error("Validation error: {0}")]
    Validation(String),

    /// I/O errors outside the config and report writers
    #[error("I/O error: {0}")]
    Io(String),

    /// Parsing errors (JSON, URLs, numbers)
    #[error("Parsing error: {0}")]
    Parse(String),

    /// The external measurement client misbehaved
    #[error("Measurement backend error: {0}")]
    Backend(String),

    /// Another measurement pass holds the run lock
    #[error("Another measurement run is in progress: {0}")]
    AlreadyRunning(String),

    /// Generic internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn directory_unavailable<S: Into<String>>(message: S) -> Self {
        Self::DirectoryUnavailable(message.into())
    }

    pub fn directory_malformed<S: Into<String>>(message: S) -> Self {
        Self::DirectoryResponseMalformed(message.into())
    }

    pub fn no_server<S: Into<String>>(message: S) -> Self {
        Self::NoServerAvailable(message.into())
    }

    /// Create a measurement error for the given stage
    pub fn measurement<S: Into<String>>(stage: MeasurementStage, cause: S) -> Self {
        Self::Measurement {
            stage,
            cause: cause.into(),
        }
    }

    pub fn config_write<S: Into<String>>(message: S) -> Self {
        Self::ConfigWrite(message.into())
    }

    pub fn report_write<S: Into<String>>(message: S) -> Self {
        Self::ReportWrite(message.into())
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io(message.into())
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse(message.into())
    }

    pub fn backend<S: Into<String>>(message: S) -> Self {
        Self::Backend(message.into())
    }

    pub fn already_running<S: Into<String>>(message: S) -> Self {
        Self::AlreadyRunning(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> &'static str {
        match self {
            Self::DirectoryUnavailable(_) | Self::DirectoryResponseMalformed(_) => "DIRECTORY",
            Self::NoServerAvailable(_) => "SELECT",
            Self::Measurement { .. } => "MEASURE",
            Self::ConfigWrite(_) | Self::Config(_) => "CONFIG",
            Self::ReportWrite(_) => "REPORT",
            Self::Validation(_) => "VALIDATION",
            Self::Io(_) => "IO",
            Self::Parse(_) => "PARSE",
            Self::Backend(_) => "BACKEND",
            Self::AlreadyRunning(_) => "LOCK",
            Self::Internal(_) => "INTERNAL",
        }
    }

    /// The failed stage, for measurement errors
    pub fn stage(&self) -> Option<MeasurementStage> {
        match self {
            Self::Measurement { stage, .. } => Some(*stage),
            _ => None,
        }
    }

    /// Get user-friendly error message with suggestions
    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::DirectoryUnavailable(msg) => format!(
                "Could not query the server directory: {}\n\nSuggestion: Check your internet connection and try the search again.",
                msg
            ),
            Self::DirectoryResponseMalformed(msg) => format!(
                "The server directory returned unexpected data: {}\n\nSuggestion: Check --directory-url points at a speed test server list.",
                msg
            ),
            Self::NoServerAvailable(msg) => format!(
                "No measurement server could be selected: {}\n\nSuggestion: Check connectivity or pin a server with 'wanmon pin <term> --pick N'.",
                msg
            ),
            Self::Measurement { stage, cause } => {
                let hint = match stage {
                    MeasurementStage::Bind => {
                        "The pinned server may be offline. Pin another one or run 'wanmon unpin' to use automatic selection."
                    }
                    MeasurementStage::Download | MeasurementStage::Upload => {
                        "The link may be congested or the server overloaded. The next scheduled run will try again."
                    }
                    MeasurementStage::Latency => "The measurement client did not report latency for this session.",
                };
                format!("Measurement failed during {}: {}\n\nSuggestion: {}", stage, cause, hint)
            }
            Self::ConfigWrite(msg) => format!(
                "Could not save the server configuration: {}\n\nSuggestion: Check file permissions and disk space.",
                msg
            ),
            Self::ReportWrite(msg) => format!(
                "Could not write the report: {}\n\nSuggestion: Check file permissions and disk space for --report.",
                msg
            ),
            Self::Config(msg) => format!(
                "Configuration problem: {}\n\nSuggestion: Check your .env file, WANMON_* variables or command line arguments.",
                msg
            ),
            Self::Validation(msg) => format!(
                "Invalid input: {}\n\nSuggestion: Check the values passed on the command line.",
                msg
            ),
            Self::Io(msg) => format!(
                "File operation failed: {}\n\nSuggestion: Check file permissions and disk space.",
                msg
            ),
            Self::Parse(msg) => format!(
                "Failed to parse data: {}\n\nSuggestion: Check the format of your input data or configuration files.",
                msg
            ),
            Self::Backend(msg) => format!(
                "The speed test client failed: {}\n\nSuggestion: Make sure the client named by --backend is installed and on PATH.",
                msg
            ),
            Self::AlreadyRunning(msg) => format!(
                "{}\n\nSuggestion: Wait for the running pass to finish or lengthen the schedule interval.",
                msg
            ),
            Self::Internal(msg) => format!(
                "Internal error: {}\n\nThis is likely a bug. Please report this issue with the error details.",
                msg
            ),
        }
    }

    /// Get exit code for this error type
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) | Self::Validation(_) | Self::Parse(_) => 1,
            Self::DirectoryUnavailable(_) | Self::DirectoryResponseMalformed(_) => 2,
            Self::NoServerAvailable(_) | Self::Measurement { .. } | Self::Backend(_) => 3,
            Self::ConfigWrite(_) | Self::ReportWrite(_) | Self::Io(_) => 5,
            Self::AlreadyRunning(_) => 6,
            Self::Internal(_) => 99,
        }
    }

    /// Format error for console display with color coding
    pub fn format_for_console(&self, use_color: bool) -> String {
        let category = self.category();
        let message = self.to_string();

        if use_color {
            use colored::Colorize;
            match self {
                Self::Config(_) | Self::Validation(_) | Self::Parse(_) => {
                    format!("[{}] {}", category.red().bold(), message.red())
                }
                Self::DirectoryUnavailable(_)
                | Self::DirectoryResponseMalformed(_)
                | Self::NoServerAvailable(_)
                | Self::Measurement { .. }
                | Self::Backend(_) => {
                    format!("[{}] {}", category.yellow().bold(), message.yellow())
                }
                Self::ConfigWrite(_) | Self::ReportWrite(_) | Self::Io(_) | Self::AlreadyRunning(_) => {
                    format!("[{}] {}", category.cyan().bold(), message.cyan())
                }
                Self::Internal(_) => {
                    format!("[{}] {}", category.bright_red().bold(), message.bright_red())
                }
            }
        } else {
            format!("[{}] {}", category, message)
        }
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::io(error.to_string())
    }
}

impl From<url::ParseError> for AppError {
    fn from(error: url::ParseError) -> Self {
        Self::parse(format!("URL parse error: {}", error))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::parse(format!("JSON parse error: {}", error))
    }
}

// reqwest is only used against the server directory
impl From<reqwest::Error> for AppError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Self::directory_malformed(error.to_string())
        } else {
            Self::directory_unavailable(error.to_string())
        }
    }
}

impl From<dotenv::Error> for AppError {
    fn from(error: dotenv::Error) -> Self {
        Self::config(format!("Environment file error: {}", error))
    }
}

impl From<std::num::ParseIntError> for AppError {
    fn from(error: std::num::ParseIntError) -> Self {
        Self::parse(format!("Integer parse error: {}", error))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::internal(error.to_string())
    }
}

/// Custom Result type for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Error reporter for user feedback on stderr
pub struct ErrorReporter {
    pub use_color: bool,
    pub verbose: bool,
}

impl ErrorReporter {
    pub fn new(use_color: bool, verbose: bool) -> Self {
        Self { use_color, verbose }
    }

    /// Report an error to the user
    pub fn report_error(&self, error: &AppError) {
        eprintln!("{}", error.format_for_console(self.use_color));

        if self.verbose {
            eprintln!();
            eprintln!("{}", error.user_friendly_message());
        }
    }
}
