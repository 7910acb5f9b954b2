//! Application settings data model and validation

use crate::types::{AppError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File holding the pinned server record
    #[serde(default = "default_pinned_config_path")]
    pub pinned_config_path: PathBuf,

    /// Report artifact, overwritten on every run
    #[serde(default = "default_report_path")]
    pub report_path: PathBuf,

    /// Server directory search endpoint
    #[serde(default = "default_directory_url")]
    pub directory_url: String,

    /// Maximum number of candidates requested from the directory
    #[serde(default = "default_directory_limit")]
    pub directory_limit: u32,

    /// Timeout for directory lookups
    #[serde(default = "default_timeout_secs")]
    pub timeout_seconds: u64,

    /// External speed test client executable
    #[serde(default = "default_backend_command")]
    pub backend_command: String,

    /// Single-instance lock file
    #[serde(default = "default_lock_path")]
    pub lock_path: PathBuf,

    /// Age after which an existing lock is considered abandoned
    #[serde(default = "default_lock_stale_secs")]
    pub lock_stale_seconds: u64,

    /// Enable colored terminal output
    #[serde(default = "default_enable_color")]
    pub enable_color: bool,

    /// Enable verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Enable debug output
    #[serde(default)]
    pub debug: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pinned_config_path: default_pinned_config_path(),
            report_path: default_report_path(),
            directory_url: default_directory_url(),
            directory_limit: default_directory_limit(),
            timeout_seconds: default_timeout_secs(),
            backend_command: default_backend_command(),
            lock_path: default_lock_path(),
            lock_stale_seconds: default_lock_stale_secs(),
            enable_color: default_enable_color(),
            verbose: false,
            debug: false,
        }
    }
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Directory lookup timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn lock_stale_after(&self) -> Duration {
        Duration::from_secs(self.lock_stale_seconds)
    }

    /// Validate the settings and return the first problem found
    pub fn validate(&self) -> Result<()> {
        if self.pinned_config_path.as_os_str().is_empty() {
            return Err(AppError::config("Pinned server config path cannot be empty"));
        }

        if self.report_path.as_os_str().is_empty() {
            return Err(AppError::config("Report path cannot be empty"));
        }

        if self.lock_path.as_os_str().is_empty() {
            return Err(AppError::config("Lock path cannot be empty"));
        }

        match url::Url::parse(&self.directory_url) {
            Ok(parsed) => {
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!(
                        "Directory URL must use http or https: {}",
                        self.directory_url
                    )));
                }
            }
            Err(e) => {
                return Err(AppError::config(format!(
                    "Invalid directory URL '{}': {}",
                    self.directory_url, e
                )));
            }
        }

        if self.directory_limit == 0 || self.directory_limit > 100 {
            return Err(AppError::config("Directory limit must be between 1 and 100"));
        }

        if self.timeout_seconds == 0 {
            return Err(AppError::config("Timeout must be greater than 0"));
        }

        if self.timeout_seconds > 300 {
            return Err(AppError::config("Timeout cannot exceed 300 seconds"));
        }

        if self.backend_command.trim().is_empty() {
            return Err(AppError::config("Backend command cannot be empty"));
        }

        Ok(())
    }

    /// Merge WANMON_* environment variables into these settings
    pub fn merge_from_env(&mut self) -> Result<()> {
        if let Ok(path) = std::env::var("WANMON_CONFIG") {
            self.pinned_config_path = PathBuf::from(path);
        }

        if let Ok(path) = std::env::var("WANMON_REPORT") {
            self.report_path = PathBuf::from(path);
        }

        if let Ok(url) = std::env::var("WANMON_DIRECTORY_URL") {
            self.directory_url = url.trim().to_string();
        }

        if let Ok(timeout) = std::env::var("WANMON_TIMEOUT_SECONDS") {
            self.timeout_seconds = timeout.parse().map_err(|e| {
                AppError::config(format!("Invalid WANMON_TIMEOUT_SECONDS value '{}': {}", timeout, e))
            })?;
        }

        if let Ok(backend) = std::env::var("WANMON_BACKEND") {
            self.backend_command = backend.trim().to_string();
        }

        if let Ok(path) = std::env::var("WANMON_LOCK") {
            self.lock_path = PathBuf::from(path);
        }

        if let Ok(stale) = std::env::var("WANMON_LOCK_STALE_SECONDS") {
            self.lock_stale_seconds = stale.parse().map_err(|e| {
                AppError::config(format!("Invalid WANMON_LOCK_STALE_SECONDS value '{}': {}", stale, e))
            })?;
        }

        if let Ok(enable_color) = std::env::var("WANMON_ENABLE_COLOR") {
            self.enable_color = enable_color.parse().map_err(|e| {
                AppError::config(format!("Invalid WANMON_ENABLE_COLOR value '{}': {}", enable_color, e))
            })?;
        }

        Ok(())
    }
}

// Default value functions for serde
fn default_pinned_config_path() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_PINNED_CONFIG_FILE)
}

fn default_report_path() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_REPORT_FILE)
}

fn default_directory_url() -> String {
    crate::defaults::DEFAULT_DIRECTORY_URL.to_string()
}

fn default_directory_limit() -> u32 {
    crate::defaults::DEFAULT_DIRECTORY_LIMIT
}

fn default_timeout_secs() -> u64 {
    crate::defaults::DEFAULT_TIMEOUT.as_secs()
}

fn default_backend_command() -> String {
    crate::defaults::DEFAULT_BACKEND_COMMAND.to_string()
}

fn default_lock_path() -> PathBuf {
    PathBuf::from(crate::defaults::DEFAULT_LOCK_FILE)
}

fn default_lock_stale_secs() -> u64 {
    crate::defaults::DEFAULT_LOCK_STALE.as_secs()
}

fn default_enable_color() -> bool {
    crate::defaults::DEFAULT_ENABLE_COLOR
}
