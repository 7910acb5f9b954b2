//! Environment variable handling and .env file management

use crate::error::{AppError, Result};
use std::path::Path;

/// Environment variable configuration manager
pub struct EnvManager;

impl EnvManager {
    /// Load .env file if it exists
    pub fn load_env_file(debug: bool) -> Result<()> {
        if Path::new(".env").exists() {
            dotenv::from_filename(".env")
                .map_err(|e| AppError::config(format!("Failed to load .env file: {}", e)))?;

            if debug {
                println!("Loaded configuration from .env file");
            }
        } else if debug {
            println!("No .env file found, using defaults and CLI arguments");
        }

        Ok(())
    }

    /// Create example .env file content
    pub fn create_example_env_content() -> String {
        let mut content = String::from(
            "# WAN Monitor Configuration\n\
             #\n\
             # Values here act as defaults and can be overridden by\n\
             # WANMON_* variables in the environment or command-line flags.\n\n",
        );

        for (var, description, example) in Self::get_supported_env_vars() {
            content.push_str(&format!("# {}\n# {}={}\n\n", description, var, example));
        }

        content
    }

    /// Save example .env file to disk
    pub fn save_example_env_file(path: &Path) -> Result<()> {
        let content = Self::create_example_env_content();
        std::fs::write(path, content)
            .map_err(|e| AppError::config(format!("Failed to write example .env file: {}", e)))?;

        Ok(())
    }

    /// Validate environment variable format before parsing
    pub fn validate_env_var(key: &str, value: &str) -> Result<()> {
        match key {
            "WANMON_CONFIG" | "WANMON_REPORT" | "WANMON_LOCK" => {
                if value.trim().is_empty() {
                    return Err(AppError::config(format!("{} cannot be empty", key)));
                }
            }
            "WANMON_DIRECTORY_URL" => {
                let parsed = url::Url::parse(value.trim())
                    .map_err(|e| AppError::config(format!("Invalid WANMON_DIRECTORY_URL '{}': {}", value, e)))?;
                if parsed.scheme() != "http" && parsed.scheme() != "https" {
                    return Err(AppError::config(format!("Directory URL must use http or https: {}", value)));
                }
            }
            "WANMON_TIMEOUT_SECONDS" => {
                let timeout: u64 = value.parse().map_err(|e| {
                    AppError::config(format!("Invalid WANMON_TIMEOUT_SECONDS value '{}': {}", value, e))
                })?;
                if timeout == 0 || timeout > 300 {
                    return Err(AppError::config(format!(
                        "WANMON_TIMEOUT_SECONDS must be between 1 and 300, got: {}",
                        timeout
                    )));
                }
            }
            "WANMON_LOCK_STALE_SECONDS" => {
                value.parse::<u64>().map_err(|e| {
                    AppError::config(format!("Invalid WANMON_LOCK_STALE_SECONDS value '{}': {}", value, e))
                })?;
            }
            "WANMON_BACKEND" => {
                if value.trim().is_empty() {
                    return Err(AppError::config("WANMON_BACKEND cannot be empty"));
                }
            }
            "WANMON_ENABLE_COLOR" => {
                value.parse::<bool>().map_err(|e| {
                    AppError::config(format!("Invalid WANMON_ENABLE_COLOR value '{}': {}", value, e))
                })?;
            }
            _ => {}
        }

        Ok(())
    }

    /// Supported environment variables as (name, description, example)
    pub fn get_supported_env_vars() -> Vec<(&'static str, &'static str, &'static str)> {
        vec![
            ("WANMON_CONFIG", "Pinned server configuration file", "config.json"),
            ("WANMON_REPORT", "Report file, overwritten on every run", "results.html"),
            (
                "WANMON_DIRECTORY_URL",
                "Server directory search endpoint",
                "https://www.speedtest.net/api/js/servers",
            ),
            ("WANMON_TIMEOUT_SECONDS", "Directory lookup timeout in seconds (1-300)", "10"),
            ("WANMON_BACKEND", "Speed test client executable", "speedtest-cli"),
            ("WANMON_LOCK", "Single-instance lock file", "wanmon.lock"),
            ("WANMON_LOCK_STALE_SECONDS", "Age after which a lock is treated as abandoned", "7200"),
            ("WANMON_ENABLE_COLOR", "Enable colored output", "true"),
        ]
    }

    /// Display environment variable help
    pub fn display_env_help() -> String {
        let mut help = String::new();
        help.push_str("Supported Environment Variables:\n\n");

        for (var, description, example) in Self::get_supported_env_vars() {
            help.push_str(&format!("  {:<26} {}\n", var, description));
            help.push_str(&format!("  {:<26} Example: {}\n\n", "", example));
        }

        help.push_str("Configuration Priority (highest to lowest):\n");
        help.push_str("  1. Command-line arguments\n");
        help.push_str("  2. Environment variables\n");
        help.push_str("  3. .env file values\n");
        help.push_str("  4. Default values\n");

        help
    }

    /// Validate all currently set environment variables
    pub fn validate_current_env() -> Vec<String> {
        Self::get_supported_env_vars()
            .into_iter()
            .filter_map(|(var_name, _, _)| {
                let value = std::env::var(var_name).ok()?;
                Self::validate_env_var(var_name, &value)
                    .err()
                    .map(|e| format!("Warning: {}", e))
            })
            .collect()
    }
}
