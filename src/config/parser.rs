//! Settings parsing from CLI arguments and environment variables

use crate::{cli::Cli, config::env::EnvManager, error::Result, models::Settings};

/// Settings parser that layers defaults, .env, environment and CLI flags
pub struct ConfigParser {
    cli: Cli,
}

impl ConfigParser {
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Parse and build the complete settings
    pub fn parse(&self) -> Result<Settings> {
        let mut settings = Settings::default();

        EnvManager::load_env_file(self.cli.debug)?;

        if self.cli.debug {
            for warning in EnvManager::validate_current_env() {
                println!("{}", warning);
            }
        }

        settings.merge_from_env()?;
        self.apply_cli_overrides(&mut settings);
        settings.validate()?;

        Ok(settings)
    }

    /// Apply CLI argument overrides
    fn apply_cli_overrides(&self, settings: &mut Settings) {
        if let Some(ref path) = self.cli.config {
            settings.pinned_config_path = path.clone();
        }

        if let Some(ref path) = self.cli.report {
            settings.report_path = path.clone();
        }

        if let Some(ref url) = self.cli.directory_url {
            settings.directory_url = url.clone();
        }

        if let Some(timeout) = self.cli.timeout {
            settings.timeout_seconds = timeout;
        }

        if let Some(ref backend) = self.cli.backend {
            settings.backend_command = backend.clone();
        }

        if let Some(ref path) = self.cli.lock {
            settings.lock_path = path.clone();
        }

        if self.cli.color {
            settings.enable_color = true;
        } else if self.cli.no_color {
            settings.enable_color = false;
        }

        settings.verbose = self.cli.verbose;
        settings.debug = self.cli.debug;
    }
}

/// Convenience function to load complete settings from CLI arguments
pub fn load_settings(cli: Cli) -> Result<Settings> {
    ConfigParser::new(cli).parse()
}

/// Display settings summary for debug purposes
pub fn display_settings_summary(settings: &Settings) -> String {
    let summary = [
        format!("Pinned config: {}", settings.pinned_config_path.display()),
        format!("Report: {}", settings.report_path.display()),
        format!("Directory: {}", settings.directory_url),
        format!("Directory limit: {}", settings.directory_limit),
        format!("Timeout: {}s", settings.timeout_seconds),
        format!("Backend: {}", settings.backend_command),
        format!("Lock: {}", settings.lock_path.display()),
        format!("Color Output: {}", settings.enable_color),
        format!("Verbose: {}", settings.verbose),
        format!("Debug: {}", settings.debug),
    ];

    summary.join("\n")
}
