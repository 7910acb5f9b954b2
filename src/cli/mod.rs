//! Command-line interface

use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

/// WAN Monitor - scheduled bandwidth measurements against a pinned or
/// automatically selected speed test server
#[derive(Parser, Debug, Clone)]
#[command(name = "wanmon")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Pinned server configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Report file written after every successful run
    #[arg(long, global = true, value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Speed test client executable
    #[arg(long, global = true, value_name = "CMD")]
    pub backend: Option<String>,

    /// Server directory search endpoint
    #[arg(long, global = true, value_name = "URL")]
    pub directory_url: Option<String>,

    /// Directory lookup timeout in seconds
    #[arg(short, long, global = true)]
    pub timeout: Option<u64>,

    /// Single-instance lock file
    #[arg(long, global = true, value_name = "PATH")]
    pub lock: Option<PathBuf>,

    /// Force colored output
    #[arg(long, global = true)]
    pub color: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable verbose output
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Run one measurement-and-report pass (default)
    Run,
    /// Search the server directory (e.g., wanmon search London)
    Search {
        /// City, provider or any free-text term
        term: String,
    },
    /// Search the directory and pin one of the results
    Pin {
        /// City, provider or any free-text term
        term: String,

        /// 1-based position in the search results
        #[arg(long, short)]
        pick: usize,
    },
    /// Remove the pin and fall back to automatic server selection
    Unpin,
    /// Show the currently pinned server
    Show,
    /// Print a crontab entry that runs a pass on the given cadence
    Schedule(ScheduleArgs),
    /// Print supported environment variables, or write an example .env
    Env {
        /// Write an example .env file to this path
        #[arg(long, value_name = "PATH")]
        write: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
#[command(group(ArgGroup::new("cadence").required(true).args(["every_minutes", "every_hours", "daily"])))]
pub struct ScheduleArgs {
    /// Run every N minutes (1-1440)
    #[arg(long, value_name = "N")]
    pub every_minutes: Option<u32>,

    /// Run every N hours (1-24)
    #[arg(long, value_name = "N")]
    pub every_hours: Option<u32>,

    /// Run daily at HH:MM
    #[arg(long, value_name = "HH:MM")]
    pub daily: Option<String>,
}

impl Cli {
    /// Validate CLI arguments for conflicts
    pub fn validate(&self) -> Result<(), String> {
        if self.color && self.no_color {
            return Err("Cannot specify both --color and --no-color".to_string());
        }

        if let Some(Command::Search { term }) | Some(Command::Pin { term, .. }) = &self.command {
            if term.trim().is_empty() {
                return Err("Search term cannot be empty".to_string());
            }
        }

        if let Some(Command::Pin { pick, .. }) = &self.command {
            if *pick == 0 {
                return Err("--pick is 1-based and must be at least 1".to_string());
            }
        }

        Ok(())
    }

    /// The subcommand to execute; a bare invocation is a measurement pass
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Run)
    }

    /// Check if colors should be enabled
    pub fn use_colors(&self) -> bool {
        if self.color {
            true
        } else if self.no_color {
            false
        } else {
            supports_color()
        }
    }
}

/// Detect whether the terminal supports color output
pub fn supports_color() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }

    if std::env::var("TERM").map(|term| term == "dumb").unwrap_or(false) {
        return false;
    }

    std::io::IsTerminal::is_terminal(&std::io::stdout())
}
