//! WAN Monitor
//!
//! Periodically measures WAN bandwidth (download, upload, ping, jitter)
//! against a pinned or automatically selected speed test server and renders
//! the latest result as a standalone report plus a console summary.

pub mod app;
pub mod backend;
pub mod cli;
pub mod config;
pub mod directory;
pub mod error;
pub mod lock;
pub mod logging;
pub mod models;
pub mod output;
pub mod runner;
pub mod schedule;
pub mod selector;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use backend::{SessionResults, SpeedtestBackend, SpeedtestCli};
pub use directory::ServerDirectory;
pub use error::{AppError, MeasurementStage, Result};
pub use lock::RunGuard;
pub use models::{MeasurementResult, PinnedServerConfig, ServerCandidate, ServerIdentity, Settings};
pub use output::ReportWriter;
pub use runner::{MeasurementRun, MeasurementRunner};
pub use schedule::Cadence;
pub use selector::{ResolvedServer, ServerSelector};
pub use store::{ConfigLoad, ConfigSource, ConfigStore};
pub use types::SelectionSource;

/// Application version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PKG_NAME: &str = env!("CARGO_PKG_NAME");
pub const PKG_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Default configuration values
pub mod defaults {
    use std::time::Duration;

    pub const DEFAULT_PINNED_CONFIG_FILE: &str = "config.json";
    pub const DEFAULT_REPORT_FILE: &str = "results.html";
    pub const DEFAULT_DIRECTORY_URL: &str = "https://www.speedtest.net/api/js/servers";
    pub const DEFAULT_DIRECTORY_LIMIT: u32 = 30;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
    pub const DEFAULT_BACKEND_COMMAND: &str = "speedtest-cli";
    pub const DEFAULT_LOCK_FILE: &str = "wanmon.lock";
    pub const DEFAULT_LOCK_STALE: Duration = Duration::from_secs(2 * 60 * 60);
    pub const DEFAULT_ENABLE_COLOR: bool = true;
}
