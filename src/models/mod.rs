//! Data models and structures for the WAN monitor

pub mod config;
pub mod result;
pub mod server;

// Re-export main model types
pub use config::Settings;
pub use result::{format_mbps, MeasurementResult, RawMeasurements};
pub use server::{PinnedServerConfig, ServerCandidate, ServerIdentity};
