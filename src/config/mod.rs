//! Settings management module

pub mod env;
pub mod parser;

// Re-export main functionality
pub use env::EnvManager;
pub use parser::{display_settings_summary, load_settings, ConfigParser};

// Re-export from models for convenience
pub use crate::models::Settings;
