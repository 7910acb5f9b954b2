//! Type definitions and aliases

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use crate::error::{AppError, MeasurementStage, Result};

/// How the server for a run was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Taken verbatim from the persisted pin
    Pinned,
    /// Picked by the measurement client's latency ranking for this run only
    AutoSelected,
}

impl SelectionSource {
    pub fn is_auto_selected(&self) -> bool {
        matches!(self, Self::AutoSelected)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pinned => "pinned",
            Self::AutoSelected => "automatically selected",
        }
    }
}
