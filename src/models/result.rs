//! Outcome of one measurement pass

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// SI megabit. Throughput is reported in decimal units, never 2^20.
pub const BITS_PER_MEGABIT: f64 = 1_000_000.0;

/// Timestamp format used in reports and console output
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Values read from a completed measurement session before rounding
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawMeasurements {
    /// Download throughput in bits per second
    pub download_bps: f64,
    /// Upload throughput in bits per second
    pub upload_bps: f64,
    /// Latency in milliseconds
    pub ping_ms: f64,
    /// Jitter in milliseconds, when the measurement client reports one
    pub jitter_ms: Option<f64>,
}

/// A complete measurement. Only ever built from a pass where every stage
/// succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementResult {
    /// Completion time, second precision
    pub timestamp: NaiveDateTime,
    /// Bits per second, two decimals
    pub download: f64,
    /// Bits per second, two decimals
    pub upload: f64,
    /// Milliseconds
    pub ping: u32,
    /// Milliseconds, 0 when the client provides none
    pub jitter: u32,
}

impl MeasurementResult {
    /// Assemble a result stamped with the current local time
    pub fn complete(raw: RawMeasurements) -> Self {
        Self::at(Local::now().naive_local(), raw)
    }

    /// Assemble a result with an explicit completion time
    pub fn at(timestamp: NaiveDateTime, raw: RawMeasurements) -> Self {
        Self {
            timestamp: timestamp.trunc_subsecs(0),
            download: round_hundredths(raw.download_bps),
            upload: round_hundredths(raw.upload_bps),
            ping: round_millis(raw.ping_ms),
            jitter: raw.jitter_ms.map(round_millis).unwrap_or(0),
        }
    }

    pub fn download_mbps(&self) -> f64 {
        self.download / BITS_PER_MEGABIT
    }

    pub fn upload_mbps(&self) -> f64 {
        self.upload / BITS_PER_MEGABIT
    }

    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Render a bits/second value as "N.NN Mbps"
pub fn format_mbps(bits_per_second: f64) -> String {
    format!("{:.2} Mbps", bits_per_second / BITS_PER_MEGABIT)
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round_millis(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round_ties_even() as u32
    } else {
        0
    }
}
