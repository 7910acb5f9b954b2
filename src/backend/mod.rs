//! Measurement capability boundary
//!
//! The bandwidth protocol itself lives in an external client. This module
//! defines what the runner needs from it and ships an adapter over the
//! `speedtest-cli` executable.

pub mod cli;

pub use cli::SpeedtestCli;

use crate::error::Result;
use crate::models::ServerIdentity;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Latency figures read from a completed session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub ping_ms: f64,
    /// Not every client measures jitter
    pub jitter_ms: Option<f64>,
}

/// One measurement session against one server.
///
/// Calls are made strictly in order: `bind`, `download`, `upload`,
/// `results`. `best_server` may be called before `bind` when nothing is
/// pinned.
#[async_trait]
pub trait SpeedtestBackend: Send + Sync {
    /// Pick the lowest-latency server from the client's default pool
    async fn best_server(&mut self) -> Result<ServerIdentity>;

    /// Bind the session to an explicit server
    async fn bind(&mut self, server: &ServerIdentity) -> Result<()>;

    /// Measure download throughput in bits per second
    async fn download(&mut self) -> Result<f64>;

    /// Measure upload throughput in bits per second
    async fn upload(&mut self) -> Result<f64>;

    /// Ping and jitter of the completed session
    async fn results(&self) -> Result<SessionResults>;
}
