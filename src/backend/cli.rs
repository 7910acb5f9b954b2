//! Adapter over the `speedtest-cli` executable

use super::{SessionResults, SpeedtestBackend};
use crate::error::{AppError, Result};
use crate::models::{ServerCandidate, ServerIdentity};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// Subset of `speedtest-cli --json` output the monitor reads
#[derive(Debug, Clone, Deserialize)]
struct CliReport {
    #[serde(default)]
    download: f64,
    #[serde(default)]
    upload: f64,
    #[serde(default)]
    ping: Option<f64>,
    #[serde(default)]
    jitter: Option<f64>,
    #[serde(default)]
    server: Option<ServerCandidate>,
}

/// Session backed by one `speedtest-cli` invocation per step.
///
/// Download and upload are separate invocations pinned to the same
/// `--server` id. Only the id is handed to the client; stored attributes
/// such as `host` or `url` are not, so a pinned server the client cannot
/// find by id fails at bind.
#[derive(Debug)]
pub struct SpeedtestCli {
    program: String,
    base_args: Vec<String>,
    bound: Option<ServerIdentity>,
    ping_ms: Option<f64>,
    jitter_ms: Option<f64>,
}

impl SpeedtestCli {
    /// `command` is an executable optionally followed by leading arguments,
    /// e.g. `speedtest-cli` or `python3 -m speedtest`
    pub fn new(command: &str) -> Result<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts
            .next()
            .ok_or_else(|| AppError::config("Backend command cannot be empty"))?;

        Ok(Self {
            program,
            base_args: parts.collect(),
            bound: None,
            ping_ms: None,
            jitter_ms: None,
        })
    }

    pub fn bound_server(&self) -> Option<&ServerIdentity> {
        self.bound.as_ref()
    }

    async fn invoke(&self, args: &[&str]) -> Result<CliReport> {
        let output = Command::new(&self.program)
            .args(&self.base_args)
            .arg("--json")
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AppError::backend(format!("Failed to start '{}': {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(AppError::backend(if detail.is_empty() {
                format!("'{}' exited with {}", self.program, output.status)
            } else {
                format!("'{}' exited with {}: {}", self.program, output.status, detail)
            }));
        }

        parse_report(&String::from_utf8_lossy(&output.stdout))
    }

    fn bound_id(&self) -> Result<String> {
        self.bound
            .as_ref()
            .map(|server| server.id.clone())
            .ok_or_else(|| AppError::backend("Session is not bound to a server"))
    }

    fn record_latency(&mut self, report: &CliReport) {
        if let Some(ping) = report.ping.filter(|ping| ping.is_finite() && *ping >= 0.0) {
            self.ping_ms = Some(ping);
        }
        if let Some(jitter) = report.jitter.filter(|jitter| jitter.is_finite() && *jitter >= 0.0) {
            self.jitter_ms = Some(jitter);
        }
    }
}

fn parse_report(stdout: &str) -> Result<CliReport> {
    serde_json::from_str(stdout.trim())
        .map_err(|e| AppError::backend(format!("Unexpected output from speed test client: {}", e)))
}

fn throughput(value: f64, direction: &str) -> Result<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AppError::backend(format!("Client reported no {} throughput", direction)))
    }
}

#[async_trait]
impl SpeedtestBackend for SpeedtestCli {
    async fn best_server(&mut self) -> Result<ServerIdentity> {
        let report = self.invoke(&["--no-download", "--no-upload"]).await?;

        report
            .server
            .map(ServerIdentity::from)
            .ok_or_else(|| AppError::backend("Client did not report a selected server"))
    }

    async fn bind(&mut self, server: &ServerIdentity) -> Result<()> {
        let report = self
            .invoke(&["--no-download", "--no-upload", "--server", server.id.as_str()])
            .await?;

        if let Some(reported) = &report.server {
            if reported.id != server.id {
                return Err(AppError::backend(format!(
                    "Client bound to server {} instead of {}",
                    reported.id, server.id
                )));
            }
        }

        self.bound = Some(server.clone());
        self.ping_ms = None;
        self.jitter_ms = None;
        self.record_latency(&report);
        Ok(())
    }

    async fn download(&mut self) -> Result<f64> {
        let id = self.bound_id()?;
        let report = self.invoke(&["--no-upload", "--server", id.as_str()]).await?;
        self.record_latency(&report);
        throughput(report.download, "download")
    }

    async fn upload(&mut self) -> Result<f64> {
        let id = self.bound_id()?;
        let report = self.invoke(&["--no-download", "--server", id.as_str()]).await?;
        self.record_latency(&report);
        throughput(report.upload, "upload")
    }

    async fn results(&self) -> Result<SessionResults> {
        let ping_ms = self
            .ping_ms
            .ok_or_else(|| AppError::backend("Client did not report a ping for this session"))?;

        Ok(SessionResults {
            ping_ms,
            jitter_ms: self.jitter_ms,
        })
    }
}
