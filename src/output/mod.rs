//! Report rendering
//!
//! A finished run is rendered once into [`ReportLines`] and then emitted two
//! ways: a console summary and an HTML artifact that is overwritten on every
//! run. Both carry identical field values.

mod console;
mod html;

pub use console::render_console;
pub use html::{escape_html, render_html};

use crate::error::{AppError, Result};
use crate::models::format_mbps;
use crate::runner::MeasurementRun;
use crate::store::replace_file;
use crate::types::SelectionSource;
use std::path::{Path, PathBuf};

/// Display values shared by every output of one run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportLines {
    pub timestamp: String,
    pub server: String,
    pub source: SelectionSource,
    pub download: String,
    pub upload: String,
    pub ping: String,
    pub jitter: String,
}

impl ReportLines {
    pub fn from_run(run: &MeasurementRun) -> Self {
        Self {
            timestamp: run.result.formatted_timestamp(),
            server: run.server.display_name(),
            source: run.source,
            download: format_mbps(run.result.download),
            upload: format_mbps(run.result.upload),
            ping: format!("{} ms", run.result.ping),
            jitter: format!("{} ms", run.result.jitter),
        }
    }

    /// Label/value pairs in display order
    pub fn fields(&self) -> [(&'static str, &str); 4] {
        [
            ("Download", self.download.as_str()),
            ("Upload", self.upload.as_str()),
            ("Ping", self.ping.as_str()),
            ("Jitter", self.jitter.as_str()),
        ]
    }
}

/// Writes the console summary and the report artifact for a completed run.
///
/// Only a [`MeasurementRun`] can be written, so a failed pass never
/// produces an empty or partial report.
pub struct ReportWriter {
    path: PathBuf,
    use_color: bool,
}

impl ReportWriter {
    pub fn new<P: Into<PathBuf>>(path: P, use_color: bool) -> Self {
        Self {
            path: path.into(),
            use_color,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Print the summary, then replace the artifact.
    ///
    /// The summary is already on screen when the artifact write fails.
    pub async fn write(&self, run: &MeasurementRun) -> Result<()> {
        let lines = ReportLines::from_run(run);

        println!("{}", render_console(&lines, self.use_color));

        self.write_artifact(&render_html(&lines)).await
    }

    async fn write_artifact(&self, html: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::report_write(format!("Failed to create directory {}: {}", parent.display(), e))
                })?;
            }
        }

        replace_file(&self.path, html.as_bytes())
            .await
            .map_err(|e| AppError::report_write(format!("{}: {}", self.path.display(), e)))
    }
}
