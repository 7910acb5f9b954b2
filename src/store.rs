//! Persisted pinned-server configuration

use crate::error::{AppError, Result};
use crate::models::{PinnedServerConfig, ServerIdentity};
use async_trait::async_trait;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

/// Outcome of reading the pinned configuration
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigLoad {
    /// No configuration file exists
    NotFound,
    /// A file was read; it may still be unpinned (`null` or no `id`)
    Found(PinnedServerConfig),
}

impl ConfigLoad {
    /// Collapse into a config value; a missing file is the unpinned state
    pub fn into_config(self) -> PinnedServerConfig {
        match self {
            ConfigLoad::NotFound => PinnedServerConfig::unpinned(),
            ConfigLoad::Found(config) => config,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, ConfigLoad::Found(_))
    }
}

/// Source of the pinned configuration for a measurement pass
#[async_trait]
pub trait ConfigSource: Send + Sync {
    async fn load(&self) -> Result<ConfigLoad>;
}

/// JSON file holding the pinned server record.
///
/// The file is a flat object keyed like [`ServerIdentity`], or `null` for
/// automatic selection.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persist `identity` as the pin, replacing any previous content
    pub async fn save(&self, identity: &ServerIdentity) -> Result<()> {
        let content = serde_json::to_string_pretty(identity)
            .map_err(|e| AppError::config_write(format!("Failed to serialize server record: {}", e)))?;
        self.write(content).await
    }

    /// Persist the unpinned state
    pub async fn clear(&self) -> Result<()> {
        self.write("null".to_string()).await
    }

    async fn write(&self, content: String) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::config_write(format!("Failed to create directory {}: {}", parent.display(), e))
                })?;
            }
        }

        replace_file(&self.path, content.as_bytes())
            .await
            .map_err(|e| AppError::config_write(format!("{}: {}", self.path.display(), e)))
    }
}

/// Replace `path` with `content` through a sibling temp file and a rename,
/// so a failed write leaves the previous file untouched.
pub(crate) async fn replace_file(path: &Path, content: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "path has no file name"))?;
    let temp = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let written = match tokio::fs::write(&temp, content).await {
        Ok(()) => tokio::fs::rename(&temp, path).await,
        Err(e) => Err(e),
    };
    if written.is_err() {
        let _ = tokio::fs::remove_file(&temp).await;
    }
    written
}

#[async_trait]
impl ConfigSource for ConfigStore {
    async fn load(&self) -> Result<ConfigLoad> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(ConfigLoad::NotFound),
            Err(e) => {
                return Err(AppError::config(format!(
                    "Failed to read server configuration {}: {}",
                    self.path.display(),
                    e
                )))
            }
        };

        if content.trim().is_empty() {
            return Ok(ConfigLoad::Found(PinnedServerConfig::unpinned()));
        }

        let config: Option<PinnedServerConfig> = serde_json::from_str(&content).map_err(|e| {
            AppError::config(format!(
                "Server configuration {} is not valid JSON: {}",
                self.path.display(),
                e
            ))
        })?;

        Ok(ConfigLoad::Found(config.unwrap_or_default()))
    }
}
