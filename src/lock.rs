//! Single-instance guard for measurement passes

use crate::error::{AppError, Result};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Contents of the lock file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockInfo {
    pub pid: u32,
    pub started_at: DateTime<Local>,
}

/// Held for the duration of one pass; the lock file is removed on drop.
///
/// A lock older than the stale threshold is treated as left behind by a
/// crashed pass and taken over.
#[derive(Debug)]
pub struct RunGuard {
    path: PathBuf,
}

impl RunGuard {
    pub fn acquire(path: &Path, stale_after: Duration) -> Result<Self> {
        match Self::create(path) {
            Ok(guard) => Ok(guard),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let age = lock_age(path)?;
                if age < stale_after {
                    let holder = fs::read_to_string(path)
                        .ok()
                        .and_then(|content| serde_json::from_str::<LockInfo>(&content).ok())
                        .map(|info| {
                            format!(
                                " by pid {} since {}",
                                info.pid,
                                info.started_at.format("%Y-%m-%d %H:%M:%S")
                            )
                        })
                        .unwrap_or_default();
                    return Err(AppError::already_running(format!(
                        "{} is held{}",
                        path.display(),
                        holder
                    )));
                }

                fs::remove_file(path)
                    .map_err(|e| AppError::io(format!("Failed to remove stale lock {}: {}", path.display(), e)))?;
                Self::create(path)
                    .map_err(|e| AppError::io(format!("Failed to create lock {}: {}", path.display(), e)))
            }
            Err(e) => Err(AppError::io(format!("Failed to create lock {}: {}", path.display(), e))),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create(path: &Path) -> std::io::Result<Self> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        let guard = Self {
            path: path.to_path_buf(),
        };

        let info = LockInfo {
            pid: std::process::id(),
            started_at: Local::now(),
        };
        let content = serde_json::to_string(&info).map_err(std::io::Error::other)?;
        file.write_all(content.as_bytes())?;

        Ok(guard)
    }
}

impl Drop for RunGuard {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_age(path: &Path) -> Result<Duration> {
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|e| AppError::io(format!("Failed to inspect lock {}: {}", path.display(), e)))?;

    Ok(SystemTime::now().duration_since(modified).unwrap_or_default())
}
