//! Persistence of the running worker's identity.
//!
//! The worker writes a single [`ProcessRecord`] when it starts and removes it
//! when it shuts down gracefully. The controller only reads it, so a file left
//! behind after a termination attempt means the worker did not exit cleanly.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessRecord {
    pub pid: u32,
    pub start_time: DateTime<Local>,
}

impl ProcessRecord {
    pub fn new(pid: u32, start_time: DateTime<Local>) -> Self {
        Self { pid, start_time }
    }

    /// Record for the calling process, stamped now.
    pub fn current() -> Self {
        Self::new(std::process::id(), Local::now())
    }
}

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("PID file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("PID file '{}' is malformed: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },
    #[error("PID file error during {operation}: {reason}")]
    Io { operation: String, reason: String },
}

impl RegistryError {
    pub fn suggestion(&self) -> String {
        match self {
            RegistryError::NotFound(_) => {
                "Start the background service with 'cron-sync'.".to_string()
            }
            RegistryError::Parse { path, .. } => format!(
                "The file was not written by a running worker. Inspect or delete '{}'.",
                path.display()
            ),
            RegistryError::Io { .. } => {
                "Check that the configuration directory exists and is writable.".to_string()
            }
        }
    }

    fn io(operation: &str, reason: impl std::fmt::Display) -> Self {
        RegistryError::Io {
            operation: operation.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// The well-known file holding the current [`ProcessRecord`].
#[derive(Debug, Clone)]
pub struct ProcessRegistry {
    path: PathBuf,
}

impl ProcessRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn ensure_dir(&self) -> Result<(), RegistryError> {
        let Some(parent) = self.path.parent() else {
            return Ok(());
        };

        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }
        builder.create(parent).map_err(|e| {
            RegistryError::io(
                "create_dir",
                format!("Failed to create directory '{}': {}", parent.display(), e),
            )
        })
    }

    /// Writes `record`, replacing any previous one.
    ///
    /// The record is written to a sibling temp file and renamed into place so
    /// a reader never observes a half-written file.
    pub fn save(&self, record: &ProcessRecord) -> Result<(), RegistryError> {
        self.ensure_dir()?;

        let temp_path = self.path.with_extension("json.tmp");
        let result = self
            .write_temp(&temp_path, record)
            .and_then(|()| self.replace_with(&temp_path));
        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }
        result
    }

    fn write_temp(&self, temp_path: &Path, record: &ProcessRecord) -> Result<(), RegistryError> {
        let file = File::create(temp_path).map_err(|e| {
            RegistryError::io(
                "create_temp",
                format!("Failed to create temp file '{}': {}", temp_path.display(), e),
            )
        })?;

        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, record).map_err(|e| {
            RegistryError::io(
                "write_json",
                format!("Failed to write record to '{}': {}", temp_path.display(), e),
            )
        })?;
        writer.flush().map_err(|e| RegistryError::io("flush", e))
    }

    fn replace_with(&self, temp_path: &Path) -> Result<(), RegistryError> {
        fs::rename(temp_path, &self.path).map_err(|e| {
            RegistryError::io(
                "rename",
                format!(
                    "Failed to rename '{}' to '{}': {}",
                    temp_path.display(),
                    self.path.display(),
                    e
                ),
            )
        })
    }

    pub fn load(&self) -> Result<ProcessRecord, RegistryError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RegistryError::NotFound(self.path.clone()));
            }
            Err(e) => return Err(RegistryError::io("read", e)),
        };

        serde_json::from_str(&contents).map_err(|e| RegistryError::Parse {
            path: self.path.clone(),
            reason: e.to_string(),
        })
    }

    pub fn remove(&self) -> Result<(), RegistryError> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(RegistryError::NotFound(self.path.clone()))
            }
            Err(e) => Err(RegistryError::io("remove", e)),
        }
    }
}
