// SPDX-License-Identifier: MIT OR Apache-2.0

//! Local filesystem storage adapter.
//!
//! This module provides the adapter that reads and writes the service file on
//! disk. Writes go to a temporary file in the same directory which is then
//! renamed over the target, so readers never observe a partially written file.

use crate::adapters::ServiceFileLocator;
use crate::domain::{Result, ServiceError};
use crate::ports::ServiceFileStorage;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Maximum allowed size for a service file (10MB)
const MAX_SERVICE_FILE_SIZE: u64 = 10 * 1024 * 1024;

const BACKEND_NAME: &str = "local-file";

/// Storage adapter for a service file on the local filesystem.
///
/// # Backups
///
/// By default the current file is copied to `<file>.bak` before every write.
/// A failed backup aborts the write.
///
/// # Examples
///
/// ```rust,no_run
/// use pgservice::adapters::LocalFileStorage;
/// use pgservice::ports::ServiceFileStorage;
///
/// let storage = LocalFileStorage::new("/home/me/.pg_service.conf").backup(false);
/// let text = storage.read().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct LocalFileStorage {
    /// Path to the service file
    file_path: PathBuf,
    /// Whether to copy the old file to `.bak` before writing
    backup: bool,
}

impl LocalFileStorage {
    /// Creates a storage adapter for `path`. The file does not need to exist.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            file_path: path.as_ref().to_path_buf(),
            backup: true,
        }
    }

    /// Creates a storage adapter for the platform's default service file.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::LocationError` if no location can be resolved.
    pub fn from_default_location() -> Result<Self> {
        let path = ServiceFileLocator::new().locate()?;
        Ok(Self::new(path))
    }

    /// Sets whether a `.bak` copy is made before each write.
    pub fn backup(mut self, enabled: bool) -> Self {
        self.backup = enabled;
        self
    }

    /// Returns the path to the service file.
    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Returns the path of the backup copy, `<file>.bak`.
    pub fn backup_path(&self) -> PathBuf {
        let mut name = self
            .file_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".bak");
        self.file_path.with_file_name(name)
    }

    fn file_label(&self) -> String {
        self.file_path.display().to_string()
    }

    /// Resolves a symlinked service file to its target so the rename replaces
    /// the target rather than the link.
    fn write_target(&self) -> Result<PathBuf> {
        match fs::symlink_metadata(&self.file_path) {
            Ok(meta) if meta.file_type().is_symlink() => {
                fs::canonicalize(&self.file_path).map_err(|e| {
                    ServiceError::storage(
                        BACKEND_NAME,
                        format!("Failed to resolve symlink: {}", self.file_label()),
                        e,
                    )
                })
            }
            _ => Ok(self.file_path.clone()),
        }
    }
}

impl ServiceFileStorage for LocalFileStorage {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn location(&self) -> Option<&Path> {
        Some(&self.file_path)
    }

    fn read(&self) -> Result<Option<String>> {
        let metadata = match fs::metadata(&self.file_path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("Service file {} does not exist", self.file_label());
                return Ok(None);
            }
            Err(e) => {
                return Err(ServiceError::storage(
                    BACKEND_NAME,
                    format!("Failed to read file metadata: {}", self.file_label()),
                    e,
                ))
            }
        };

        if metadata.len() > MAX_SERVICE_FILE_SIZE {
            return Err(ServiceError::StorageError {
                backend: BACKEND_NAME.to_string(),
                message: format!(
                    "Service file too large: {} bytes (max {} bytes)",
                    metadata.len(),
                    MAX_SERVICE_FILE_SIZE
                ),
                source: None,
            });
        }

        let bytes = fs::read(&self.file_path).map_err(|e| {
            ServiceError::storage(
                BACKEND_NAME,
                format!("Failed to read service file: {}", self.file_label()),
                e,
            )
        })?;
        let content = String::from_utf8(bytes).map_err(|e| {
            let valid = &e.as_bytes()[..e.utf8_error().valid_up_to()];
            let line = valid.iter().filter(|&&b| b == b'\n').count() + 1;
            ServiceError::parse(line, "service file is not valid UTF-8")
        })?;

        tracing::debug!(
            "Read {} bytes from service file {}",
            content.len(),
            self.file_label()
        );
        Ok(Some(content))
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let target = self.write_target()?;
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir).map_err(|e| {
            ServiceError::storage(
                BACKEND_NAME,
                format!("Failed to create directory: {}", dir.display()),
                e,
            )
        })?;

        let existing = fs::metadata(&target).ok();

        if self.backup && existing.is_some() {
            let backup = self.backup_path();
            fs::copy(&target, &backup).map_err(|e| {
                ServiceError::storage(
                    BACKEND_NAME,
                    format!("Failed to write backup: {}", backup.display()),
                    e,
                )
            })?;
            tracing::debug!("Backed up service file to {}", backup.display());
        }

        let mut tmp = tempfile::Builder::new()
            .prefix(".pg_service.")
            .suffix(".tmp")
            .tempfile_in(&dir)
            .map_err(|e| {
                ServiceError::storage(
                    BACKEND_NAME,
                    format!("Failed to create temporary file in {}", dir.display()),
                    e,
                )
            })?;

        tmp.write_all(contents.as_bytes())
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| {
                ServiceError::storage(BACKEND_NAME, "Failed to write temporary file", e)
            })?;

        // temp files are created owner-only; keep whatever mode the file had
        if let Some(metadata) = existing {
            fs::set_permissions(tmp.path(), metadata.permissions()).map_err(|e| {
                ServiceError::storage(BACKEND_NAME, "Failed to copy file permissions", e)
            })?;
        }

        tmp.persist(&target).map_err(|e| {
            ServiceError::storage(
                BACKEND_NAME,
                format!("Failed to replace service file: {}", target.display()),
                e.error,
            )
        })?;

        tracing::debug!(
            "Wrote {} bytes to service file {}",
            contents.len(),
            target.display()
        );
        Ok(())
    }
}
