// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service file location resolution.
//!
//! libpq looks for the per-user service file in `PGSERVICEFILE` first, then
//! in a platform default: `%APPDATA%\postgresql\.pg_service.conf` on Windows
//! and `~/.pg_service.conf` elsewhere.

use crate::domain::{Result, ServiceError};
use directories::BaseDirs;
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

/// Environment variable overriding the per-user service file path.
pub const SERVICE_FILE_ENV: &str = "PGSERVICEFILE";

/// Environment variable naming the directory of the system-wide service file.
pub const SYSCONFDIR_ENV: &str = "PGSYSCONFDIR";

/// File name of the per-user service file.
pub const SERVICE_FILE_NAME: &str = ".pg_service.conf";

/// File name of the system-wide service file.
pub const SYSTEM_FILE_NAME: &str = "pg_service.conf";

/// Operating system family, which decides the default location.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Platform {
    /// `%APPDATA%\postgresql\.pg_service.conf`
    Windows,
    /// `$HOME/.pg_service.conf`
    Unix,
}

impl Platform {
    /// The platform this binary was built for.
    pub fn current() -> Self {
        if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Unix
        }
    }
}

/// Resolves where the service file lives.
///
/// # Examples
///
/// ```rust
/// use pgservice::adapters::{Platform, ServiceFileLocator};
/// use std::collections::HashMap;
/// use std::path::PathBuf;
///
/// let locator = ServiceFileLocator::with_values(
///     Platform::Unix,
///     HashMap::new(),
///     Some(PathBuf::from("/home/me")),
/// );
/// assert_eq!(locator.locate().unwrap(), PathBuf::from("/home/me/.pg_service.conf"));
/// ```
#[derive(Debug, Clone)]
pub struct ServiceFileLocator {
    platform: Platform,
    /// Overrides the process environment when set
    values: Option<HashMap<String, String>>,
    home_dir: Option<PathBuf>,
}

impl ServiceFileLocator {
    /// Creates a locator for the current platform, process environment and
    /// home directory.
    pub fn new() -> Self {
        Self {
            platform: Platform::current(),
            values: None,
            home_dir: BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf()),
        }
    }

    /// Creates a locator with explicit inputs instead of the process
    /// environment.
    pub fn with_values(
        platform: Platform,
        values: HashMap<String, String>,
        home_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            platform,
            values: Some(values),
            home_dir,
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match &self.values {
            Some(values) => values.get(key).cloned(),
            None => env::var(key).ok(),
        };
        value.filter(|v| !v.is_empty())
    }

    /// Returns the per-user service file path.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::LocationError` if `PGSERVICEFILE` is unset and
    /// the platform default cannot be built (no `APPDATA` on Windows, no home
    /// directory elsewhere).
    pub fn locate(&self) -> Result<PathBuf> {
        if let Some(path) = self.var(SERVICE_FILE_ENV) {
            tracing::debug!("Using service file from {}: {}", SERVICE_FILE_ENV, path);
            return Ok(PathBuf::from(path));
        }

        let path = match self.platform {
            Platform::Windows => {
                let appdata = self.var("APPDATA").ok_or_else(|| ServiceError::LocationError {
                    message: "APPDATA environment variable is not set".to_string(),
                })?;
                PathBuf::from(appdata)
                    .join("postgresql")
                    .join(SERVICE_FILE_NAME)
            }
            Platform::Unix => {
                let home = self
                    .home_dir
                    .as_ref()
                    .ok_or_else(|| ServiceError::LocationError {
                        message: "home directory could not be determined".to_string(),
                    })?;
                home.join(SERVICE_FILE_NAME)
            }
        };

        tracing::debug!("Using default service file: {}", path.display());
        Ok(path)
    }

    /// Returns the system-wide service file, `$PGSYSCONFDIR/pg_service.conf`,
    /// when `PGSYSCONFDIR` is set.
    pub fn system_file(&self) -> Option<PathBuf> {
        self.var(SYSCONFDIR_ENV)
            .map(|dir| PathBuf::from(dir).join(SYSTEM_FILE_NAME))
    }
}

impl Default for ServiceFileLocator {
    fn default() -> Self {
        Self::new()
    }
}
