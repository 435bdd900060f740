// SPDX-License-Identifier: MIT OR Apache-2.0

//! Helper utilities for service file integration tests.

use pgservice::domain::ServiceParams;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// A service file used across tests.
#[allow(dead_code)]
pub const SAMPLE: &str = "\
# shared connection settings

[prod]
host=db1.example.com
port=5432
dbname=app
user=app

# reporting replica
[reporting]
host = replica.example.com
port = 5433
dbname=app
user=readonly
";

/// A temporary directory holding a `.pg_service.conf`.
#[allow(dead_code)]
pub struct ServiceDir {
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl ServiceDir {
    /// Creates the directory without a service file.
    pub fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(".pg_service.conf");
        Self { dir, path }
    }

    /// Creates the directory with `contents` written to the service file.
    pub fn with_contents(contents: &str) -> Self {
        let service_dir = Self::empty();
        fs::write(&service_dir.path, contents).unwrap();
        service_dir
    }

    /// Reads the service file back.
    pub fn read(&self) -> String {
        fs::read_to_string(&self.path).unwrap()
    }

    /// Path of the `.bak` copy.
    pub fn backup_path(&self) -> PathBuf {
        self.dir.path().join(".pg_service.conf.bak")
    }
}

/// Routes store logging to the test harness output.
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Builds parameters from `(key, value)` pairs.
#[allow(dead_code)]
pub fn params(pairs: &[(&str, &str)]) -> ServiceParams {
    pairs.iter().copied().collect()
}
