// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read and edit PostgreSQL `pg_service.conf` files.
//!
//! A service file names reusable sets of connection parameters. Each service
//! is an INI-style `[name]` section followed by `key=value` lines:
//!
//! ```text
//! # production
//! [prod]
//! host=db1
//! port=5432
//! dbname=app
//! user=app
//! ```
//!
//! This crate lists, loads, creates, updates and deletes those sections while
//! leaving every other byte of the file (comments, blank lines, spacing,
//! other services) exactly as it was.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain Layer**: Core types (`ServiceName`, `ServiceParams`, `ServiceFile`, errors)
//!   and the `ServiceCatalog` trait
//! - **Ports**: Trait definitions for the outside world (`ServiceFileStorage`, `ServiceFileWatcher`)
//! - **Adapters**: Local file and in-memory storage, path resolution, file watching
//! - **Service**: `ServiceConfigStore`, which ties a storage backend to the document
//!
//! # Feature Flags
//!
//! - `yaml`: YAML output in the `pg-service` binary (default)
//! - `cli`: Build the `pg-service` command-line tool (default)
//! - `reload`: Enable `FileWatcher` for external changes
//! - `full`: Enable all features
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use pgservice::prelude::*;
//!
//! # fn main() -> Result<()> {
//! // Opens $PGSERVICEFILE, or the platform default location
//! let mut store = ServiceConfigStore::open_default()?;
//!
//! for name in store.list() {
//!     println!("{}", name);
//! }
//!
//! let params: ServiceParams = [
//!     ("host", "localhost"),
//!     ("port", "5432"),
//!     ("dbname", "app"),
//!     ("user", "app"),
//! ]
//! .into_iter()
//! .collect();
//! store.create("local", &params)?;
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

/// Commonly used types and traits.
///
/// This module re-exports the most commonly used types and traits for convenient access.
pub mod prelude {
    pub use crate::adapters::{InMemoryStorage, LocalFileStorage, ServiceFileLocator};
    pub use crate::domain::{
        Result, ServiceCatalog, ServiceEntry, ServiceError, ServiceFile, ServiceName,
        ServiceParams,
    };
    pub use crate::ports::{ServiceFileStorage, ServiceFileWatcher};
    pub use crate::service::{ServiceConfigStore, Upsert};

    #[cfg(feature = "reload")]
    pub use crate::adapters::FileWatcher;
}
