// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain layer containing core types and logic.
//!
//! This module contains the service file model: names, parameters, the parsed
//! document and the error type. It performs no I/O and is independent of any
//! storage backend.

pub mod catalog;
pub mod errors;
pub mod service_entry;
pub mod service_file;
pub mod service_name;
pub mod service_params;

// Re-export commonly used types
pub use catalog::ServiceCatalog;
pub use errors::{Result, ServiceError};
pub use service_entry::ServiceEntry;
pub use service_file::{LineEnding, ServiceFile};
pub use service_name::ServiceName;
pub use service_params::ServiceParams;
