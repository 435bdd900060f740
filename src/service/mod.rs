// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service layer containing the store implementation.
//!
//! This module contains `ServiceConfigStore`, the implementation of the
//! `ServiceCatalog` trait that front-ends use to edit the service file.

pub mod store;

// Re-export commonly used types
pub use store::{ServiceConfigStore, ServiceConfigStoreBuilder, Upsert};
