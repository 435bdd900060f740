// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapters layer containing storage, location and watcher implementations.
//!
//! This module contains concrete implementations of the traits defined in the
//! ports layer, plus the resolver for the platform's service file path.

pub mod local_file;
pub mod locator;
pub mod memory;

pub mod watchers;

pub use local_file::LocalFileStorage;
pub use locator::{Platform, ServiceFileLocator};
pub use memory::InMemoryStorage;
#[cfg(feature = "reload")]
pub use watchers::FileWatcher;
