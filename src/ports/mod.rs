// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ports layer containing trait definitions.
//!
//! This module contains the interfaces between the store and the outside
//! world: where the file text comes from and how external edits are noticed.
//! They are implemented by adapters in the adapters layer.

pub mod storage;
pub mod watcher;

// Re-export commonly used types
pub use storage::ServiceFileStorage;
pub use watcher::{ChangeCallback, ServiceFileWatcher};
