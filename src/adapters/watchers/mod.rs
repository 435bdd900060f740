// SPDX-License-Identifier: MIT OR Apache-2.0

//! Watcher implementations for service file change detection.
//!
//! This module contains implementations of the `ServiceFileWatcher` trait.

#[cfg(feature = "reload")]
pub mod file_watcher;

#[cfg(feature = "reload")]
pub use file_watcher::FileWatcher;
