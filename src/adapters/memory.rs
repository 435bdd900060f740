// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory storage adapter.
//!
//! Useful for embedding the store where the service file text lives
//! elsewhere, and for tests. Clones share the same buffer, so a test can keep
//! a handle to inspect what the store wrote or to simulate an edit made by
//! another process.

use crate::domain::{Result, ServiceError};
use crate::ports::ServiceFileStorage;
use std::path::Path;
use std::sync::{Arc, RwLock};

const BACKEND_NAME: &str = "memory";

/// Storage adapter holding the file text in memory.
///
/// # Examples
///
/// ```rust
/// use pgservice::adapters::InMemoryStorage;
/// use pgservice::ports::ServiceFileStorage;
///
/// let storage = InMemoryStorage::with_contents("[prod]\nhost=db1\n");
/// let handle = storage.clone();
///
/// let mut writer = storage;
/// writer.write("[dev]\n").unwrap();
/// assert_eq!(handle.contents().as_deref(), Some("[dev]\n"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    contents: Arc<RwLock<Option<String>>>,
}

impl InMemoryStorage {
    /// Creates storage with no file.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage holding `contents`.
    pub fn with_contents(contents: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(RwLock::new(Some(contents.into()))),
        }
    }

    /// Returns a copy of the current text, or `None` if nothing was written.
    pub fn contents(&self) -> Option<String> {
        self.contents.read().ok().and_then(|guard| guard.clone())
    }

    /// Replaces the text without going through a store.
    pub fn set_contents(&self, contents: impl Into<String>) {
        if let Ok(mut guard) = self.contents.write() {
            *guard = Some(contents.into());
        }
    }

    fn poisoned() -> ServiceError {
        ServiceError::StorageError {
            backend: BACKEND_NAME.to_string(),
            message: "Buffer lock poisoned".to_string(),
            source: None,
        }
    }
}

impl ServiceFileStorage for InMemoryStorage {
    fn name(&self) -> &str {
        BACKEND_NAME
    }

    fn location(&self) -> Option<&Path> {
        None
    }

    fn read(&self) -> Result<Option<String>> {
        let guard = self.contents.read().map_err(|_| Self::poisoned())?;
        Ok(guard.clone())
    }

    fn write(&mut self, contents: &str) -> Result<()> {
        let mut guard = self.contents.write().map_err(|_| Self::poisoned())?;
        *guard = Some(contents.to_string());
        Ok(())
    }
}
