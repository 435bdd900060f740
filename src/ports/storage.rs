// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service file storage trait definition.
//!
//! This module defines the `ServiceFileStorage` trait, the port through which
//! the store reads and writes the raw text of a service file. The store owns
//! parsing and editing; a backend only moves text.

use crate::domain::Result;
use std::path::Path;

/// A trait for service file backends.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a store can be moved to, or
/// shared behind a lock with, another thread.
///
/// # Examples
///
/// ```rust
/// use pgservice::ports::ServiceFileStorage;
/// use pgservice::domain::Result;
/// use std::path::Path;
///
/// struct Fixed(Option<String>);
///
/// impl ServiceFileStorage for Fixed {
///     fn name(&self) -> &str {
///         "fixed"
///     }
///
///     fn location(&self) -> Option<&Path> {
///         None
///     }
///
///     fn read(&self) -> Result<Option<String>> {
///         Ok(self.0.clone())
///     }
///
///     fn write(&mut self, contents: &str) -> Result<()> {
///         self.0 = Some(contents.to_string());
///         Ok(())
///     }
/// }
///
/// let mut storage = Fixed(None);
/// storage.write("[prod]\n").unwrap();
/// assert_eq!(storage.read().unwrap().as_deref(), Some("[prod]\n"));
/// ```
pub trait ServiceFileStorage: Send + Sync {
    /// Returns a short identifier for logging and error messages.
    fn name(&self) -> &str;

    /// Returns the file path, if this backend is a file.
    fn location(&self) -> Option<&Path>;

    /// Reads the full file text.
    ///
    /// # Returns
    ///
    /// * `Ok(Some(text))` - The file exists
    /// * `Ok(None)` - The file does not exist yet
    /// * `Err(ServiceError)` - The file exists but could not be read
    fn read(&self) -> Result<Option<String>>;

    /// Replaces the full file text.
    ///
    /// Implementations must not leave a partially written file behind on
    /// failure.
    fn write(&mut self, contents: &str) -> Result<()>;

    /// Creates an empty file if none exists.
    ///
    /// The default implementation writes an empty string when `read` reports
    /// no file.
    fn ensure_exists(&mut self) -> Result<()> {
        if self.read()?.is_none() {
            self.write("")?;
        }
        Ok(())
    }
}
