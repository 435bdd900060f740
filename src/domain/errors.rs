// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the service file crate.
//!
//! This module defines the error types that can occur when reading, parsing,
//! editing or writing a PostgreSQL service file. All errors use `thiserror`
//! for proper error handling and conversion.

use std::num::ParseIntError;
use thiserror::Error;

/// The main error type for service file operations.
///
/// This enum represents every failure a store operation can report. It is
/// marked as `#[non_exhaustive]` to allow for future additions without
/// breaking backwards compatibility.
///
/// # Examples
///
/// ```
/// use pgservice::domain::errors::ServiceError;
///
/// fn find_service() -> Result<(), ServiceError> {
///     Err(ServiceError::NotFound {
///         name: "prod".to_string(),
///     })
/// }
///
/// assert!(find_service().is_err());
/// ```
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ServiceError {
    /// The operation references a service name that is not in the file.
    #[error("Service not found: {name}")]
    NotFound {
        /// The name that was not found
        name: String,
    },

    /// A service with this name already exists.
    #[error("Service already exists: {name}")]
    DuplicateName {
        /// The conflicting name
        name: String,
    },

    /// The service name cannot be written as a section header.
    #[error("Invalid service name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A parameter key or value cannot be written as a `key=value` line.
    #[error("Invalid parameter '{key}': {reason}")]
    InvalidParam {
        /// The offending key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// Required connection parameters are absent.
    #[error("Missing required parameters for service '{name}': {}", .missing.join(", "))]
    MissingParams {
        /// The service being written
        name: String,
        /// The absent keys, sorted
        missing: Vec<String>,
    },

    /// The `port` parameter is not a valid TCP port number.
    #[error("Invalid port '{value}' for service '{name}': {source}")]
    InvalidPort {
        /// The service the port belongs to
        name: String,
        /// The raw port value
        value: String,
        /// The underlying conversion error
        source: ParseIntError,
    },

    /// The service file is malformed.
    #[error("Failed to parse service file at line {line}: {message}")]
    ParseError {
        /// 1-based line number
        line: usize,
        /// The error message
        message: String,
    },

    /// The service file location could not be determined.
    #[error("Unable to locate service file: {message}")]
    LocationError {
        /// The error message
        message: String,
    },

    /// A storage backend failed to read or write the file.
    #[error("Storage '{backend}' error: {message}")]
    StorageError {
        /// The name of the backend that failed
        backend: String,
        /// The error message
        message: String,
        /// The underlying error, if any
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An error occurred in a file watcher.
    #[error("Service file watcher error: {message}")]
    WatcherError {
        /// The error message
        message: String,
        /// The underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// An I/O error occurred while reading or writing the file.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ServiceError {
    /// Creates a `ParseError` for the given 1-based line.
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        ServiceError::ParseError {
            line,
            message: message.into(),
        }
    }

    /// Creates a `StorageError` wrapping an I/O failure.
    pub fn storage(backend: &str, message: impl Into<String>, err: std::io::Error) -> Self {
        ServiceError::StorageError {
            backend: backend.to_string(),
            message: message.into(),
            source: Some(Box::new(err)),
        }
    }

    /// Returns `true` for `NotFound`.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }

    /// Returns `true` for `DuplicateName`.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, ServiceError::DuplicateName { .. })
    }
}

/// A specialized Result type for service file operations.
pub type Result<T> = std::result::Result<T, ServiceError>;
