// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service catalog trait definition.
//!
//! This module defines the `ServiceCatalog` trait, the interface a front-end
//! (dialog, CLI, ...) uses to list and edit services. Its operations map
//! directly onto the actions such a front-end offers: show the list, show one
//! service, create new service, save changes, delete selected service.

use crate::domain::{Result, ServiceName, ServiceParams};

/// List/load/create/update/delete over named services.
///
/// # Examples
///
/// ```rust
/// use pgservice::domain::{Result, ServiceCatalog, ServiceError, ServiceName, ServiceParams};
///
/// struct Empty;
///
/// impl ServiceCatalog for Empty {
///     fn list(&self) -> Vec<ServiceName> {
///         Vec::new()
///     }
///
///     fn load(&self, name: &str) -> Result<ServiceParams> {
///         Err(ServiceError::NotFound { name: name.to_string() })
///     }
///
///     fn create(&mut self, _name: &str, _params: &ServiceParams) -> Result<()> {
///         Ok(())
///     }
///
///     fn update(&mut self, name: &str, _params: &ServiceParams) -> Result<()> {
///         Err(ServiceError::NotFound { name: name.to_string() })
///     }
///
///     fn delete(&mut self, name: &str) -> Result<()> {
///         Err(ServiceError::NotFound { name: name.to_string() })
///     }
/// }
///
/// assert!(!Empty.contains("prod"));
/// ```
pub trait ServiceCatalog {
    /// Service names in file order.
    fn list(&self) -> Vec<ServiceName>;

    /// Returns the parameters of `name`.
    ///
    /// # Errors
    ///
    /// `ServiceError::NotFound` if the service does not exist.
    fn load(&self, name: &str) -> Result<ServiceParams>;

    /// Appends a new service and persists the file.
    ///
    /// # Errors
    ///
    /// `ServiceError::DuplicateName` if the name exists; the file is left
    /// unchanged.
    fn create(&mut self, name: &str, params: &ServiceParams) -> Result<()>;

    /// Replaces the parameters of an existing service in place and persists
    /// the file.
    ///
    /// # Errors
    ///
    /// `ServiceError::NotFound` if the service does not exist.
    fn update(&mut self, name: &str, params: &ServiceParams) -> Result<()>;

    /// Removes a service and persists the file.
    ///
    /// # Errors
    ///
    /// `ServiceError::NotFound` if the service does not exist.
    fn delete(&mut self, name: &str) -> Result<()>;

    /// Returns `true` if `name` exists.
    fn contains(&self, name: &str) -> bool {
        self.load(name).is_ok()
    }
}
