// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service name newtype for validated section names.
//!
//! This module provides the `ServiceName` type, a newtype wrapper around `String`
//! that guarantees the name can be written as a `[name]` section header.

use crate::domain::{Result, ServiceError};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A validated service name.
///
/// A service name is trimmed of surrounding whitespace and must be non-empty.
/// It must not contain `[`, `]` or line breaks, since any of those would make
/// the section header unreadable by libpq.
///
/// # Examples
///
/// ```
/// use pgservice::domain::ServiceName;
///
/// let name = ServiceName::new("  prod ").unwrap();
/// assert_eq!(name.as_str(), "prod");
///
/// assert!(ServiceName::new("bad]name").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ServiceName(String);

impl ServiceName {
    /// Validates and creates a new `ServiceName`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidName` if the trimmed name is empty or
    /// contains a forbidden character.
    pub fn new(name: impl AsRef<str>) -> Result<Self> {
        let raw = name.as_ref();
        let trimmed = raw.trim();

        if trimmed.is_empty() {
            return Err(invalid(raw, "name is empty"));
        }
        if let Some(c) = trimmed
            .chars()
            .find(|c| matches!(c, '[' | ']' | '\r' | '\n'))
        {
            return Err(invalid(raw, format!("name contains {:?}", c)));
        }

        Ok(ServiceName(trimmed.to_string()))
    }

    /// Returns the name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Converts the `ServiceName` into its inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }

    /// Returns the `[name]` header line for this service.
    pub fn header(&self) -> String {
        format!("[{}]", self.0)
    }
}

fn invalid(name: &str, reason: impl Into<String>) -> ServiceError {
    ServiceError::InvalidName {
        name: name.to_string(),
        reason: reason.into(),
    }
}

impl FromStr for ServiceName {
    type Err = ServiceError;

    fn from_str(s: &str) -> Result<Self> {
        ServiceName::new(s)
    }
}

impl TryFrom<&str> for ServiceName {
    type Error = ServiceError;

    fn try_from(s: &str) -> Result<Self> {
        ServiceName::new(s)
    }
}

impl TryFrom<String> for ServiceName {
    type Error = ServiceError;

    fn try_from(s: String) -> Result<Self> {
        ServiceName::new(s)
    }
}

impl From<ServiceName> for String {
    fn from(name: ServiceName) -> Self {
        name.0
    }
}

impl AsRef<str> for ServiceName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ServiceName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for ServiceName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for ServiceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_service_name_new() {
        let name = ServiceName::new("prod").unwrap();
        assert_eq!(name.as_str(), "prod");
    }

    #[test]
    fn test_service_name_is_trimmed() {
        let name = ServiceName::new("\t my db  ").unwrap();
        assert_eq!(name.as_str(), "my db");
    }

    #[test]
    fn test_service_name_empty() {
        assert!(matches!(
            ServiceName::new(""),
            Err(ServiceError::InvalidName { .. })
        ));
        assert!(ServiceName::new("   ").is_err());
    }

    #[test]
    fn test_service_name_forbidden_chars() {
        for bad in ["a[b", "a]b", "a\nb", "a\rb"] {
            assert!(ServiceName::new(bad).is_err(), "{:?} should be rejected", bad);
        }
    }

    #[test]
    fn test_service_name_header() {
        let name = ServiceName::new("prod").unwrap();
        assert_eq!(name.header(), "[prod]");
    }

    #[test]
    fn test_service_name_from_str() {
        let name: ServiceName = "staging".parse().unwrap();
        assert_eq!(name, "staging");
    }

    #[test]
    fn test_service_name_display() {
        let name = ServiceName::new("prod").unwrap();
        assert_eq!(format!("{}", name), "prod");
    }

    #[test]
    fn test_service_name_into_string() {
        let name = ServiceName::try_from("prod".to_string()).unwrap();
        let s: String = name.into();
        assert_eq!(s, "prod");
    }

    #[test]
    fn test_service_name_hash() {
        let mut set = HashSet::new();
        set.insert(ServiceName::new("prod").unwrap());
        assert!(set.contains(&ServiceName::new(" prod ").unwrap()));
    }
}
