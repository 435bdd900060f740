// SPDX-License-Identifier: MIT OR Apache-2.0

//! Connection parameters of a single service.
//!
//! This module provides `ServiceParams`, an insertion-ordered map from
//! parameter key (`host`, `port`, `dbname`, ...) to string value.

use crate::domain::{Result, ServiceError};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Placeholder shown instead of a password by [`ServiceParams::redacted`].
pub const REDACTED: &str = "*****";

/// An ordered mapping of parameter keys to values.
///
/// Keys are unique. Inserting an existing key replaces its value and keeps
/// its position, so a mapping read from a file writes back in the same order.
///
/// # Examples
///
/// ```
/// use pgservice::domain::ServiceParams;
///
/// let mut params = ServiceParams::new();
/// params.insert("host", "db1");
/// params.insert("port", "5432");
/// params.insert("host", "db2");
///
/// assert_eq!(params.get("host"), Some("db2"));
/// assert_eq!(params.keys().collect::<Vec<_>>(), vec!["host", "port"]);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceParams {
    entries: Vec<(String, String)>,
}

impl ServiceParams {
    /// The parameters a usable connection needs: `host`, `port`, `dbname`, `user`.
    pub const CONNECTION_KEYS: &'static [&'static str] = &["host", "port", "dbname", "user"];

    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a parameter, returning the previous value if the key existed.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Returns the value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let index = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates over `(key, value)` pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates over keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Number of parameters.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if there are no parameters.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses the `port` parameter.
    ///
    /// Values are stored as strings; this is the typed view of the one
    /// numeric parameter a front-end usually needs.
    ///
    /// # Arguments
    ///
    /// * `service` - The owning service name, used in the error
    ///
    /// # Returns
    ///
    /// * `Ok(None)` - No `port` parameter
    /// * `Ok(Some(port))` - The parsed port
    /// * `Err(ServiceError::InvalidPort)` - The value is not a valid port
    ///
    /// # Examples
    ///
    /// ```
    /// use pgservice::domain::ServiceParams;
    ///
    /// let params: ServiceParams = [("port", "5432")].into_iter().collect();
    /// assert_eq!(params.port("prod").unwrap(), Some(5432));
    /// ```
    pub fn port(&self, service: &str) -> Result<Option<u16>> {
        self.get("port")
            .map(|value| {
                value.parse::<u16>().map_err(|source| ServiceError::InvalidPort {
                    name: service.to_string(),
                    value: value.to_string(),
                    source,
                })
            })
            .transpose()
    }

    /// Returns a copy with the `password` value replaced by [`REDACTED`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pgservice::domain::ServiceParams;
    ///
    /// let params: ServiceParams = [("user", "app"), ("password", "s3cret")].into_iter().collect();
    /// assert_eq!(params.redacted().get("password"), Some("*****"));
    /// assert_eq!(params.get("password"), Some("s3cret"));
    /// ```
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some((_, value)) = copy.entries.iter_mut().find(|(k, _)| k == "password") {
            *value = REDACTED.to_string();
        }
        copy
    }

    /// Returns the keys from `required` that are absent, sorted and deduplicated.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        let mut missing: Vec<String> = required
            .iter()
            .map(|key| key.as_ref())
            .filter(|key| !self.contains_key(key))
            .map(str::to_string)
            .collect();
        missing.sort();
        missing.dedup();
        missing
    }

    /// Checks that every key and value can be written as a `key=value` line.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidParam` for the first offending parameter.
    pub fn validate(&self) -> Result<()> {
        for (key, value) in self.iter() {
            validate_key(key)?;
            if value.contains(['\r', '\n']) {
                return Err(invalid(key, "value contains a line break"));
            }
            if value.trim() != value {
                return Err(invalid(key, "value has surrounding whitespace"));
            }
        }
        Ok(())
    }
}

fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(invalid(key, "key is empty"));
    }
    if key.trim() != key {
        return Err(invalid(key, "key has surrounding whitespace"));
    }
    if key.starts_with(['#', ';']) {
        return Err(invalid(key, "key starts with a comment marker"));
    }
    if let Some(c) = key.chars().find(|c| matches!(c, '=' | '[' | ']' | '\r' | '\n')) {
        return Err(invalid(key, format!("key contains {:?}", c)));
    }
    Ok(())
}

fn invalid(key: &str, reason: impl Into<String>) -> ServiceError {
    ServiceError::InvalidParam {
        key: key.to_string(),
        reason: reason.into(),
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ServiceParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = ServiceParams::new();
        params.extend(iter);
        params
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for ServiceParams {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl IntoIterator for ServiceParams {
    type Item = (String, String);
    type IntoIter = std::vec::IntoIter<(String, String)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl Serialize for ServiceParams {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}
