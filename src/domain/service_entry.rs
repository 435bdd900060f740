// SPDX-License-Identifier: MIT OR Apache-2.0

//! A named service and its parameters.

use crate::domain::{ServiceName, ServiceParams};
use serde::Serialize;

/// One `[name]` section of a service file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ServiceEntry {
    /// The section name
    pub name: ServiceName,
    /// The `key=value` parameters, in file order
    pub params: ServiceParams,
}

impl ServiceEntry {
    /// Creates a new entry.
    pub fn new(name: ServiceName, params: ServiceParams) -> Self {
        Self { name, params }
    }

    /// Returns a copy with the password redacted.
    pub fn redacted(&self) -> Self {
        Self {
            name: self.name.clone(),
            params: self.params.redacted(),
        }
    }
}
