//! Product reference module

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier naming a product owned by the catalog.
///
/// The tier model only ever compares refs for identity; it never looks at
/// product content.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductRef(String);

impl ProductRef {
    /// Create a new product reference
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Get the reference as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the reference, returning the inner id
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProductRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProductRef {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ProductRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}
