//! Identifier types used throughout the COALA IP core.
//!
//! A persist identifier is whatever string the backing ledger hands back
//! from a save or transfer call. The core never inspects its structure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Opaque handle identifying a stored entity (or transfer action) on the
/// backing persistence layer.
///
/// The format is entirely plugin-defined — a UUID, a transaction hash, a
/// database row key. The core only ever stores, compares, and echoes it
/// back to the plugin that minted it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistId(String);

impl PersistId {
    /// Wraps a plugin-minted identifier.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the handle, returning the underlying string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for PersistId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for PersistId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for PersistId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl FromStr for PersistId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}
