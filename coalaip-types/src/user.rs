//! Opaque user representations.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// A user as represented by the backing persistence layer.
///
/// The core treats users as opaque: a plugin's `generate_user` produces
/// them and only the same plugin's `is_same_user` may compare them. The
/// payload is arbitrary JSON — a keypair, an account id, a verbose profile.
///
/// Deliberately does **not** implement `PartialEq`; structural equality of
/// two user payloads is not a meaningful identity check (a ledger may, for
/// example, omit secret keys from users returned in histories).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserRef(Value);

impl UserRef {
    /// Wraps a plugin-defined user payload.
    #[must_use]
    pub fn new(repr: Value) -> Self {
        Self(repr)
    }

    /// Returns the underlying JSON payload.
    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Consumes the reference, returning the JSON payload.
    #[must_use]
    pub fn into_value(self) -> Value {
        self.0
    }

    /// Extracts a string field from the payload using a JSON pointer
    /// (e.g., "/name"). Convenience for plugins and tests.
    #[must_use]
    pub fn get_str(&self, pointer: &str) -> Option<&str> {
        self.0.pointer(pointer).and_then(|v| v.as_str())
    }
}

impl From<Value> for UserRef {
    fn from(repr: Value) -> Self {
        Self(repr)
    }
}

impl fmt::Display for UserRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
