//! Error types for ledger plugins.

use coalaip_types::PersistId;
use thiserror::Error;

/// Result type for plugin operations.
pub type PluginResult<T> = Result<T, PluginError>;

/// Errors a ledger plugin may surface to the core.
///
/// The core never retries or suppresses these; they propagate unchanged to
/// the caller. `NotFound` is the one variant the core gives extra meaning
/// to (an entity id the ledger does not know).
#[derive(Debug, Error)]
pub enum PluginError {
    /// The ledger has no entity under the given id.
    #[error("entity not found on ledger: {0}")]
    NotFound(PersistId),

    /// The ledger rejected or failed an entity creation.
    #[error("entity creation failed on ledger: {0}")]
    Creation(String),

    /// The ledger rejected or failed a transfer action.
    #[error("entity transfer failed on ledger: {0}")]
    Transfer(String),

    /// Serialization of a payload going into or out of the ledger failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Any other backend-originated failure, carried unchanged.
    #[error("ledger backend error: {0}")]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl PluginError {
    /// Wraps an arbitrary backend error.
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Backend(Box::new(err))
    }
}
