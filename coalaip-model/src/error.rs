//! Error types for the model layer.

use coalaip_plugin::PluginError;
use thiserror::Error;

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while building, validating, or loading a model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Required fields are missing, mistyped, or inconsistent with the
    /// model's declared schema.
    #[error("invalid model data: {0}")]
    Data(String),

    /// A data accessor was invoked on a lazily-loadable model before its
    /// first successful load.
    #[error("model data has not been loaded from the ledger yet")]
    NotYetLoaded,

    /// A ledger error surfaced while loading model data; carried
    /// unchanged from the plugin.
    #[error(transparent)]
    Ledger(#[from] PluginError),
}
