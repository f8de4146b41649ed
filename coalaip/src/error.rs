//! Error types for the entity and facade layers.

use coalaip_model::ModelError;
use coalaip_plugin::PluginError;
use coalaip_types::PersistId;
use thiserror::Error;

/// Result type for entity and facade operations.
pub type EntityResult<T> = Result<T, EntityError>;

/// Errors raised by entities and the high-level workflows.
///
/// Validation errors are raised immediately and locally; ledger errors
/// (the `Model` and `Ledger` variants) are carried unchanged from the
/// plugin, never retried or suppressed.
#[derive(Debug, Error)]
pub enum EntityError {
    /// An operation required a persist id, but the entity has none yet.
    #[error("entity has not been persisted to the ledger yet")]
    NotYetPersisted,

    /// `persist` was called on an entity that already holds a persist id.
    /// Persistence is exactly-once per in-memory entity instance.
    #[error("entity was previously persisted as '{existing_id}'")]
    PreviouslyCreated {
        /// The id the entity already holds on the persistence layer.
        existing_id: PersistId,
    },

    /// Cross-entity validation failed while creating an entity (e.g. a
    /// derived right broader than its source, or a holder who is not the
    /// source's current owner).
    #[error("entity creation rejected: {0}")]
    Creation(String),

    /// Cross-entity validation failed while transferring an entity.
    #[error("entity transfer rejected: {0}")]
    Transfer(String),

    /// An entity bound to one plugin instance was used with a facade (or
    /// entity) bound to a different one.
    #[error("entity is bound to plugin '{entity_plugin}' but the facade uses '{facade_plugin}'")]
    IncompatiblePlugin {
        facade_plugin: String,
        entity_plugin: String,
    },

    /// A model-layer failure: schema violation or access before load.
    #[error(transparent)]
    Model(#[from] ModelError),

    /// A ledger-originated failure, propagated unchanged.
    #[error(transparent)]
    Ledger(#[from] PluginError),
}

impl EntityError {
    /// Whether this error means the ledger has no entity under the
    /// queried id, regardless of which layer surfaced it.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::Ledger(PluginError::NotFound(_))
                | Self::Model(ModelError::Ledger(PluginError::NotFound(_)))
        )
    }
}
