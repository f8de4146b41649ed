//! Persistence plugin contract for the COALA IP entity engine.
//!
//! The core never talks to a ledger, database, or file store directly. It
//! depends only on the [`LedgerPlugin`] trait defined here; concrete
//! backends implement it in full (the trait system rejects partial
//! implementations at compile time) and are handed to the entity layer by
//! explicit dependency injection — there is no global plugin registry.
//!
//! Every method is a blocking call that may fail independently; the core
//! imposes no timeouts, retries, or cross-call atomicity of its own.
//!
//! [`MemoryLedger`] is a reference backend backed by in-process maps, used
//! by the test suites and useful as a stand-in during development.

mod error;
mod memory;

pub use error::{PluginError, PluginResult};
pub use memory::MemoryLedger;

use coalaip_types::{OwnershipEvent, PersistId, UserRef};
use serde_json::Value;

/// Capability set every persistence backend must provide.
///
/// Implementations are expected to be cheap to share behind an
/// `Arc<dyn LedgerPlugin>`; the core holds one instance per facade and
/// compares plugin identity by pointer, never by name.
pub trait LedgerPlugin: Send + Sync {
    /// A short name for the backend (e.g. "bigchaindb", "memory").
    /// Used for diagnostics only.
    fn name(&self) -> &str;

    /// Generates a new user on the persistence layer.
    ///
    /// `params` is backend-defined (key material, display names, ...).
    /// The returned representation is opaque to the core and is compared
    /// only through [`LedgerPlugin::is_same_user`].
    fn generate_user(&self, params: Value) -> PluginResult<UserRef>;

    /// Returns whether two user representations denote the same user.
    ///
    /// Backends may normalize before comparing (e.g. ignore secret keys
    /// that are omitted from users returned in histories).
    fn is_same_user(&self, a: &UserRef, b: &UserRef) -> PluginResult<bool>;

    /// Persists an entity payload, assigning it to `user`.
    ///
    /// Returns the id of the created entity on the persistence layer.
    /// A returned id means the call was accepted, not that the write has
    /// been confirmed — ledgers may have non-negligible consensus latency.
    fn save(&self, entity_data: Value, user: &UserRef) -> PluginResult<PersistId>;

    /// Fetches the raw payload of a previously persisted entity.
    fn load(&self, persist_id: &PersistId) -> PluginResult<Value>;

    /// Returns the backend-defined status of a persisted entity
    /// (e.g. pending/committed for a consensus-based ledger).
    fn get_status(&self, persist_id: &PersistId) -> PluginResult<Value>;

    /// Returns the ordered ownership history of a persisted entity,
    /// oldest event first. The last event names the current owner.
    fn get_history(&self, persist_id: &PersistId) -> PluginResult<Vec<OwnershipEvent>>;

    /// Transfers a persisted entity from `from` to `to`, recording
    /// `transfer_payload` with the transfer action.
    ///
    /// Returns the id of the transfer action on the persistence layer.
    fn transfer(
        &self,
        persist_id: &PersistId,
        transfer_payload: Value,
        from: &UserRef,
        to: &UserRef,
    ) -> PluginResult<PersistId>;
}
