//! Ownership events returned by ledger history queries.

use crate::{PersistId, UserRef};
use serde::{Deserialize, Serialize};

/// One entry in an entity's ownership history.
///
/// Histories are ordered oldest-first: the first event is the entity's
/// creation, the last event names the current owner. The `event_id`
/// references the ledger action that produced the event (the original
/// save, or a later transfer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnershipEvent {
    /// The owner as of this event.
    pub user: UserRef,
    /// Ledger id of the action that produced this event.
    pub event_id: PersistId,
}

impl OwnershipEvent {
    /// Creates a new ownership event.
    #[must_use]
    pub fn new(user: UserRef, event_id: PersistId) -> Self {
        Self { user, event_id }
    }
}
