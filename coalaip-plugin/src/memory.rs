//! In-memory reference implementation of the ledger plugin contract.
//!
//! Backs the integration test suites and serves as a developer stand-in
//! for a real ledger. Single-process only; every call is immediately
//! consistent, which real backends are explicitly not required to be.

use crate::{LedgerPlugin, PluginError, PluginResult};
use coalaip_types::{OwnershipEvent, PersistId, UserRef};
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;
use uuid::Uuid;

/// A persisted entity: its raw payload plus its ordered ownership history.
#[derive(Debug, Clone)]
struct StoredEntity {
    data: Value,
    history: Vec<OwnershipEvent>,
}

/// An in-memory ledger keyed by persist id.
///
/// Transfer actions are stored as entities in their own right (keyed by
/// the transfer id, holding the transfer payload), so a rights assignment
/// minted by a transfer can later be loaded like any other entity.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    entities: RwLock<HashMap<PersistId, StoredEntity>>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn mint_id() -> PersistId {
        PersistId::new(Uuid::now_v7().to_string())
    }

    fn with_entities<R>(&self, f: impl FnOnce(&HashMap<PersistId, StoredEntity>) -> R) -> R {
        let guard = self.entities.read().unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn with_entities_mut<R>(
        &self,
        f: impl FnOnce(&mut HashMap<PersistId, StoredEntity>) -> R,
    ) -> R {
        let mut guard = self
            .entities
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl LedgerPlugin for MemoryLedger {
    fn name(&self) -> &str {
        "memory"
    }

    fn generate_user(&self, params: Value) -> PluginResult<UserRef> {
        let mut user = Map::new();
        user.insert("id".to_string(), json!(Uuid::now_v7().to_string()));
        if let Value::Object(extra) = params {
            user.extend(extra);
        }
        Ok(UserRef::new(Value::Object(user)))
    }

    fn is_same_user(&self, a: &UserRef, b: &UserRef) -> PluginResult<bool> {
        // Users minted by this ledger carry a unique "id"; fall back to
        // structural equality for hand-built user payloads in tests.
        match (a.get_str("/id"), b.get_str("/id")) {
            (Some(id_a), Some(id_b)) => Ok(id_a == id_b),
            _ => Ok(a.as_value() == b.as_value()),
        }
    }

    fn save(&self, entity_data: Value, user: &UserRef) -> PluginResult<PersistId> {
        let persist_id = Self::mint_id();
        debug!(%persist_id, owner = %user, "saving entity to memory ledger");
        self.with_entities_mut(|entities| {
            entities.insert(
                persist_id.clone(),
                StoredEntity {
                    data: entity_data,
                    history: vec![OwnershipEvent::new(user.clone(), persist_id.clone())],
                },
            );
        });
        Ok(persist_id)
    }

    fn load(&self, persist_id: &PersistId) -> PluginResult<Value> {
        self.with_entities(|entities| {
            entities
                .get(persist_id)
                .map(|stored| stored.data.clone())
                .ok_or_else(|| PluginError::NotFound(persist_id.clone()))
        })
    }

    fn get_status(&self, persist_id: &PersistId) -> PluginResult<Value> {
        self.with_entities(|entities| {
            if entities.contains_key(persist_id) {
                // Writes are immediately consistent here; a real ledger
                // would report pending until consensus confirms them.
                Ok(json!({"status": "valid"}))
            } else {
                Err(PluginError::NotFound(persist_id.clone()))
            }
        })
    }

    fn get_history(&self, persist_id: &PersistId) -> PluginResult<Vec<OwnershipEvent>> {
        self.with_entities(|entities| {
            entities
                .get(persist_id)
                .map(|stored| stored.history.clone())
                .ok_or_else(|| PluginError::NotFound(persist_id.clone()))
        })
    }

    fn transfer(
        &self,
        persist_id: &PersistId,
        transfer_payload: Value,
        from: &UserRef,
        to: &UserRef,
    ) -> PluginResult<PersistId> {
        let transfer_id = Self::mint_id();
        self.with_entities_mut(|entities| {
            let current_owner = entities
                .get(persist_id)
                .ok_or_else(|| PluginError::NotFound(persist_id.clone()))?
                .history
                .last()
                .map(|event| event.user.clone())
                .ok_or_else(|| {
                    PluginError::Transfer(format!("entity {persist_id} has no ownership history"))
                })?;

            if !self.is_same_user(&current_owner, from)? {
                return Err(PluginError::Transfer(format!(
                    "user {from} is not the current owner of {persist_id}"
                )));
            }

            debug!(%persist_id, %transfer_id, to = %to, "transferring entity on memory ledger");
            let event = OwnershipEvent::new(to.clone(), transfer_id.clone());
            entities
                .get_mut(persist_id)
                .ok_or_else(|| PluginError::NotFound(persist_id.clone()))?
                .history
                .push(event.clone());

            // Record the transfer action itself so its payload can be
            // loaded back under the transfer id.
            entities.insert(
                transfer_id.clone(),
                StoredEntity {
                    data: transfer_payload,
                    history: vec![event],
                },
            );
            Ok(())
        })?;
        Ok(transfer_id)
    }
}
