//! Shared test helpers for entity and facade tests.

#![allow(dead_code)]

use coalaip::{
    LedgerPlugin, MemoryLedger, OwnershipEvent, PersistId, PluginError, PluginResult, UserRef,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Installs a fmt subscriber honoring `RUST_LOG`; a no-op when one is
/// already set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// A fresh in-memory ledger behind the plugin contract.
pub fn plugin() -> Arc<dyn LedgerPlugin> {
    Arc::new(MemoryLedger::new())
}

/// Generates a user with a display name on the given ledger.
pub fn user(plugin: &Arc<dyn LedgerPlugin>, name: &str) -> UserRef {
    plugin.generate_user(json!({"name": name})).unwrap()
}

pub fn work_data() -> Value {
    json!({"name": "Stranger in a Strange Land"})
}

pub fn manifestation_data() -> Value {
    json!({
        "name": "The Fellowship of the Ring",
        "creator": "https://example.org/users/tolkien",
    })
}

pub fn manifestation_data_for(work_id: &str) -> Value {
    let mut data = manifestation_data();
    data["manifestationOfWork"] = json!(work_id);
    data
}

/// Ledger wrapper that counts `save` calls, records minted ids, and can
/// be scripted to fail the n-th save. Everything else delegates to a
/// [`MemoryLedger`].
pub struct ScriptedLedger {
    inner: MemoryLedger,
    saves: AtomicUsize,
    fail_on_save: Option<usize>,
    saved: Mutex<Vec<PersistId>>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self {
            inner: MemoryLedger::new(),
            saves: AtomicUsize::new(0),
            fail_on_save: None,
            saved: Mutex::new(Vec::new()),
        }
    }

    /// Fails the `nth` save call (1-based); earlier and later saves
    /// succeed.
    pub fn failing_on_save(nth: usize) -> Self {
        Self {
            fail_on_save: Some(nth),
            ..Self::new()
        }
    }

    /// Number of `save` calls attempted so far.
    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    /// Ids of entities successfully saved, in order.
    pub fn saved_ids(&self) -> Vec<PersistId> {
        self.saved.lock().unwrap().clone()
    }
}

impl LedgerPlugin for ScriptedLedger {
    fn name(&self) -> &str {
        "scripted"
    }

    fn generate_user(&self, params: Value) -> PluginResult<UserRef> {
        self.inner.generate_user(params)
    }

    fn is_same_user(&self, a: &UserRef, b: &UserRef) -> PluginResult<bool> {
        self.inner.is_same_user(a, b)
    }

    fn save(&self, entity_data: Value, user: &UserRef) -> PluginResult<PersistId> {
        let attempt = self.saves.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_on_save == Some(attempt) {
            return Err(PluginError::Creation("scripted ledger failure".to_string()));
        }
        let persist_id = self.inner.save(entity_data, user)?;
        self.saved.lock().unwrap().push(persist_id.clone());
        Ok(persist_id)
    }

    fn load(&self, persist_id: &PersistId) -> PluginResult<Value> {
        self.inner.load(persist_id)
    }

    fn get_status(&self, persist_id: &PersistId) -> PluginResult<Value> {
        self.inner.get_status(persist_id)
    }

    fn get_history(&self, persist_id: &PersistId) -> PluginResult<Vec<OwnershipEvent>> {
        self.inner.get_history(persist_id)
    }

    fn transfer(
        &self,
        persist_id: &PersistId,
        transfer_payload: Value,
        from: &UserRef,
        to: &UserRef,
    ) -> PluginResult<PersistId> {
        self.inner.transfer(persist_id, transfer_payload, from, to)
    }
}
