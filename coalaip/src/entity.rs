//! Typed IP entities over a pluggable persistence layer.
//!
//! An [`Entity`] wraps exactly one model, a shared plugin handle, and an
//! optional persist id. It is immutable after construction except for two
//! one-time transitions, each its own explicit state machine:
//! - unpersisted → persisted (the `OnceLock`-guarded persist id)
//! - unloaded → loaded (the model's lazy-load transition)
//!
//! Variants are zero-sized [`kind`] markers so each entity carries its
//! schema and linked-data type at compile time. Capabilities are split by
//! marker trait: every kind except rights assignments is [`Persistable`];
//! only rights and copyrights are [`Transferrable`] and expose ownership
//! history. Downstream crates can define more specific right kinds (a
//! playback right, a streaming right) by implementing [`EntityKind`] with
//! the Right schema plus [`Transferrable`].

use crate::{EntityError, EntityResult};
use coalaip_model::{extract_ld, DataFormat, LazyModel, Model, ModelError, ModelSchema};
use coalaip_plugin::LedgerPlugin;
use coalaip_types::{OwnershipEvent, PersistId, UserRef};
use serde_json::{Map, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::{Arc, OnceLock};

/// Marker trait tying an entity variant to its validation schema.
pub trait EntityKind {
    /// The schema models of this kind are validated against.
    const SCHEMA: ModelSchema;
}

/// Entity kinds that can be persisted directly via [`Entity::persist`].
///
/// Rights assignments are deliberately not persistable: they only come
/// into existence through transfer actions.
pub trait Persistable: EntityKind {}

/// Entity kinds with an owner: they expose ownership history and can be
/// transferred. Only rights and copyrights qualify.
pub trait Transferrable: EntityKind {}

/// Zero-sized markers for the built-in entity variants.
pub mod kind {
    /// An abstract creative work. Not ownable, not transferrable.
    #[derive(Debug, Clone, Copy)]
    pub struct Work;

    /// A perceivable expression of a work.
    #[derive(Debug, Clone, Copy)]
    pub struct Manifestation;

    /// A transferrable entitlement derived from a copyright or another
    /// right.
    #[derive(Debug, Clone, Copy)]
    pub struct Right;

    /// The full entitlement minted when a manifestation is registered.
    #[derive(Debug, Clone, Copy)]
    pub struct Copyright;

    /// The record of a right changing hands.
    #[derive(Debug, Clone, Copy)]
    pub struct RightsAssignment;
}

impl EntityKind for kind::Work {
    const SCHEMA: ModelSchema = ModelSchema::Work;
}
impl EntityKind for kind::Manifestation {
    const SCHEMA: ModelSchema = ModelSchema::Manifestation;
}
impl EntityKind for kind::Right {
    const SCHEMA: ModelSchema = ModelSchema::Right;
}
impl EntityKind for kind::Copyright {
    const SCHEMA: ModelSchema = ModelSchema::Copyright;
}
impl EntityKind for kind::RightsAssignment {
    const SCHEMA: ModelSchema = ModelSchema::RightsAssignment;
}

impl Persistable for kind::Work {}
impl Persistable for kind::Manifestation {}
impl Persistable for kind::Right {}
impl Persistable for kind::Copyright {}

impl Transferrable for kind::Right {}
impl Transferrable for kind::Copyright {}

/// A COALA IP entity: one model, one plugin handle, at most one persist id.
pub struct Entity<K: EntityKind> {
    model: LazyModel,
    persist_id: OnceLock<PersistId>,
    plugin: Arc<dyn LedgerPlugin>,
    _kind: PhantomData<K>,
}

/// An abstract creative work.
pub type Work = Entity<kind::Work>;
/// A concrete expression of a [`Work`].
pub type Manifestation = Entity<kind::Manifestation>;
/// A transferrable right derived from a [`Copyright`] or another right.
pub type Right = Entity<kind::Right>;
/// The right automatically minted at manifestation registration.
pub type Copyright = Entity<kind::Copyright>;
/// The record created when a right is transferred.
pub type RightsAssignment = Entity<kind::RightsAssignment>;

impl<K: EntityKind> Entity<K> {
    fn with_model(model: LazyModel, plugin: Arc<dyn LedgerPlugin>) -> Self {
        Self {
            model,
            persist_id: OnceLock::new(),
            plugin,
            _kind: PhantomData,
        }
    }

    /// Builds an entity from raw model data in the given wire format.
    ///
    /// The data is validated against the kind's schema immediately; the
    /// resulting entity is fully loaded but not yet persisted.
    pub fn from_data(
        data: Value,
        format: DataFormat,
        plugin: Arc<dyn LedgerPlugin>,
    ) -> EntityResult<Self> {
        let Value::Object(raw) = data else {
            return Err(ModelError::Data("entity data must be a JSON object".to_string()).into());
        };
        let extracted = extract_ld(&raw, format)?;
        let model = Model::new(
            K::SCHEMA,
            extracted.data,
            extracted.ld_type.as_deref(),
            extracted.ld_context,
            extracted.ld_id,
        )?;
        Ok(Self::with_model(LazyModel::loaded(model), plugin))
    }

    /// Builds a lazily-loaded entity from its id on the persistence layer.
    ///
    /// Without `force_load`, no ledger call happens here: the data is
    /// fetched on first access, which is when a dangling id surfaces as a
    /// not-found error. With `force_load`, the fetch happens immediately.
    pub fn from_persist_id(
        persist_id: PersistId,
        plugin: Arc<dyn LedgerPlugin>,
        force_load: bool,
    ) -> EntityResult<Self> {
        Self::from_unloaded(LazyModel::unloaded(K::SCHEMA), persist_id, plugin, force_load)
    }

    /// Like [`Entity::from_persist_id`], but expecting the given
    /// linked-data type instead of the kind's default.
    ///
    /// Required to rehydrate entities of kinds with an overridable type
    /// (a manifestation persisted as "Book", a right persisted as
    /// "PlaybackRight"); kinds with a fixed type reject anything else.
    pub fn from_persist_id_with_type(
        persist_id: PersistId,
        ld_type: &str,
        plugin: Arc<dyn LedgerPlugin>,
        force_load: bool,
    ) -> EntityResult<Self> {
        let model = LazyModel::unloaded_with_type(K::SCHEMA, ld_type)?;
        Self::from_unloaded(model, persist_id, plugin, force_load)
    }

    fn from_unloaded(
        model: LazyModel,
        persist_id: PersistId,
        plugin: Arc<dyn LedgerPlugin>,
        force_load: bool,
    ) -> EntityResult<Self> {
        let entity = Self::with_model(model, plugin);
        let _ = entity.persist_id.set(persist_id);
        if force_load {
            entity.load()?;
        }
        Ok(entity)
    }

    /// This entity's id on the persistence layer, once persisted.
    #[must_use]
    pub fn persist_id(&self) -> Option<&PersistId> {
        self.persist_id.get()
    }

    /// The plugin this entity is bound to.
    #[must_use]
    pub fn plugin(&self) -> &Arc<dyn LedgerPlugin> {
        &self.plugin
    }

    /// The entity's linked-data type (known without loading).
    #[must_use]
    pub fn ld_type(&self) -> &str {
        self.model.ld_type()
    }

    /// Whether the model data is populated.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    /// Loads the entity's data from the persistence layer, if it has not
    /// been loaded yet. No-op for entities built via [`Entity::from_data`].
    pub fn load(&self) -> EntityResult<()> {
        self.load_inner(false)
    }

    /// Re-fetches the entity's data, replacing anything cached.
    pub fn reload(&self) -> EntityResult<()> {
        self.load_inner(true)
    }

    fn load_inner(&self, force: bool) -> EntityResult<()> {
        if self.model.is_loaded() && !force {
            return Ok(());
        }
        let persist_id = self.persist_id.get().ok_or(EntityError::NotYetPersisted)?;
        self.model.load(persist_id, self.plugin.as_ref(), force)?;
        Ok(())
    }

    /// A copy of the entity's model data, without linked-data specifics.
    ///
    /// For lazily-constructed entities the first access triggers the load.
    pub fn data(&self) -> EntityResult<Map<String, Value>> {
        self.load()?;
        Ok(self.model.data()?)
    }

    /// Renders the entity in the requested wire format, loading first if
    /// necessary.
    pub fn to_value(&self, format: DataFormat) -> EntityResult<Value> {
        self.load()?;
        Ok(self.model.to_value(format)?)
    }

    /// Renders the entity as plain JSON (`type` key, no context or id).
    pub fn to_json(&self) -> EntityResult<Value> {
        self.to_value(DataFormat::Json)
    }

    /// Renders the entity as JSON-LD (`@type`, `@context`, `@id`).
    pub fn to_jsonld(&self) -> EntityResult<Value> {
        self.to_value(DataFormat::JsonLd)
    }

    /// The backend-defined status of this entity, or `None` while the
    /// entity is unpersisted.
    pub fn status(&self) -> EntityResult<Option<Value>> {
        match self.persist_id.get() {
            None => Ok(None),
            Some(persist_id) => Ok(Some(self.plugin.get_status(persist_id)?)),
        }
    }
}

impl<K: Persistable> Entity<K> {
    /// Persists this entity as JSON-LD, assigning it to `user`.
    ///
    /// Exactly-once per instance: a second call fails with
    /// [`EntityError::PreviouslyCreated`] without touching the ledger.
    /// A returned id means the ledger accepted the call; confirmation
    /// (e.g. consensus) is the caller's concern.
    pub fn persist(&self, user: &UserRef) -> EntityResult<PersistId> {
        self.persist_as(user, DataFormat::default())
    }

    /// Persists this entity in the given wire format.
    pub fn persist_as(&self, user: &UserRef, format: DataFormat) -> EntityResult<PersistId> {
        if let Some(existing_id) = self.persist_id.get() {
            return Err(EntityError::PreviouslyCreated {
                existing_id: existing_id.clone(),
            });
        }
        let entity_data = self.to_value(format)?;
        let persist_id = self.plugin.save(entity_data, user)?;
        let _ = self.persist_id.set(persist_id.clone());
        Ok(persist_id)
    }
}

impl<K: Transferrable> Entity<K> {
    /// The ordered ownership history of this entity, oldest event first.
    ///
    /// Resolved on demand through the plugin; fails with
    /// [`EntityError::NotYetPersisted`] before the entity is persisted.
    pub fn history(&self) -> EntityResult<Vec<OwnershipEvent>> {
        let persist_id = self.persist_id.get().ok_or(EntityError::NotYetPersisted)?;
        Ok(self.plugin.get_history(persist_id)?)
    }

    /// The holder named by the most recent ownership event, or `None`
    /// when the ledger reports an empty history.
    pub fn current_owner(&self) -> EntityResult<Option<UserRef>> {
        let mut history = self.history()?;
        Ok(history.pop().map(|event| event.user))
    }

    /// Transfers this entity on the persistence layer, recording
    /// `transfer_payload` with the transfer action.
    ///
    /// Returns the ledger id of the transfer action. This is the raw
    /// plugin call; the ownership precondition checks live in the
    /// facade's `transfer_right`.
    pub fn transfer(
        &self,
        transfer_payload: Value,
        from: &UserRef,
        to: &UserRef,
    ) -> EntityResult<PersistId> {
        let persist_id = self.persist_id.get().ok_or(EntityError::NotYetPersisted)?;
        Ok(self
            .plugin
            .transfer(persist_id, transfer_payload, from, to)?)
    }
}

impl RightsAssignment {
    /// Records the transfer action that minted this assignment as its
    /// persist id. Called by the facade after a successful transfer.
    pub(crate) fn record_transfer_id(&self, transfer_id: PersistId) {
        let _ = self.persist_id.set(transfer_id);
    }
}

impl<K: EntityKind> fmt::Debug for Entity<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("kind", &K::SCHEMA)
            .field("persist_id", &self.persist_id.get())
            .field("plugin", &self.plugin.name())
            .field("model", &self.model)
            .finish()
    }
}
