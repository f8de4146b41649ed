//! Eager and lazily-loadable entity models.
//!
//! A [`Model`] is validated on construction and immutable thereafter. A
//! [`LazyModel`] defers data population until first load: it is an
//! explicit two-state machine (unloaded → loaded) whose only mutation is
//! that single transition, re-runnable solely via `force`.

use crate::data_format::{default_ld_context, detect_format, extract_ld, render_ld, DataFormat};
use crate::{ModelError, ModelResult, ModelSchema};
use coalaip_plugin::LedgerPlugin;
use coalaip_types::PersistId;
use serde_json::{Map, Value};
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// A validated, immutable model for one entity.
#[derive(Debug, Clone, PartialEq)]
pub struct Model {
    data: Map<String, Value>,
    ld_type: String,
    ld_id: String,
    ld_context: Vec<Value>,
    schema: ModelSchema,
}

impl Model {
    /// Builds a model for `schema`, validating `data` against it.
    ///
    /// `ld_type` must match the schema's strict type when the schema pins
    /// one; `ld_context` and `ld_id` fall back to the defaults.
    pub fn new(
        schema: ModelSchema,
        data: Map<String, Value>,
        ld_type: Option<&str>,
        ld_context: Option<Vec<Value>>,
        ld_id: Option<String>,
    ) -> ModelResult<Self> {
        let ld_type = schema.resolve_ld_type(ld_type)?;
        schema.validate(&data)?;
        Ok(Self {
            data,
            ld_type,
            ld_id: ld_id.unwrap_or_default(),
            ld_context: ld_context.unwrap_or_else(default_ld_context),
            schema,
        })
    }

    /// The model data, without linked-data specifics.
    #[must_use]
    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    /// The entity's linked-data `@type`.
    #[must_use]
    pub fn ld_type(&self) -> &str {
        &self.ld_type
    }

    /// The entity's linked-data `@id`; empty when none was assigned.
    #[must_use]
    pub fn ld_id(&self) -> &str {
        &self.ld_id
    }

    /// The entity's linked-data `@context`.
    #[must_use]
    pub fn ld_context(&self) -> &[Value] {
        &self.ld_context
    }

    /// The schema this model was validated against.
    #[must_use]
    pub fn schema(&self) -> ModelSchema {
        self.schema
    }

    /// Renders the model as a payload in the requested format.
    #[must_use]
    pub fn to_value(&self, format: DataFormat) -> Value {
        render_ld(&self.data, &self.ld_type, &self.ld_id, &self.ld_context, format)
    }
}

/// Load state of a [`LazyModel`]: the one-time unloaded → loaded
/// transition, made explicit.
#[derive(Debug)]
enum LoadState {
    Unloaded,
    Loaded(Model),
}

/// A model whose data may be populated later from the persistence layer.
///
/// Until the first successful load, data accessors fail with
/// [`ModelError::NotYetLoaded`]. Loading is idempotent: once loaded,
/// further loads are no-ops unless forced, in which case the cached data
/// is re-fetched and replaced.
pub struct LazyModel {
    ld_type: String,
    ld_context: Vec<Value>,
    schema: ModelSchema,
    state: RwLock<LoadState>,
}

impl LazyModel {
    /// Creates an unloaded model for `schema`, using the schema's default
    /// linked-data type and context.
    #[must_use]
    pub fn unloaded(schema: ModelSchema) -> Self {
        Self {
            ld_type: schema.default_ld_type().to_string(),
            ld_context: default_ld_context(),
            schema,
            state: RwLock::new(LoadState::Unloaded),
        }
    }

    /// Creates an unloaded model expecting the given linked-data type
    /// instead of the schema's default.
    ///
    /// Needed to rehydrate data persisted with an overridden type on
    /// schemas that allow one; strict schemas reject foreign types here
    /// just as they do on construction.
    pub fn unloaded_with_type(schema: ModelSchema, ld_type: &str) -> ModelResult<Self> {
        let ld_type = schema.resolve_ld_type(Some(ld_type))?;
        Ok(Self {
            ld_type,
            ld_context: default_ld_context(),
            schema,
            state: RwLock::new(LoadState::Unloaded),
        })
    }

    /// Wraps an already-populated model; accessors succeed immediately.
    #[must_use]
    pub fn loaded(model: Model) -> Self {
        Self {
            ld_type: model.ld_type().to_string(),
            ld_context: model.ld_context().to_vec(),
            schema: model.schema(),
            state: RwLock::new(LoadState::Loaded(model)),
        }
    }

    /// The entity's linked-data `@type` (known even before loading).
    #[must_use]
    pub fn ld_type(&self) -> &str {
        &self.ld_type
    }

    /// The schema loaded data will be validated against.
    #[must_use]
    pub fn schema(&self) -> ModelSchema {
        self.schema
    }

    /// Whether the one-time load transition has happened.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        matches!(*self.read_state(), LoadState::Loaded(_))
    }

    /// A copy of the model data.
    pub fn data(&self) -> ModelResult<Map<String, Value>> {
        self.with_model(|model| model.data().clone())
    }

    /// The entity's linked-data `@id`.
    pub fn ld_id(&self) -> ModelResult<String> {
        self.with_model(|model| model.ld_id().to_string())
    }

    /// Renders the loaded model as a payload in the requested format.
    pub fn to_value(&self, format: DataFormat) -> ModelResult<Value> {
        self.with_model(|model| model.to_value(format))
    }

    /// Populates the model from the persistence layer.
    ///
    /// Fetches `persist_id` through `plugin` exactly once: if the model is
    /// already loaded this is a no-op, unless `force` is set, in which
    /// case the data is re-fetched and the cached model replaced. The
    /// loaded payload is validated against the model's schema and its
    /// linked-data type and context are checked against the expected ones.
    pub fn load(
        &self,
        persist_id: &PersistId,
        plugin: &dyn LedgerPlugin,
        force: bool,
    ) -> ModelResult<()> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if matches!(*state, LoadState::Loaded(_)) && !force {
            return Ok(());
        }

        let persisted = plugin.load(persist_id)?;
        let Value::Object(raw) = persisted else {
            return Err(ModelError::Data(format!(
                "ledger returned a non-object payload for '{persist_id}'"
            )));
        };

        let format = detect_format(&raw);
        let extracted = extract_ld(&raw, format)?;

        // Sanity-check what came back against what this model expects.
        if let Some(loaded_type) = &extracted.ld_type {
            if loaded_type != &self.ld_type {
                return Err(ModelError::Data(format!(
                    "loaded @type '{loaded_type}' differs from expected '{}'",
                    self.ld_type
                )));
            }
        }
        if let Some(loaded_context) = &extracted.ld_context {
            if loaded_context != &self.ld_context {
                return Err(ModelError::Data(format!(
                    "loaded @context differs from expected context of '{}'",
                    self.ld_type
                )));
            }
        }

        let model = Model::new(
            self.schema,
            extracted.data,
            Some(&self.ld_type),
            Some(self.ld_context.clone()),
            extracted.ld_id,
        )?;
        *state = LoadState::Loaded(model);
        Ok(())
    }

    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, LoadState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn with_model<R>(&self, f: impl FnOnce(&Model) -> R) -> ModelResult<R> {
        match &*self.read_state() {
            LoadState::Loaded(model) => Ok(f(model)),
            LoadState::Unloaded => Err(ModelError::NotYetLoaded),
        }
    }
}

impl fmt::Debug for LazyModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.read_state();
        let data: &dyn fmt::Debug = match &*state {
            LoadState::Loaded(model) => model.data(),
            LoadState::Unloaded => &"not loaded",
        };
        f.debug_struct("LazyModel")
            .field("ld_type", &self.ld_type)
            .field("schema", &self.schema)
            .field("data", data)
            .finish()
    }
}
