//! COALA IP entity engine.
//!
//! Models intellectual-property records — works, manifestations,
//! copyrights, and derived rights — as a small graph of typed entities,
//! and mediates their creation, lazy loading, and ownership transfer
//! against an externally supplied persistence backend.
//!
//! The crate is organized around three layers:
//! - [`Entity`] and its typed aliases ([`Work`], [`Manifestation`],
//!   [`Right`], [`Copyright`], [`RightsAssignment`]) — verified, largely
//!   immutable business objects wrapping validated models
//! - [`CoalaIp`] — the plugin-bound facade exposing the user-facing
//!   workflows: register a manifestation graph, derive a right, transfer
//!   a right
//! - the [`LedgerPlugin`] contract (from `coalaip-plugin`) — the
//!   capability set a backend must implement; handed in by explicit
//!   dependency injection
//!
//! The core guarantees only its own in-memory invariants (validation,
//! immutability, one-time persist/load transitions). Durability,
//! consensus, retries, and conflict resolution are the backend's
//! responsibility, and multi-step workflows are deliberately
//! non-transactional.
//!
//! ```
//! use coalaip::{CoalaIp, MemoryLedger};
//! use serde_json::json;
//! use std::sync::Arc;
//!
//! let coalaip = CoalaIp::new(Arc::new(MemoryLedger::new()));
//! let alice = coalaip.generate_user(json!({"name": "alice"})).unwrap();
//!
//! let registration = coalaip
//!     .register_manifestation(
//!         json!({"name": "Stranger in a Strange Land", "creator": "alice"}),
//!         &alice,
//!         None,
//!         None,
//!     )
//!     .unwrap();
//! assert!(registration.copyright.persist_id().is_some());
//! ```

mod entity;
mod error;
mod facade;

pub use entity::{
    kind, Copyright, Entity, EntityKind, Manifestation, Persistable, Right, RightsAssignment,
    Transferrable, Work,
};
pub use error::{EntityError, EntityResult};
pub use facade::{CoalaIp, RegistrationResult, TransferResult};

// Re-export the lower layers so downstream users need only this crate.
pub use coalaip_model::{
    default_ld_context, fields, DataFormat, LazyModel, Model, ModelError, ModelResult, ModelSchema,
    COALAIP_CONTEXT, SCHEMA_CONTEXT,
};
pub use coalaip_plugin::{LedgerPlugin, MemoryLedger, PluginError, PluginResult};
pub use coalaip_types::{OwnershipEvent, PersistId, UserRef};
