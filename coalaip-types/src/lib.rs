//! Core type definitions for the COALA IP entity engine.
//!
//! This crate defines the fundamental, ledger-agnostic types shared by the
//! model, plugin, and entity layers:
//! - [`PersistId`] — opaque handle identifying a stored entity on a ledger
//! - [`UserRef`] — opaque user representation produced by a ledger plugin
//! - [`OwnershipEvent`] — one entry of an entity's ownership history
//!
//! All domain-specific structure (work/manifestation/right payloads, schemas,
//! linked-data contexts) belongs in `coalaip-model`, not here.

mod event;
mod ids;
mod user;

pub use event::OwnershipEvent;
pub use ids::PersistId;
pub use user::UserRef;
