//! Data models for COALA IP entities.
//!
//! This crate owns the semantic layer beneath the entity types:
//! - [`Model`] — a validated, immutable key→value container for one entity
//! - [`LazyModel`] — the same, with data population deferred until first
//!   load from the persistence layer
//! - [`ModelSchema`] — per-variant validation rules and linked-data types
//! - [`DataFormat`] and the extract/render helpers — pluggable encoding
//!   between model data and JSON / JSON-LD payloads
//!
//! Models are consumed by the entity layer in the `coalaip` crate; nothing
//! here knows about persist ids being assigned or ownership histories.

mod data_format;
mod error;
mod model;
mod schema;

pub use data_format::{
    default_ld_context, detect_format, extract_ld, render_ld, DataFormat, ExtractedLd,
    COALAIP_CONTEXT, SCHEMA_CONTEXT,
};
pub use error::{ModelError, ModelResult};
pub use model::{LazyModel, Model};
pub use schema::{fields, ModelSchema};
