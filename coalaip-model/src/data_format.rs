//! Linked-data formats supported by the entity core.
//!
//! Entities can be rendered to, and rehydrated from, either plain JSON or
//! JSON-LD. The two differ only in which keys carry the linked-data
//! specifics: JSON-LD uses `@type`/`@context`/`@id`, plain JSON keeps a
//! bare `type` and drops context and id.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON-LD context URL for the COALA IP vocabulary.
pub const COALAIP_CONTEXT: &str = "https://w3id.org/coalaip/v1";

/// JSON-LD context URL for schema.org, which COALA IP creations build on.
pub const SCHEMA_CONTEXT: &str = "http://schema.org/";

/// Returns the default `@context` for entities: COALA IP plus schema.org.
#[must_use]
pub fn default_ld_context() -> Vec<Value> {
    vec![json!(COALAIP_CONTEXT), json!(SCHEMA_CONTEXT)]
}

/// Wire format for entity payloads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataFormat {
    /// Plain JSON: linked-data type under `type`, no context or id.
    Json,
    /// JSON-LD: `@type`, `@context`, and `@id` carried as-is.
    #[default]
    JsonLd,
}

/// Model data with its linked-data specifics split out.
///
/// Missing linked-data properties are `None`; `data` holds everything
/// else, untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedLd {
    pub data: Map<String, Value>,
    pub ld_type: Option<String>,
    pub ld_context: Option<Vec<Value>>,
    pub ld_id: Option<String>,
}

/// Guesses the format of a raw payload: JSON-LD if any `@`-prefixed
/// linked-data key is present, plain JSON otherwise.
#[must_use]
pub fn detect_format(data: &Map<String, Value>) -> DataFormat {
    if data.contains_key("@type") || data.contains_key("@context") || data.contains_key("@id") {
        DataFormat::JsonLd
    } else {
        DataFormat::Json
    }
}

/// Splits a raw payload into its plain data and linked-data parts.
///
/// Does not modify the input. Fails with [`ModelError::Data`] when a
/// linked-data key is present but mistyped (e.g. a non-string `@type`).
pub fn extract_ld(data: &Map<String, Value>, format: DataFormat) -> ModelResult<ExtractedLd> {
    let mut data = data.clone();
    let mut extracted = ExtractedLd {
        data: Map::new(),
        ld_type: None,
        ld_context: None,
        ld_id: None,
    };

    let type_key = match format {
        DataFormat::JsonLd => "@type",
        DataFormat::Json => "type",
    };
    if let Some(value) = data.remove(type_key) {
        extracted.ld_type = Some(expect_string(type_key, value)?);
    }

    if format == DataFormat::JsonLd {
        if let Some(value) = data.remove("@context") {
            extracted.ld_context = Some(normalize_context(value));
        }
        if let Some(value) = data.remove("@id") {
            extracted.ld_id = Some(expect_string("@id", value)?);
        }
    }

    extracted.data = data;
    Ok(extracted)
}

/// Renders model parts back into a payload in the requested format.
#[must_use]
pub fn render_ld(
    data: &Map<String, Value>,
    ld_type: &str,
    ld_id: &str,
    ld_context: &[Value],
    format: DataFormat,
) -> Value {
    let mut out = data.clone();
    match format {
        DataFormat::Json => {
            out.insert("type".to_string(), json!(ld_type));
        }
        DataFormat::JsonLd => {
            out.insert("@context".to_string(), Value::Array(ld_context.to_vec()));
            out.insert("@type".to_string(), json!(ld_type));
            out.insert("@id".to_string(), json!(ld_id));
        }
    }
    Value::Object(out)
}

/// Normalizes an `@context` value to an array; the JSON-LD spec allows a
/// single string or object as shorthand for a one-element array.
fn normalize_context(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        other => vec![other],
    }
}

fn expect_string(key: &str, value: Value) -> ModelResult<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(ModelError::Data(format!(
            "'{key}' must be a string, given '{other}'"
        ))),
    }
}
