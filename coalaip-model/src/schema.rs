//! Validation schemas for COALA IP entity models.
//!
//! Each entity variant declares one schema; a schema pins the entity's
//! linked-data type (strictly or as an overridable default) and validates
//! the model data's required fields and cross-reference keys.

use crate::{ModelError, ModelResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Well-known field names in entity model data.
pub mod fields {
    /// Human-readable name of a creation (required on works and
    /// manifestations).
    pub const NAME: &str = "name";
    /// Persist id of the work a manifestation expresses.
    pub const MANIFESTATION_OF_WORK: &str = "manifestationOfWork";
    /// Marker distinguishing manifestations from abstract works.
    pub const IS_MANIFESTATION: &str = "isManifestation";
    /// Persist id of the manifestation (or work) a right covers in full.
    pub const RIGHTS_OF: &str = "rightsOf";
    /// Persist id of the source right a derived right is allowed by.
    pub const ALLOWED_BY: &str = "allowedBy";
    /// Allowed-usage constraints carried by a right.
    pub const USAGES: &str = "usages";
}

/// The validation schema of an entity variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSchema {
    Work,
    Manifestation,
    Right,
    Copyright,
    RightsAssignment,
}

impl ModelSchema {
    /// The linked-data type this schema pins exactly, if any.
    ///
    /// Works, copyrights, and rights assignments have fixed types; giving
    /// a different `@type` for them is a data error.
    #[must_use]
    pub fn strict_ld_type(&self) -> Option<&'static str> {
        match self {
            Self::Work => Some("AbstractWork"),
            Self::Copyright => Some("Copyright"),
            Self::RightsAssignment => Some("RightsTransferAction"),
            Self::Manifestation | Self::Right => None,
        }
    }

    /// The linked-data type used when the data does not carry one.
    #[must_use]
    pub fn default_ld_type(&self) -> &'static str {
        match self {
            Self::Work => "AbstractWork",
            Self::Manifestation => "CreativeWork",
            Self::Right => "Right",
            Self::Copyright => "Copyright",
            Self::RightsAssignment => "RightsTransferAction",
        }
    }

    /// Resolves the linked-data type for this schema against a type given
    /// in the data, enforcing strictness.
    pub fn resolve_ld_type(&self, given: Option<&str>) -> ModelResult<String> {
        match (self.strict_ld_type(), given) {
            (Some(strict), Some(given)) if given != strict => Err(ModelError::Data(format!(
                "{self:?} models must be of type '{strict}', given '{given}'"
            ))),
            (_, Some(given)) => Ok(given.to_string()),
            (_, None) => Ok(self.default_ld_type().to_string()),
        }
    }

    /// Validates model data against this schema. Side-effect-free.
    pub fn validate(&self, data: &Map<String, Value>) -> ModelResult<()> {
        match self {
            Self::Work => validate_work(data),
            Self::Manifestation => validate_manifestation(data),
            Self::Right => validate_right(data),
            Self::Copyright => validate_copyright(data),
            Self::RightsAssignment => Ok(()),
        }
    }
}

/// Creation models (works, manifestations) must carry a string `name`.
fn validate_creation(data: &Map<String, Value>, schema: ModelSchema) -> ModelResult<()> {
    match data.get(fields::NAME) {
        Some(Value::String(_)) => Ok(()),
        other => Err(ModelError::Data(format!(
            "'{}' must be given as a string on a {schema:?}, given '{}'",
            fields::NAME,
            display_opt(other),
        ))),
    }
}

fn validate_work(data: &Map<String, Value>) -> ModelResult<()> {
    validate_creation(data, ModelSchema::Work)?;

    if data.contains_key(fields::MANIFESTATION_OF_WORK) {
        return Err(ModelError::Data(format!(
            "'{}' must not be given on a Work",
            fields::MANIFESTATION_OF_WORK
        )));
    }
    match data.get(fields::IS_MANIFESTATION) {
        None | Some(Value::Bool(false)) => Ok(()),
        other => Err(ModelError::Data(format!(
            "'{}' must be false if given on a Work, given '{}'",
            fields::IS_MANIFESTATION,
            display_opt(other),
        ))),
    }
}

fn validate_manifestation(data: &Map<String, Value>) -> ModelResult<()> {
    validate_creation(data, ModelSchema::Manifestation)?;

    match data.get(fields::MANIFESTATION_OF_WORK) {
        Some(Value::String(work_id)) if !work_id.is_empty() => {}
        other => {
            return Err(ModelError::Data(format!(
                "'{}' must be given as a non-empty string on a Manifestation, given '{}'",
                fields::MANIFESTATION_OF_WORK,
                display_opt(other),
            )))
        }
    }
    match data.get(fields::IS_MANIFESTATION) {
        None | Some(Value::Bool(true)) => Ok(()),
        other => Err(ModelError::Data(format!(
            "'{}' must be true if given on a Manifestation, given '{}'",
            fields::IS_MANIFESTATION,
            display_opt(other),
        ))),
    }
}

/// Rights carry exactly one of `rightsOf` (full rights to a creation) or
/// `allowedBy` (derived from a source right), both as strings. An
/// optional `usages` constraint must be an array of strings.
fn validate_right(data: &Map<String, Value>) -> ModelResult<()> {
    let rights_of = validate_optional_ref(data, fields::RIGHTS_OF)?;
    let allowed_by = validate_optional_ref(data, fields::ALLOWED_BY)?;

    if rights_of.is_some() == allowed_by.is_some() {
        return Err(ModelError::Data(format!(
            "one and only one of '{}' or '{}' must be given on a Right",
            fields::RIGHTS_OF,
            fields::ALLOWED_BY,
        )));
    }

    match data.get(fields::USAGES) {
        None => Ok(()),
        Some(Value::Array(items)) if items.iter().all(Value::is_string) => Ok(()),
        other => Err(ModelError::Data(format!(
            "'{}' must be an array of strings if given on a Right, given '{}'",
            fields::USAGES,
            display_opt(other),
        ))),
    }
}

fn validate_copyright(data: &Map<String, Value>) -> ModelResult<()> {
    validate_right(data)?;

    if data.contains_key(fields::ALLOWED_BY) {
        return Err(ModelError::Data(format!(
            "'{}' must not be given on a Copyright",
            fields::ALLOWED_BY
        )));
    }
    Ok(())
}

fn validate_optional_ref<'a>(
    data: &'a Map<String, Value>,
    key: &str,
) -> ModelResult<Option<&'a str>> {
    match data.get(key) {
        None => Ok(None),
        Some(Value::String(id)) if !id.is_empty() => Ok(Some(id)),
        other => Err(ModelError::Data(format!(
            "'{key}' must be given as a non-empty string, given '{}'",
            display_opt(other),
        ))),
    }
}

fn display_opt(value: Option<&Value>) -> String {
    value.map_or_else(|| "nothing".to_string(), Value::to_string)
}
