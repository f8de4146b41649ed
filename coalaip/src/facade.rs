//! High-level workflows for registering, deriving, and transferring
//! rights, bound to one persistence plugin.
//!
//! Every workflow is a sequence of independent ledger calls with no
//! cross-call atomicity: a failure part-way through leaves the already
//! persisted entities in place (no rollback) and propagates immediately.
//! Callers re-attempt multi-step workflows themselves; the core neither
//! retries nor confirms that an accepted write has settled.

use crate::entity::{
    Copyright, Entity, EntityKind, Manifestation, Right, RightsAssignment, Transferrable, Work,
};
use crate::{EntityError, EntityResult};
use coalaip_model::{fields, DataFormat, ModelError};
use coalaip_plugin::LedgerPlugin;
use coalaip_types::UserRef;
use serde_json::{json, Map, Value};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// The entities minted by [`CoalaIp::register_manifestation`].
#[derive(Debug)]
pub struct RegistrationResult {
    /// The copyright assigned to the registration's holder.
    pub copyright: Copyright,
    /// The registered manifestation.
    pub manifestation: Manifestation,
    /// The work the manifestation expresses: the auto-created or given
    /// one, or `None` when the manifestation data already referenced a
    /// work by id.
    pub work: Option<Work>,
}

/// The entities involved in a completed [`CoalaIp::transfer_right`].
#[derive(Debug)]
pub struct TransferResult<K: Transferrable> {
    /// The transferred right; its `current_owner` now resolves to the
    /// new holder.
    pub right: Entity<K>,
    /// The assignment recording the transfer, persisted under the
    /// transfer action's id.
    pub rights_assignment: RightsAssignment,
}

/// High-level, plugin-bound COALA IP functions.
///
/// Constructed with the one plugin instance all entities it creates will
/// share; entities made elsewhere must be bound to the same instance or
/// the facade rejects them with [`EntityError::IncompatiblePlugin`].
pub struct CoalaIp {
    plugin: Arc<dyn LedgerPlugin>,
}

impl CoalaIp {
    /// Creates a facade bound to the given plugin.
    #[must_use]
    pub fn new(plugin: Arc<dyn LedgerPlugin>) -> Self {
        Self { plugin }
    }

    /// The plugin this facade is bound to.
    #[must_use]
    pub fn plugin(&self) -> &Arc<dyn LedgerPlugin> {
        &self.plugin
    }

    /// Generates a new user on the backing persistence layer.
    pub fn generate_user(&self, params: Value) -> EntityResult<UserRef> {
        Ok(self.plugin.generate_user(params)?)
    }

    /// Registers a manifestation and assigns its copyright to
    /// `copyright_holder`.
    ///
    /// Unless `manifestation_data` already carries a `manifestationOfWork`
    /// reference, a work is registered too: the given `existing_work` (an
    /// already persisted entity, handed back in the result), or a new one
    /// built from `work_data`, or failing that from the manifestation's
    /// name alone.
    ///
    /// Three independent ledger writes; the first failure propagates and
    /// whatever was already persisted stays persisted.
    pub fn register_manifestation(
        &self,
        manifestation_data: Value,
        copyright_holder: &UserRef,
        existing_work: Option<Work>,
        work_data: Option<Value>,
    ) -> EntityResult<RegistrationResult> {
        let Value::Object(mut manifestation_data) = manifestation_data else {
            return Err(
                ModelError::Data("manifestation data must be a JSON object".to_string()).into(),
            );
        };

        let has_work_ref = matches!(
            manifestation_data.get(fields::MANIFESTATION_OF_WORK),
            Some(Value::String(id)) if !id.is_empty()
        );

        let work = if has_work_ref {
            None
        } else {
            let (work, work_id) = match existing_work {
                Some(work) => {
                    let work_id = work
                        .persist_id()
                        .cloned()
                        .ok_or(EntityError::NotYetPersisted)?;
                    self.check_bound(&work)?;
                    (work, work_id)
                }
                None => {
                    let data = work_data.unwrap_or_else(|| {
                        let mut data = Map::new();
                        data.insert(
                            fields::NAME.to_string(),
                            manifestation_data
                                .get(fields::NAME)
                                .cloned()
                                .unwrap_or(Value::Null),
                        );
                        Value::Object(data)
                    });
                    let work =
                        Work::from_data(data, DataFormat::JsonLd, Arc::clone(&self.plugin))?;
                    let work_id = work.persist(copyright_holder)?;
                    debug!(%work_id, "registered work");
                    (work, work_id)
                }
            };
            manifestation_data.insert(
                fields::MANIFESTATION_OF_WORK.to_string(),
                json!(work_id.as_str()),
            );
            Some(work)
        };

        let manifestation = Manifestation::from_data(
            Value::Object(manifestation_data),
            DataFormat::JsonLd,
            Arc::clone(&self.plugin),
        )?;
        let manifestation_id = manifestation.persist(copyright_holder)?;
        debug!(%manifestation_id, "registered manifestation");

        let mut copyright_data = Map::new();
        copyright_data.insert(fields::RIGHTS_OF.to_string(), json!(manifestation_id.as_str()));
        let copyright = Copyright::from_data(
            Value::Object(copyright_data),
            DataFormat::JsonLd,
            Arc::clone(&self.plugin),
        )?;
        let copyright_id = copyright.persist(copyright_holder)?;
        info!(%manifestation_id, %copyright_id, "manifestation registered with copyright");

        Ok(RegistrationResult {
            copyright,
            manifestation,
            work,
        })
    }

    /// Derives a new [`Right`] from `source_right` (a right or copyright)
    /// for its current holder.
    ///
    /// Requires the source to be persisted on this facade's plugin,
    /// `current_holder` to be the source's current owner, and the derived
    /// right's `usages` to stay within the source's (when the source
    /// declares any). Violations fail with [`EntityError::Creation`].
    pub fn derive_right<K: Transferrable>(
        &self,
        right_data: Value,
        current_holder: &UserRef,
        source_right: &Entity<K>,
    ) -> EntityResult<Right> {
        let Value::Object(mut right_data) = right_data else {
            return Err(ModelError::Data("right data must be a JSON object".to_string()).into());
        };

        let source_id = source_right
            .persist_id()
            .cloned()
            .ok_or(EntityError::NotYetPersisted)?;
        self.check_bound(source_right)?;

        if let Some(allowed_by) = right_data.get(fields::ALLOWED_BY) {
            if allowed_by.as_str() != Some(source_id.as_str()) {
                return Err(EntityError::Creation(format!(
                    "'{}' ('{allowed_by}') does not reference the given source right '{source_id}'",
                    fields::ALLOWED_BY,
                )));
            }
        }

        let owner = source_right.current_owner()?.ok_or_else(|| {
            EntityError::Creation(format!(
                "source right '{source_id}' has no ownership history"
            ))
        })?;
        if !self.plugin.is_same_user(current_holder, &owner)? {
            return Err(EntityError::Creation(
                "current holder is not the source right's current owner".to_string(),
            ));
        }

        // A derived right must not be broader than its source: when the
        // source constrains usages, the derived right must declare a
        // subset of them.
        let source_data = source_right.data()?;
        if let Some(source_usages) = usage_set(source_data.get(fields::USAGES)) {
            match usage_set(right_data.get(fields::USAGES)) {
                Some(derived_usages) if derived_usages.is_subset(&source_usages) => {}
                _ => {
                    return Err(EntityError::Creation(format!(
                        "derived right's '{}' must be a subset of the source right's",
                        fields::USAGES,
                    )))
                }
            }
        }

        right_data.insert(fields::ALLOWED_BY.to_string(), json!(source_id.as_str()));
        let right = Right::from_data(
            Value::Object(right_data),
            DataFormat::JsonLd,
            Arc::clone(&self.plugin),
        )?;
        let right_id = right.persist(current_holder)?;
        info!(%right_id, %source_id, "derived right");
        Ok(right)
    }

    /// Transfers a right to a new holder.
    ///
    /// Requires the right to be persisted on this facade's plugin and
    /// `current_holder` to be its current owner
    /// ([`EntityError::Transfer`] otherwise). The transfer is recorded as
    /// a [`RightsAssignment`] built from `rights_assignment_data` and
    /// persisted by the ledger under the transfer action's id.
    pub fn transfer_right<K: Transferrable>(
        &self,
        right: Entity<K>,
        rights_assignment_data: Option<Value>,
        current_holder: &UserRef,
        to: &UserRef,
    ) -> EntityResult<TransferResult<K>> {
        let right_id = right
            .persist_id()
            .cloned()
            .ok_or(EntityError::NotYetPersisted)?;
        self.check_bound(&right)?;

        let owner = right.current_owner()?.ok_or_else(|| {
            EntityError::Transfer(format!("right '{right_id}' has no ownership history"))
        })?;
        if !self.plugin.is_same_user(current_holder, &owner)? {
            return Err(EntityError::Transfer(
                "current holder is not the right's current owner".to_string(),
            ));
        }

        let rights_assignment = RightsAssignment::from_data(
            rights_assignment_data.unwrap_or_else(|| json!({})),
            DataFormat::JsonLd,
            Arc::clone(&self.plugin),
        )?;
        let transfer_payload = rights_assignment.to_jsonld()?;
        let transfer_id = right.transfer(transfer_payload, current_holder, to)?;
        rights_assignment.record_transfer_id(transfer_id.clone());
        info!(%right_id, %transfer_id, "transferred right");

        Ok(TransferResult {
            right,
            rights_assignment,
        })
    }

    fn check_bound<K: EntityKind>(&self, entity: &Entity<K>) -> EntityResult<()> {
        if Arc::ptr_eq(&self.plugin, entity.plugin()) {
            Ok(())
        } else {
            Err(EntityError::IncompatiblePlugin {
                facade_plugin: self.plugin.name().to_string(),
                entity_plugin: entity.plugin().name().to_string(),
            })
        }
    }
}

/// Reads an optional `usages` constraint as a set; `None` when the value
/// is absent or not an array of strings.
fn usage_set(value: Option<&Value>) -> Option<HashSet<String>> {
    match value {
        Some(Value::Array(items)) => Some(
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
        ),
        _ => None,
    }
}
