mod common;

use coalaip::{
    CoalaIp, DataFormat, EntityError, LedgerPlugin, RightsAssignment, Work,
};
use common::{
    init_tracing, manifestation_data, manifestation_data_for, plugin, user, work_data,
    ScriptedLedger,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

// ── register_manifestation ───────────────────────────────────────

#[test]
fn register_manifestation_persists_work_manifestation_and_copyright() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let result = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();

    let work = result.work.expect("a work should have been registered");
    assert!(work.persist_id().is_some());
    assert!(result.manifestation.persist_id().is_some());
    assert!(result.copyright.persist_id().is_some());

    // The manifestation references the auto-created work, which was
    // named after the manifestation.
    let manifestation_data = result.manifestation.data().unwrap();
    assert_eq!(
        manifestation_data["manifestationOfWork"],
        json!(work.persist_id().unwrap().as_str())
    );
    assert_eq!(work.data().unwrap()["name"], "The Fellowship of the Ring");

    // The copyright covers the manifestation and belongs to alice.
    let copyright_data = result.copyright.data().unwrap();
    assert_eq!(
        copyright_data["rightsOf"],
        json!(result.manifestation.persist_id().unwrap().as_str())
    );
    let owner = result.copyright.current_owner().unwrap().unwrap();
    assert!(plugin.is_same_user(&owner, &alice).unwrap());
}

#[test]
fn register_manifestation_uses_given_work_data() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let result = coalaip
        .register_manifestation(manifestation_data(), &alice, None, Some(work_data()))
        .unwrap();

    let work = result.work.unwrap();
    assert_eq!(work.data().unwrap()["name"], "Stranger in a Strange Land");
}

#[test]
fn register_manifestation_reuses_existing_work() {
    let ledger = Arc::new(ScriptedLedger::new());
    let plugin: Arc<dyn LedgerPlugin> = ledger.clone();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let work = Work::from_data(work_data(), DataFormat::JsonLd, plugin.clone()).unwrap();
    let work_id = work.persist(&alice).unwrap();
    assert_eq!(ledger.save_count(), 1);

    let result = coalaip
        .register_manifestation(manifestation_data(), &alice, Some(work), None)
        .unwrap();

    // Only the manifestation and copyright were saved on top.
    assert_eq!(ledger.save_count(), 3);
    let returned_work = result.work.unwrap();
    assert_eq!(returned_work.persist_id(), Some(&work_id));
    assert_eq!(
        result.manifestation.data().unwrap()["manifestationOfWork"],
        json!(work_id.as_str())
    );
}

#[test]
fn register_manifestation_rejects_unpersisted_existing_work() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let work = Work::from_data(work_data(), DataFormat::JsonLd, plugin).unwrap();
    let result = coalaip.register_manifestation(manifestation_data(), &alice, Some(work), None);
    assert!(matches!(result, Err(EntityError::NotYetPersisted)));
}

#[test]
fn register_manifestation_rejects_work_from_another_plugin() {
    let plugin_a = plugin();
    let plugin_b = plugin();
    let coalaip = CoalaIp::new(plugin_a.clone());
    let alice = user(&plugin_a, "alice");

    let foreign_work = Work::from_data(work_data(), DataFormat::JsonLd, plugin_b.clone()).unwrap();
    foreign_work.persist(&user(&plugin_b, "alice")).unwrap();

    let result =
        coalaip.register_manifestation(manifestation_data(), &alice, Some(foreign_work), None);
    assert!(matches!(
        result,
        Err(EntityError::IncompatiblePlugin { .. })
    ));
}

#[test]
fn register_manifestation_skips_work_when_reference_given() {
    let ledger = Arc::new(ScriptedLedger::new());
    let plugin: Arc<dyn LedgerPlugin> = ledger.clone();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let result = coalaip
        .register_manifestation(
            manifestation_data_for("already-registered-work"),
            &alice,
            None,
            None,
        )
        .unwrap();

    assert!(result.work.is_none());
    assert_eq!(ledger.save_count(), 2);
    assert_eq!(
        result.manifestation.data().unwrap()["manifestationOfWork"],
        json!("already-registered-work")
    );
}

#[test]
fn register_manifestation_failure_leaves_persisted_entities_in_place() {
    // The second save (the manifestation) fails; the work stays on the
    // ledger — multi-step workflows have no rollback.
    let ledger = Arc::new(ScriptedLedger::failing_on_save(2));
    let plugin: Arc<dyn LedgerPlugin> = ledger.clone();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let result = coalaip.register_manifestation(manifestation_data(), &alice, None, None);
    assert!(matches!(
        result,
        Err(EntityError::Ledger(coalaip::PluginError::Creation(_)))
    ));

    let saved = ledger.saved_ids();
    assert_eq!(saved.len(), 1);
    let orphaned_work = plugin.load(&saved[0]).unwrap();
    assert_eq!(orphaned_work["@type"], "AbstractWork");
}

// ── derive_right ─────────────────────────────────────────────────

#[test]
fn derive_right_from_copyright_for_its_holder() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let registration = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();
    let copyright = registration.copyright;

    let right = coalaip
        .derive_right(json!({"usages": ["play"]}), &alice, &copyright)
        .unwrap();

    assert!(right.persist_id().is_some());
    assert_eq!(
        right.data().unwrap()["allowedBy"],
        json!(copyright.persist_id().unwrap().as_str())
    );
    let owner = right.current_owner().unwrap().unwrap();
    assert!(plugin.is_same_user(&owner, &alice).unwrap());
}

#[test]
fn derive_right_rejects_non_owner() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");
    let bob = user(&plugin, "bob");

    let registration = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();

    let result = coalaip.derive_right(json!({}), &bob, &registration.copyright);
    assert!(matches!(result, Err(EntityError::Creation(_))));
}

#[test]
fn derive_right_rejects_unpersisted_source() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let unpersisted = coalaip::Right::from_data(
        json!({"rightsOf": "some-manifestation"}),
        DataFormat::JsonLd,
        plugin,
    )
    .unwrap();

    let result = coalaip.derive_right(json!({}), &alice, &unpersisted);
    assert!(matches!(result, Err(EntityError::NotYetPersisted)));
}

#[test]
fn derive_right_rejects_source_from_another_plugin() {
    let plugin_a = plugin();
    let plugin_b = plugin();
    let coalaip = CoalaIp::new(plugin_a.clone());
    let alice_b = user(&plugin_b, "alice");

    let foreign = CoalaIp::new(plugin_b.clone())
        .register_manifestation(manifestation_data(), &alice_b, None, None)
        .unwrap();

    let result = coalaip.derive_right(json!({}), &alice_b, &foreign.copyright);
    assert!(matches!(
        result,
        Err(EntityError::IncompatiblePlugin { .. })
    ));
}

#[test]
fn derive_right_enforces_usage_subset() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let registration = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();
    // A constrained right to derive from.
    let source = coalaip
        .derive_right(
            json!({"usages": ["play", "stream"]}),
            &alice,
            &registration.copyright,
        )
        .unwrap();

    // Narrower is fine.
    let narrower = coalaip.derive_right(json!({"usages": ["play"]}), &alice, &source);
    assert!(narrower.is_ok());

    // Broader is rejected.
    let broader = coalaip.derive_right(json!({"usages": ["play", "copy"]}), &alice, &source);
    assert!(matches!(broader, Err(EntityError::Creation(_))));

    // Unconstrained would be broader than a constrained source.
    let unconstrained = coalaip.derive_right(json!({}), &alice, &source);
    assert!(matches!(unconstrained, Err(EntityError::Creation(_))));
}

#[test]
fn derive_right_rejects_mismatched_allowed_by() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");

    let registration = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();

    let result = coalaip.derive_right(
        json!({"allowedBy": "some-other-right"}),
        &alice,
        &registration.copyright,
    );
    assert!(matches!(result, Err(EntityError::Creation(_))));
}

// ── transfer_right ───────────────────────────────────────────────

#[test]
fn transfer_right_moves_ownership_and_records_assignment() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");
    let bob = user(&plugin, "bob");

    let registration = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();
    let right = coalaip
        .derive_right(json!({}), &alice, &registration.copyright)
        .unwrap();

    let transfer = coalaip
        .transfer_right(right, Some(json!({"note": "gift"})), &alice, &bob)
        .unwrap();

    let owner = transfer.right.current_owner().unwrap().unwrap();
    assert!(plugin.is_same_user(&owner, &bob).unwrap());

    let history = transfer.right.history().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(
        &history[1].event_id,
        transfer.rights_assignment.persist_id().unwrap()
    );

    // The assignment is loadable from the ledger under the transfer id.
    let assignment_id = transfer.rights_assignment.persist_id().unwrap().clone();
    let rehydrated = RightsAssignment::from_persist_id(assignment_id, plugin, true).unwrap();
    assert_eq!(rehydrated.data().unwrap()["note"], "gift");
}

#[test]
fn transfer_right_rejects_non_owner() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let alice = user(&plugin, "alice");
    let bob = user(&plugin, "bob");
    let carol = user(&plugin, "carol");

    let registration = coalaip
        .register_manifestation(manifestation_data(), &alice, None, None)
        .unwrap();
    let right = coalaip
        .derive_right(json!({}), &alice, &registration.copyright)
        .unwrap();

    let result = coalaip.transfer_right(right, None, &bob, &carol);
    assert!(matches!(result, Err(EntityError::Transfer(_))));
}

// ── End-to-end ───────────────────────────────────────────────────

#[test]
fn full_registration_derivation_and_transfer_lifecycle() {
    init_tracing();
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());
    let u1 = coalaip.generate_user(json!({"name": "u1"})).unwrap();
    let u2 = coalaip.generate_user(json!({"name": "u2"})).unwrap();

    // Register: all three entities persisted, copyright held by u1.
    let registration = coalaip
        .register_manifestation(manifestation_data(), &u1, None, None)
        .unwrap();
    assert!(registration.work.as_ref().unwrap().persist_id().is_some());
    assert!(registration.manifestation.persist_id().is_some());
    assert!(registration.copyright.persist_id().is_some());
    let holder = registration.copyright.current_owner().unwrap().unwrap();
    assert!(plugin.is_same_user(&holder, &u1).unwrap());

    // Derive: u1 may derive from the copyright they hold.
    let right = coalaip
        .derive_right(json!({}), &u1, &registration.copyright)
        .unwrap();
    let holder = right.current_owner().unwrap().unwrap();
    assert!(plugin.is_same_user(&holder, &u1).unwrap());

    // Transfer: ownership moves to u2, history ends with u2.
    let transfer = coalaip.transfer_right(right, None, &u1, &u2).unwrap();
    let holder = transfer.right.current_owner().unwrap().unwrap();
    assert!(plugin.is_same_user(&holder, &u2).unwrap());
    let history = transfer.right.history().unwrap();
    assert_eq!(history.len(), 2);

    // u1 no longer holds the right and cannot derive from it.
    let result = coalaip.derive_right(json!({}), &u1, &transfer.right);
    assert!(matches!(result, Err(EntityError::Creation(_))));
}

#[test]
fn generate_user_delegates_to_the_plugin() {
    let plugin = plugin();
    let coalaip = CoalaIp::new(plugin.clone());

    let user = coalaip.generate_user(json!({"name": "alice"})).unwrap();
    assert_eq!(user.get_str("/name"), Some("alice"));
    assert!(plugin.is_same_user(&user, &user).unwrap());
}
