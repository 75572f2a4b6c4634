//! Tests for the domain views
//!
//! These tests verify:
//! - Payloads drop corrupt entries; shared states fail on them
//! - Sessions reads fail on a corrupt delta; local and uploadable actions skip it
//! - Request order and de-duplication of payload reads
//! - Namespaces stay disjoint inside each physical store
//! - Enumeration and read failures propagate

mod support;

use bincode::Options;
use feedstore::{
    ActionKind, ActionRecord, ContentId, FeedStoreError, Payload, SharedState, StoreStats,
    StructuralDelta,
};

use support::{harness, id, populate};

// =============================================================================
// Payload Tests
// =============================================================================

#[test]
fn test_payloads_returned_in_request_order() {
    let h = harness();
    populate(&h.store);

    let ids = [id("p2"), id("missing"), id("p1"), id("p2")];
    let payloads = h.store.payloads().get(&ids).unwrap();

    let returned: Vec<ContentId> = payloads.iter().map(|(id, _)| id.clone()).collect();
    assert_eq!(returned, vec![id("p2"), id("p1")]);
    assert_eq!(payloads[1].1, Payload::new("p1", b"payload one".to_vec()));
}

#[test]
fn test_corrupt_payload_dropped_but_call_succeeds() {
    let h = harness();
    populate(&h.store);
    h.content.put_raw("payload:p3", b"\xff\xff garbage");

    let payloads = h.store.payloads().get(&[id("p1"), id("p3")]).unwrap();

    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0].0, id("p1"));
}

#[test]
fn test_payload_with_mismatched_embedded_id_dropped() {
    let h = harness();
    h.store
        .edit_content()
        .upsert(
            feedstore::ContentKey::Payload(id("x")),
            bincode_of(&Payload::new("y", b"body".to_vec())),
        )
        .commit();

    assert!(h.store.payloads().get(&[id("x")]).unwrap().is_empty());
}

#[test]
fn test_get_all_payloads() {
    let h = harness();
    populate(&h.store);

    let all = h.store.payloads().get_all().unwrap();
    assert_eq!(all.len(), 2);
}

// =============================================================================
// Shared State Tests
// =============================================================================

#[test]
fn test_shared_states_all_valid() {
    let h = harness();
    populate(&h.store);

    let states = h.store.shared_states().get_all().unwrap();

    assert_eq!(
        states,
        vec![
            SharedState::new("s1", b"state one".to_vec()),
            SharedState::new("s2", b"state two".to_vec()),
        ]
    );
}

#[test]
fn test_corrupt_shared_state_fails_whole_call() {
    let h = harness();
    populate(&h.store);
    h.content.put_raw("shared-state:s3", b"\x01");

    let result = h.store.shared_states().get_all();
    assert!(matches!(result, Err(FeedStoreError::Parse { .. })));
}

#[test]
fn test_parse_policy_asymmetry() {
    let h = harness();
    populate(&h.store);
    h.content.put_raw("payload:bad", b"\x00");
    h.content.put_raw("shared-state:bad", b"\x00");

    let payloads = h.store.payloads().get(&[id("p1"), id("bad")]).unwrap();
    assert_eq!(payloads.len(), 1);

    assert!(h.store.shared_states().get_all().is_err());
}

#[test]
fn test_shared_states_enumeration_failure_propagates() {
    let h = harness();
    populate(&h.store);
    h.content.set_fail_enumeration(true);

    let result = h.store.shared_states().get_all();
    assert!(matches!(result, Err(FeedStoreError::Enumeration(_))));
}

#[test]
fn test_payload_read_failure_propagates() {
    let h = harness();
    populate(&h.store);
    h.content.set_fail_reads(true);

    assert!(h.store.payloads().get(&[id("p1")]).is_err());
}

// =============================================================================
// Semantic Properties Tests
// =============================================================================

#[test]
fn test_semantic_properties_are_opaque_bytes() {
    let h = harness();
    populate(&h.store);
    let props = h.store.semantic_properties();

    assert!(props.put(id("raw"), vec![0xff, 0x00, 0x13]).is_success());

    let values = props.get(&[id("sp1"), id("raw"), id("missing")]).unwrap();
    assert_eq!(values.len(), 2);
    assert!(values.contains(&(id("raw"), vec![0xff, 0x00, 0x13])));
    assert!(values.contains(&(id("sp1"), b"props one".to_vec())));
}

#[test]
fn test_namespaces_do_not_collide() {
    let h = harness();
    let shared = id("same");
    h.store
        .edit_content()
        .upsert_payload(&Payload::new(shared.clone(), b"p".to_vec()))
        .upsert_shared_state(&SharedState::new(shared.clone(), b"s".to_vec()))
        .upsert_semantic_properties(shared.clone(), b"m".to_vec())
        .commit();

    assert_eq!(h.store.payloads().get(&[shared.clone()]).unwrap().len(), 1);
    assert_eq!(h.store.shared_states().get_all().unwrap().len(), 1);
    assert_eq!(
        h.store.semantic_properties().get(&[shared.clone()]).unwrap(),
        vec![(shared, b"m".to_vec())]
    );
}

// =============================================================================
// Session Tests
// =============================================================================

#[test]
fn test_sessions_exclude_local_action_journals() {
    let h = harness();
    populate(&h.store);

    let mut sessions = h.store.sessions().get_all().unwrap();
    sessions.sort();

    assert_eq!(sessions, vec!["feed-a".to_string(), "feed-b".to_string()]);
}

#[test]
fn test_corrupt_session_delta_fails_read() {
    let h = harness();
    h.store
        .edit_session("s")
        .append(&StructuralDelta::upsert("a"))
        .append_raw(vec![0xee])
        .commit();

    let result = h.store.sessions().read("s");
    assert!(matches!(result, Err(FeedStoreError::Parse { .. })));
    assert!(h.store.sessions().item_order("s").is_err());
}

#[test]
fn test_item_order_replays_deltas() {
    let h = harness();
    h.store
        .edit_session("s")
        .append(&StructuralDelta::upsert("a"))
        .append(&StructuralDelta::upsert("b"))
        .append(&StructuralDelta::clear_all())
        .append(&StructuralDelta::upsert("c"))
        .append(&StructuralDelta::upsert("d"))
        .append(&StructuralDelta::upsert("c"))
        .append(&StructuralDelta::remove("d"))
        .commit();

    assert_eq!(h.store.sessions().item_order("s").unwrap(), vec![id("c")]);
    assert!(h.store.sessions().item_order("absent").unwrap().is_empty());
}

#[test]
fn test_session_enumeration_failure_propagates() {
    let h = harness();
    populate(&h.store);
    h.journals.set_fail_enumeration(true);

    assert!(h.store.sessions().get_all().is_err());
}

// =============================================================================
// Action Tests
// =============================================================================

#[test]
fn test_corrupt_local_action_skipped() {
    let h = harness();
    populate(&h.store);
    h.journals.put_raw("local-actions:dismiss", b"\x01\x02");

    let actions = h
        .store
        .local_actions()
        .get_all_of_kind(ActionKind::Dismiss)
        .unwrap();

    assert_eq!(
        actions,
        vec![(id("d1"), ActionKind::Dismiss), (id("d2"), ActionKind::Dismiss)]
    );
}

#[test]
fn test_corrupt_uploadable_action_skipped() {
    let h = harness();
    populate(&h.store);
    h.uploads.put_raw("u3", b"\x09");

    let actions = h.store.uploadable_actions().get_all().unwrap();

    assert_eq!(actions.len(), 2);
    assert!(actions.contains(&(id("u1"), ActionRecord::new(ActionKind::Dismiss, 100))));
    assert_eq!(h.store.uploadable_actions().count().unwrap(), 3);
}

// =============================================================================
// Stats Tests
// =============================================================================

#[test]
fn test_stats_count_every_namespace() {
    let h = harness();
    populate(&h.store);

    let stats = h.store.stats().unwrap();

    assert_eq!(
        stats,
        StoreStats {
            payloads: 2,
            shared_states: 2,
            semantic_properties: 2,
            sessions: 2,
            local_actions: 2,
            uploadable_actions: 2,
        }
    );
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Encode with the store's fixed-int layout, skipping the typed builders
fn bincode_of(payload: &Payload) -> Vec<u8> {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .serialize(payload)
        .unwrap()
}
