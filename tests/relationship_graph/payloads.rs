//! JSON relationship payloads.

use crate::test_utils::Harness;
use relgraph::GraphError;
use serde_json::json;

#[test]
fn collection_payload_populates_both_sides() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    h.store
        .push_relationship(
            &user,
            "pets",
            &json!({
                "data": [{ "type": "pet", "id": "1" }, { "type": "pet", "id": 2 }],
                "links": { "related": "/users/1/pets" },
                "meta": { "total": 2 }
            }),
        )
        .unwrap();
    h.store.flush();

    let (p1, p2) = (h.id("pet", "1"), h.id("pet", "2"));
    assert_eq!(h.local(&user, "pets"), vec![p1.clone(), p2.clone()]);
    assert_eq!(h.local(&p2, "owner"), vec![user.clone()]);

    let edge = h.store.graph_mut().get(&user, "pets").unwrap();
    let pets = edge.collection().unwrap();
    assert_eq!(pets.meta, Some(json!({ "total": 2 })));
    assert_eq!(
        pets.links.as_ref().and_then(|l| l.related.as_deref()),
        Some("/users/1/pets")
    );
    h.assert_reciprocal();
}

#[test]
fn lid_references_resolve_to_local_records() {
    let mut h = Harness::new();
    let pet = h.id("pet", "1");
    let user = h.store.create_record("user");
    let lid = h.store.cache().client_key_of(&user).unwrap().to_string();
    h.store
        .push_relationship(&pet, "owner", &json!({ "data": { "type": "user", "lid": lid } }))
        .unwrap();
    h.store.flush();
    assert_eq!(h.local(&pet, "owner"), vec![user.clone()]);
    assert_eq!(h.local(&user, "pets"), vec![pet]);
}

#[test]
fn stale_link_then_reload_clears_flag() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    h.store
        .push_relationship(&user, "pets", &json!({ "data": [] }))
        .unwrap();
    h.store.flush();
    h.log.clear();

    h.store
        .push_relationship(&user, "pets", &json!({ "links": { "related": "/users/1/pets?v=2" } }))
        .unwrap();
    h.store.flush();
    let state = h.store.graph_mut().edge_state(&user, "pets").unwrap().unwrap();
    assert!(state.is_stale);
    assert_eq!(h.log.count_for(&user, "pets"), 1);

    h.store
        .push_relationship(&user, "pets", &json!({ "data": [{ "type": "pet", "id": "9" }] }))
        .unwrap();
    h.store.flush();
    let state = h.store.graph_mut().edge_state(&user, "pets").unwrap().unwrap();
    assert!(!state.is_stale);
    assert!(state.has_received_data);
}

#[test]
fn failed_load_flag_resets_on_data() {
    let mut h = Harness::new();
    let pet = h.id("pet", "1");
    h.store.graph_mut().mark_load_failed(&pet, "owner").unwrap();
    h.store
        .push_relationship(&pet, "owner", &json!({ "data": null }))
        .unwrap();
    let state = h.store.graph_mut().edge_state(&pet, "owner").unwrap().unwrap();
    assert!(!state.has_failed_load_attempt);
    assert!(state.is_empty);
}

#[test]
fn malformed_payloads_are_rejected() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let err = h
        .store
        .push_relationship(&user, "pets", &json!({ "data": "nope" }))
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidPayload(_)));

    let err = h
        .store
        .push_relationship(&user, "pets", &json!({ "data": [{ "type": "pet", "lid": "@lid:missing" }] }))
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidPayload(_)));

    let err = h
        .store
        .push_relationship(&user, "pets", &json!({ "data": { "type": "pet", "id": "1" } }))
        .unwrap_err();
    assert!(matches!(err, GraphError::InvalidPayload(_)));
}
