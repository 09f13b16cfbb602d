//! Unload, merge and commit of client-created records.

use crate::test_utils::Harness;
use relgraph::Operation;

#[test]
fn unload_scrubs_schema_less_belongs_to() {
    let mut h = Harness::new();
    let (user, company) = (h.id("user", "1"), h.id("company", "1"));
    h.store
        .push(Operation::replace_related_record(&user, "company", Some(company.clone())), true)
        .unwrap();
    h.store.flush();
    h.log.clear();

    h.store.unload_record(&company);
    assert!(h.local(&user, "company").is_empty());
    assert!(h.remote(&user, "company").is_empty());
    assert_eq!(h.log.count_for(&user, "company"), 1);
    assert!(h.store.cache().peek("company", "1").is_none());
}

#[test]
fn unload_scrubs_schema_less_collection() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (a, b) = (h.id("pet", "a"), h.id("pet", "b"));
    h.store
        .push(Operation::replace_related_records(&user, "favorites", vec![a.clone(), b.clone()]), true)
        .unwrap();
    h.store.flush();

    h.store.unload_record(&a);
    assert_eq!(h.local(&user, "favorites"), vec![b.clone()]);
    assert_eq!(h.remote(&user, "favorites"), vec![b]);
}

#[test]
fn unload_owner_detaches_members() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (a, b) = (h.id("pet", "a"), h.id("pet", "b"));
    h.store
        .push(Operation::replace_related_records(&user, "pets", vec![a.clone()]), true)
        .unwrap();
    h.store.flush();
    h.store
        .push(Operation::add_to_related_records(&user, "pets", vec![b.clone()]), false)
        .unwrap();
    h.log.clear();

    h.store.unload_record(&user);
    assert!(!h.store.graph().contains_identifier(&user));
    assert!(h.local(&a, "owner").is_empty());
    assert!(h.local(&b, "owner").is_empty());
    assert_eq!(h.log.count_for(&a, "owner"), 1);
    assert_eq!(h.log.count_for(&b, "owner"), 1);
}

#[test]
fn committed_record_merges_in_place() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (a, c) = (h.id("pet", "a"), h.id("pet", "c"));
    let known = h.id("pet", "b");
    let temp = h.store.create_record("pet");
    h.store
        .push(
            Operation::replace_related_records(&user, "pets", vec![a.clone(), temp.clone(), c.clone()]),
            false,
        )
        .unwrap();

    let survivor = h.store.commit_created(&temp, "b").unwrap();
    assert_eq!(survivor, known);
    assert_eq!(h.local(&user, "pets"), vec![a, known.clone(), c]);
    assert_eq!(h.local(&known, "owner"), vec![user]);
    assert!(!h.store.graph().contains_identifier(&temp));
    assert!(h.store.cache().client_key_of(&temp).is_none());
    h.assert_reciprocal();
}

#[test]
fn commit_collision_keeps_server_state() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    h.store
        .push_relationship(&user, "pets", &serde_json::json!({ "data": [{ "type": "pet", "id": "5" }] }))
        .unwrap();
    h.store.flush();
    let known = h.id("pet", "5");

    let temp = h.store.create_record("pet");
    h.store
        .push(Operation::add_to_related_records(&user, "pets", vec![temp.clone()]), false)
        .unwrap();
    assert_eq!(h.local(&user, "pets"), vec![known.clone(), temp.clone()]);
    h.log.clear();

    let survivor = h.store.commit_created(&temp, "5").unwrap();
    assert_eq!(survivor, known);
    assert_eq!(h.local(&user, "pets"), vec![known]);
    assert_eq!(h.log.count_for(&user, "pets"), 1);
    h.assert_reciprocal();
}

#[test]
fn commit_without_collision_clears_new_flag() {
    let mut h = Harness::new();
    let temp = h.store.create_record("pet");
    assert!(h.store.graph().is_new(&temp));
    let survivor = h.store.commit_created(&temp, "42").unwrap();
    assert_eq!(survivor, temp);
    assert!(!h.store.graph().is_new(&temp));
    assert_eq!(h.store.cache().peek("pet", "42"), Some(temp));
}
