//! belongsTo edges.

use crate::test_utils::Harness;
use relgraph::{GraphError, Operation};

#[test]
fn best_friend_reciprocal_swap() {
    let mut h = Harness::new();
    let (a, b, c) = (h.id("user", "a"), h.id("user", "b"), h.id("user", "c"));
    h.store
        .push(Operation::replace_related_record(&a, "bestFriend", Some(b.clone())), false)
        .unwrap();
    assert_eq!(h.local(&b, "bestFriend"), vec![a.clone()]);
    h.log.clear();

    h.store
        .push(Operation::replace_related_record(&a, "bestFriend", Some(c.clone())), false)
        .unwrap();

    assert_eq!(h.local(&a, "bestFriend"), vec![c.clone()]);
    assert!(h.local(&b, "bestFriend").is_empty());
    assert_eq!(h.local(&c, "bestFriend"), vec![a.clone()]);
    assert_eq!(h.log.len(), 3);
    for id in [&a, &b, &c] {
        assert_eq!(h.log.count_for(id, "bestFriend"), 1);
    }
    h.assert_reciprocal();
}

#[test]
fn displaced_occupant_is_detached() {
    let mut h = Harness::new();
    let (a, b, c) = (h.id("user", "a"), h.id("user", "b"), h.id("user", "c"));
    h.store
        .push(Operation::replace_related_record(&a, "bestFriend", Some(b.clone())), false)
        .unwrap();
    h.store
        .push(Operation::replace_related_record(&c, "bestFriend", Some(b.clone())), false)
        .unwrap();
    assert!(h.local(&a, "bestFriend").is_empty());
    assert_eq!(h.local(&b, "bestFriend"), vec![c.clone()]);
    assert_eq!(h.local(&c, "bestFriend"), vec![b]);
    h.assert_reciprocal();
}

#[test]
fn remote_value_matching_local_edit_is_quiet() {
    let mut h = Harness::new();
    let (pet, user) = (h.id("pet", "1"), h.id("user", "1"));
    h.store
        .push(Operation::replace_related_record(&pet, "owner", Some(user.clone())), false)
        .unwrap();
    h.log.clear();

    h.store
        .push(Operation::replace_related_record(&pet, "owner", Some(user.clone())), true)
        .unwrap();
    h.store.flush();
    assert_eq!(h.local(&pet, "owner"), vec![user.clone()]);
    assert_eq!(h.remote(&pet, "owner"), vec![user.clone()]);
    assert_eq!(h.log.count_for(&pet, "owner"), 0);
    assert_eq!(h.log.count_for(&user, "pets"), 0);
    h.assert_reciprocal();
}

#[test]
fn clearing_notifies_both_sides() {
    let mut h = Harness::new();
    let (pet, user) = (h.id("pet", "1"), h.id("user", "1"));
    h.store
        .push(Operation::replace_related_record(&pet, "owner", Some(user.clone())), true)
        .unwrap();
    h.store.flush();
    h.log.clear();

    h.store
        .push(Operation::replace_related_record(&pet, "owner", None), false)
        .unwrap();
    assert!(h.local(&pet, "owner").is_empty());
    assert!(h.local(&user, "pets").is_empty());
    assert_eq!(h.remote(&user, "pets"), vec![pet.clone()]);
    assert_eq!(h.log.count_for(&pet, "owner"), 1);
    assert_eq!(h.log.count_for(&user, "pets"), 1);
}

#[test]
fn unknown_field_is_an_error() {
    let mut h = Harness::new();
    let pet = h.id("pet", "1");
    let err = h
        .store
        .push(Operation::replace_related_record(&pet, "vet", None), false)
        .unwrap_err();
    assert!(matches!(err, GraphError::UnknownField { .. }));
    assert!(err.is_usage_error());
}
