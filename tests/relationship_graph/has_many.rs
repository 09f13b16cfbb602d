//! hasMany edges.

use crate::test_utils::Harness;
use relgraph::Operation;

#[test]
fn reorder_only_remote_replace_notifies() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (x, y, z) = (h.id("pet", "x"), h.id("pet", "y"), h.id("pet", "z"));
    h.store
        .push(
            Operation::replace_related_records(&user, "pets", vec![x.clone(), y.clone(), z.clone()]),
            true,
        )
        .unwrap();
    h.store.flush();
    h.log.clear();

    h.store
        .push(
            Operation::replace_related_records(&user, "pets", vec![z.clone(), y.clone(), x.clone()]),
            true,
        )
        .unwrap();
    let summary = h.store.flush();

    assert_eq!(h.remote(&user, "pets"), vec![z.clone(), y.clone(), x.clone()]);
    assert_eq!(h.local(&user, "pets"), vec![z, y, x]);
    assert_eq!(summary.notified, 1);
    assert_eq!(h.log.count_for(&user, "pets"), 1);
}

#[test]
fn local_replace_sets_order_and_position() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (x, y, z, w) = (h.id("pet", "x"), h.id("pet", "y"), h.id("pet", "z"), h.id("pet", "w"));
    h.store
        .push(
            Operation::replace_related_records(&user, "pets", vec![x.clone(), y.clone(), z.clone()]),
            true,
        )
        .unwrap();
    h.store.flush();
    h.log.clear();

    h.store
        .push(
            Operation::replace_related_records(&user, "pets", vec![z.clone(), y.clone(), x.clone()]),
            false,
        )
        .unwrap();
    assert_eq!(h.local(&user, "pets"), vec![z.clone(), y.clone(), x.clone()]);
    assert_eq!(h.log.count_for(&user, "pets"), 1);

    h.store
        .push(
            Operation::replace_related_records(&user, "pets", vec![w.clone(), z.clone(), x.clone()]),
            false,
        )
        .unwrap();
    assert_eq!(h.local(&user, "pets"), vec![w.clone(), z, x]);
    assert!(h.local(&y, "owner").is_empty());
    assert_eq!(h.local(&w, "owner"), vec![user]);
    h.assert_reciprocal();
}

#[test]
fn local_addition_survives_unrelated_flush() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (x, y, z) = (h.id("pet", "x"), h.id("pet", "y"), h.id("pet", "z"));
    h.store
        .push(Operation::replace_related_records(&user, "pets", vec![x.clone()]), true)
        .unwrap();
    h.store.flush();
    h.store
        .push(Operation::add_to_related_records(&user, "pets", vec![y.clone()]), false)
        .unwrap();

    h.store
        .push(Operation::add_to_related_records(&user, "pets", vec![z.clone()]), true)
        .unwrap();
    h.store.flush();
    assert_eq!(h.local(&user, "pets"), vec![x, z, y.clone()]);
    assert_eq!(h.local(&y, "owner"), vec![user]);
    h.assert_reciprocal();
}

#[test]
fn many_remote_operations_notify_once_per_edge() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let pets: Vec<_> = (0..20).map(|i| h.id("pet", &i.to_string())).collect();
    for pet in &pets {
        h.store
            .push(Operation::replace_related_record(pet, "owner", Some(user.clone())), true)
            .unwrap();
    }
    assert!(h.log.is_empty());
    h.store.flush();
    assert_eq!(h.log.count_for(&user, "pets"), 1);
    assert_eq!(h.local(&user, "pets"), pets);
}

#[test]
fn remove_absent_is_idempotent() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (x, y) = (h.id("pet", "x"), h.id("pet", "y"));
    h.store
        .push(Operation::replace_related_records(&user, "pets", vec![x.clone()]), true)
        .unwrap();
    h.store.flush();
    h.log.clear();
    let before = h.store.graph_mut().snapshot();

    h.store
        .push(Operation::remove_from_related_records(&user, "pets", vec![y.clone()]), false)
        .unwrap();
    h.store
        .push(Operation::remove_from_related_records(&user, "pets", vec![y]), true)
        .unwrap();
    h.store.flush();
    assert!(h.log.is_empty());
    assert_eq!(h.store.graph_mut().snapshot(), before);
}

#[test]
fn schema_less_inverse_is_tracked_implicitly() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let pet = h.id("pet", "1");
    h.store
        .push(Operation::add_to_related_records(&user, "favorites", vec![pet.clone()]), false)
        .unwrap();
    assert_eq!(h.local(&pet, "implicit-user:favorites"), vec![user.clone()]);
    assert_eq!(h.log.len(), 1);
    assert_eq!(h.log.count_for(&user, "favorites"), 1);
}

#[test]
fn keep_local_policy_preserves_pending_removal() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (a, b) = (h.id("tag", "a"), h.id("tag", "b"));
    h.store
        .push(Operation::replace_related_records(&user, "tags", vec![a.clone(), b.clone()]), true)
        .unwrap();
    h.store.flush();
    h.store
        .push(Operation::remove_from_related_records(&user, "tags", vec![a.clone()]), false)
        .unwrap();

    h.store
        .push(Operation::replace_related_records(&user, "tags", vec![b.clone(), a.clone()]), true)
        .unwrap();
    h.store.flush();
    assert_eq!(h.local(&user, "tags"), vec![b]);
    assert!(h.local(&a, "users").is_empty());
}
