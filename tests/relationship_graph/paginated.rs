//! Paginated collection edges.

use crate::test_utils::Harness;
use relgraph::{Edge, Operation};

#[test]
fn local_add_then_page_load_is_not_duplicated() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (p1, p2, p3) = (h.id("post", "1"), h.id("post", "2"), h.id("post", "3"));
    h.store
        .push(Operation::update_page(&user, "posts", "1", vec![p1.clone(), p2.clone()]), true)
        .unwrap();
    h.store.flush();

    h.store
        .push(Operation::add_to_related_records(&user, "posts", vec![p3.clone()]), false)
        .unwrap();
    assert_eq!(h.local(&user, "posts"), vec![p1.clone(), p2.clone(), p3.clone()]);
    h.log.clear();

    h.store
        .push(Operation::update_page(&user, "posts", "2", vec![p3.clone()]), true)
        .unwrap();
    h.store.flush();

    let local = h.local(&user, "posts");
    assert_eq!(local, vec![p1, p2, p3.clone()]);
    assert_eq!(h.log.count_for(&user, "posts"), 0);
    let edge = h.store.graph_mut().get(&user, "posts").unwrap();
    let Edge::Paginated(paginated) = edge else {
        panic!("posts should be paginated");
    };
    assert!(paginated.inner.additions().is_none());
    assert_eq!(paginated.page("2").unwrap().members, vec![p3]);
    h.assert_reciprocal();
}

#[test]
fn full_replace_collapses_pages() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (p1, p2) = (h.id("post", "1"), h.id("post", "2"));
    h.store
        .push(Operation::update_page(&user, "posts", "1", vec![p1.clone()]), true)
        .unwrap();
    h.store
        .push(Operation::replace_related_records(&user, "posts", vec![p2.clone()]), true)
        .unwrap();
    h.store.flush();

    assert_eq!(h.local(&user, "posts"), vec![p2.clone()]);
    assert!(h.local(&p1, "author").is_empty());
    let Edge::Paginated(paginated) = h.store.graph_mut().get(&user, "posts").unwrap() else {
        panic!("posts should be paginated");
    };
    assert!(paginated.pages().is_empty());
    assert_eq!(paginated.unpaged().to_vec(), vec![p2]);
}

#[test]
fn page_reload_drops_missing_members() {
    let mut h = Harness::new();
    let user = h.id("user", "1");
    let (p1, p2) = (h.id("post", "1"), h.id("post", "2"));
    h.store
        .push(Operation::update_page(&user, "posts", "1", vec![p1.clone(), p2.clone()]), true)
        .unwrap();
    h.store.flush();
    h.log.clear();

    h.store
        .push(Operation::update_page(&user, "posts", "1", vec![p2.clone()]), true)
        .unwrap();
    h.store.flush();
    assert_eq!(h.local(&user, "posts"), vec![p2]);
    assert!(h.local(&p1, "author").is_empty());
    assert_eq!(h.log.count_for(&user, "posts"), 1);
    assert_eq!(h.log.count_for(&p1, "author"), 1);
    h.assert_reciprocal();
}
