//! Abstract related types.

use crate::test_utils::Harness;
use relgraph::{GraphError, Operation};

#[test]
fn implementers_share_the_inverse() {
    let mut h = Harness::new();
    let (c1, c2) = (h.id("comment", "1"), h.id("comment", "2"));
    let (post, video) = (h.id("post", "1"), h.id("video", "1"));

    h.store
        .push(Operation::replace_related_record(&c1, "commentable", Some(post.clone())), false)
        .unwrap();
    h.store
        .push(Operation::replace_related_record(&c2, "commentable", Some(video.clone())), false)
        .unwrap();

    assert_eq!(h.local(&post, "comments"), vec![c1.clone()]);
    assert_eq!(h.local(&video, "comments"), vec![c2.clone()]);
    h.assert_reciprocal();

    h.store
        .push(Operation::add_to_related_records(&video, "comments", vec![c1.clone()]), false)
        .unwrap();
    assert_eq!(h.local(&c1, "commentable"), vec![video.clone()]);
    assert!(h.local(&post, "comments").is_empty());
    assert_eq!(h.local(&video, "comments"), vec![c2, c1]);
    h.assert_reciprocal();
}

#[test]
fn non_implementer_is_rejected() {
    let mut h = Harness::new();
    let (comment, user) = (h.id("comment", "1"), h.id("user", "1"));
    let err = h
        .store
        .push(Operation::replace_related_record(&comment, "commentable", Some(user)), false)
        .unwrap_err();
    assert!(matches!(err, GraphError::IncompatibleType { .. }));
    assert!(h.local(&comment, "commentable").is_empty());
}

#[test]
fn remote_payload_with_implementer() {
    let mut h = Harness::new();
    let comment = h.id("comment", "1");
    h.store
        .push_relationship(
            &comment,
            "commentable",
            &serde_json::json!({ "data": { "type": "video", "id": "3" } }),
        )
        .unwrap();
    h.store.flush();
    let video = h.id("video", "3");
    assert_eq!(h.local(&video, "comments"), vec![comment]);
}

#[test]
fn trust_mode_accepts_non_implementer() {
    use crate::test_utils::schema;
    use relgraph::{AssertionMode, GraphOptions, NotificationLog, Store};

    let options = GraphOptions::new().assertions(AssertionMode::Trust);
    let mut store = Store::with_options(schema(), NotificationLog::new(), options);
    let (comment, user) = (store.identifier("comment", "1"), store.identifier("user", "1"));
    store
        .push(Operation::replace_related_record(&comment, "commentable", Some(user.clone())), false)
        .unwrap();
    assert_eq!(store.graph_mut().local_state(&user, "comments").unwrap(), vec![comment]);
}
