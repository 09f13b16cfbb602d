//! Shared schema and setup.

use relgraph::{
    GraphOptions, Identifier, NotificationLog, RelationshipSchema as R, Schema, Store,
};

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub fn schema() -> Schema {
    Schema::new()
        .with_type(
            "user",
            vec![
                R::belongs_to("bestFriend", "user").inverse("bestFriend"),
                R::has_many("pets", "pet").inverse("owner"),
                R::collection("posts", "post").inverse("author"),
                R::has_many("favorites", "pet"),
                R::belongs_to("company", "company"),
                R::has_many("tags", "tag").inverse("users").keep_local_on_remote_update(),
            ],
        )
        .with_type("pet", vec![R::belongs_to("owner", "user").inverse("pets")])
        .with_type(
            "post",
            vec![
                R::belongs_to("author", "user").inverse("posts"),
                R::has_many("comments", "comment")
                    .inverse("commentable")
                    .implements("commentable"),
            ],
        )
        .with_type("tag", vec![R::has_many("users", "user").inverse("tags")])
        .with_type(
            "comment",
            vec![R::belongs_to("commentable", "commentable")
                .polymorphic()
                .inverse("comments")],
        )
        .with_type("company", vec![])
        .with_type("video", vec![])
        .with_trait("video", "commentable")
}

pub struct Harness {
    pub store: Store,
    pub log: NotificationLog,
}

impl Harness {
    pub fn new() -> Self {
        init_tracing();
        let log = NotificationLog::new();
        Self {
            store: Store::with_options(schema(), log.clone(), GraphOptions::strict()),
            log,
        }
    }

    pub fn id(&mut self, resource_type: &str, id: &str) -> Identifier {
        self.store.identifier(resource_type, id)
    }

    pub fn local(&mut self, record: &Identifier, field: &str) -> Vec<Identifier> {
        self.store.graph_mut().local_state(record, field).unwrap()
    }

    pub fn remote(&mut self, record: &Identifier, field: &str) -> Vec<Identifier> {
        self.store.graph_mut().remote_state(record, field).unwrap()
    }

    pub fn assert_reciprocal(&mut self) {
        let violations = self.store.graph_mut().verify_reciprocity();
        assert!(
            violations.is_empty(),
            "reciprocity violations: {}",
            violations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("; ")
        );
    }
}
