//! Shared test schema.

use std::sync::Arc;

use relgraph_core::{
    GraphOptions, Identifier, IdentifierCache, NotificationLog, RelationshipSchema as R, Schema,
};

use crate::graph::Graph;

pub(crate) struct Fixture {
    pub graph: Graph,
    pub cache: IdentifierCache,
    pub log: NotificationLog,
}

impl Fixture {
    pub fn id(&mut self, resource_type: &str, id: &str) -> Identifier {
        self.cache.get_or_create(resource_type, id)
    }

    pub fn local(&mut self, identifier: &Identifier, field: &str) -> Vec<Identifier> {
        self.graph.local_state(identifier, field).unwrap()
    }

    pub fn remote(&mut self, identifier: &Identifier, field: &str) -> Vec<Identifier> {
        self.graph.remote_state(identifier, field).unwrap()
    }
}

pub(crate) fn schema() -> Schema {
    Schema::new()
        .with_type(
            "user",
            vec![
                R::belongs_to("bestFriend", "user").inverse("bestFriend"),
                R::has_many("pets", "pet").inverse("owner"),
                R::collection("posts", "post").inverse("author"),
                R::belongs_to("company", "company"),
                R::has_many("tags", "tag").inverse("users").keep_local_on_remote_update(),
            ],
        )
        .with_type("pet", vec![R::belongs_to("owner", "user").inverse("pets")])
        .with_type("post", vec![R::belongs_to("author", "user").inverse("posts")])
        .with_type("tag", vec![R::has_many("users", "user").inverse("tags")])
        .with_type("company", vec![])
}

pub(crate) fn fixture() -> Fixture {
    let log = NotificationLog::new();
    Fixture {
        graph: Graph::with_options(Arc::new(schema()), log.clone(), GraphOptions::strict()),
        cache: IdentifierCache::new(),
        log,
    }
}
