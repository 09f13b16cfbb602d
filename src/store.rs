//! Store-scoped context owning the identifier cache and the graph.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use relgraph_core::{
    GraphOptions, GraphResult, IdAssignment, Identifier, IdentifierCache, NotificationSink,
    RelationshipPayload, ResourceType, SchemaSource,
};
use relgraph_graph::{FlushSummary, Graph, Operation};

/// One identifier cache and one relationship graph.
///
/// Identifiers are only meaningful within the store that allocated them.
#[derive(Debug)]
pub struct Store {
    cache: IdentifierCache,
    graph: Graph,
}

impl Store {
    /// Create a store with default options.
    pub fn new(schema: impl SchemaSource + 'static, sink: impl NotificationSink + 'static) -> Self {
        Self::with_options(schema, sink, GraphOptions::default())
    }

    /// Create a store with explicit options.
    pub fn with_options(
        schema: impl SchemaSource + 'static,
        sink: impl NotificationSink + 'static,
        options: GraphOptions,
    ) -> Self {
        Self {
            cache: IdentifierCache::new(),
            graph: Graph::with_options(Arc::new(schema), sink, options),
        }
    }

    /// Identifier for a server-known resource.
    pub fn identifier(&mut self, resource_type: impl Into<ResourceType>, id: &str) -> Identifier {
        self.cache.get_or_create(resource_type, id)
    }

    /// Identifier for a new client-created resource.
    pub fn create_record(&mut self, resource_type: impl Into<ResourceType>) -> Identifier {
        let identifier = self.cache.create_local(resource_type);
        self.graph.mark_new(&identifier);
        identifier
    }

    /// Parse a JSON relationship object and apply it as a remote update.
    ///
    /// Takes effect on local views at the next [`Store::flush`].
    pub fn push_relationship(&mut self, record: &Identifier, field: &str, json: &Value) -> GraphResult<()> {
        let payload = RelationshipPayload::from_json(json, &mut self.cache)?;
        self.graph
            .push(Operation::update_relationship(record, field, payload), true)
    }

    /// Apply one structural operation.
    pub fn push(&mut self, operation: Operation, is_remote: bool) -> GraphResult<()> {
        self.graph.push(operation, is_remote)
    }

    /// End a remote ingestion batch.
    pub fn flush(&mut self) -> FlushSummary {
        self.graph.flush()
    }

    /// Record the primary key the server assigned to a client-created record.
    ///
    /// If another identifier already owns that key, `record` is merged into it
    /// and forgotten. Returns the surviving identifier.
    pub fn commit_created(&mut self, record: &Identifier, id: &str) -> GraphResult<Identifier> {
        match self.cache.assign_id(record, id)? {
            IdAssignment::Assigned => {
                self.graph.mark_persisted(record);
                Ok(record.clone())
            }
            IdAssignment::Collision { existing } => {
                debug!(
                    target: "relgraph::graph",
                    record = %record,
                    existing = %existing,
                    id,
                    "primary key already known; merging"
                );
                self.graph
                    .push(Operation::merge_identifier(record, &existing), false)?;
                self.cache.forget(record);
                Ok(existing)
            }
        }
    }

    /// Drop a resource from the graph and the cache.
    pub fn unload_record(&mut self, record: &Identifier) {
        self.graph.unload(record);
        self.cache.forget(record);
    }

    /// The identifier cache.
    pub fn cache(&self) -> &IdentifierCache {
        &self.cache
    }

    /// The graph.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The graph, mutably. Reads of collection views need `&mut`.
    pub fn graph_mut(&mut self) -> &mut Graph {
        &mut self.graph
    }
}
