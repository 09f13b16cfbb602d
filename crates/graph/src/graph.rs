//! The edge store.
//!
//! Maps `Identifier -> (field -> Edge)`. Edges are materialized lazily from
//! the registry's definitions on first access. All cross-edge references are
//! identifier lookups through this map, so removing an identifier is a map
//! delete plus a walk of that identifier's own edges.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::debug;

use relgraph_core::{
    FieldName, GraphError, GraphOptions, GraphResult, Identifier, NotificationSink, ResourceType,
    SchemaSource,
};

use crate::definitions::{DefinitionRegistry, Resolved, UpgradedMeta};
use crate::edges::{Edge, EdgeState};
use crate::transaction::Transaction;

pub(crate) type EdgeMap = FxHashMap<Identifier, FxHashMap<FieldName, Edge>>;

/// Look up or lazily create the edge for `identifier.field`.
///
/// Takes the map and registry separately so callers can keep using other
/// graph fields while holding the returned edge.
pub(crate) fn materialize<'a>(
    edges: &'a mut EdgeMap,
    registry: &mut DefinitionRegistry,
    identifier: &Identifier,
    field: &str,
) -> GraphResult<&'a mut Edge> {
    let resolved = registry.definition_for(identifier.resource_type(), field)?;
    let key = resolved.meta.key.clone();
    Ok(edges
        .entry(identifier.clone())
        .or_default()
        .entry(key)
        .or_insert_with(|| Edge::new(identifier.clone(), resolved)))
}

/// Outcome of [`Graph::flush`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushSummary {
    /// Edges touched by remote operations in the batch.
    pub touched: usize,
    /// Collection edges resynced.
    pub synced: usize,
    /// Notifications delivered.
    pub notified: usize,
}

/// Relationship graph.
pub struct Graph {
    pub(crate) registry: DefinitionRegistry,
    pub(crate) edges: EdgeMap,
    pub(crate) transaction: Transaction,
    pending: Vec<(Identifier, FieldName)>,
    pending_keys: FxHashSet<(Identifier, FieldName)>,
    sink: Box<dyn NotificationSink>,
    options: GraphOptions,
    /// Client-created records not yet persisted.
    pub(crate) new_records: FxHashSet<Identifier>,
}

impl Graph {
    /// Create a graph with default options.
    pub fn new(schema: Arc<dyn SchemaSource>, sink: impl NotificationSink + 'static) -> Self {
        Self::with_options(schema, sink, GraphOptions::default())
    }

    /// Create a graph with explicit options.
    pub fn with_options(
        schema: Arc<dyn SchemaSource>,
        sink: impl NotificationSink + 'static,
        options: GraphOptions,
    ) -> Self {
        Self {
            registry: DefinitionRegistry::new(schema, options.is_strict()),
            edges: FxHashMap::default(),
            transaction: Transaction::new(),
            pending: Vec::new(),
            pending_keys: FxHashSet::default(),
            sink: Box::new(sink),
            options,
            new_records: FxHashSet::default(),
        }
    }

    /// Options the graph was built with.
    pub fn options(&self) -> &GraphOptions {
        &self.options
    }

    // =========================================================================
    // Definitions and edge access
    // =========================================================================

    /// Resolved definition for `resource_type.field`.
    pub fn definition_for(&mut self, resource_type: &ResourceType, field: &str) -> GraphResult<Resolved> {
        self.registry.definition_for(resource_type, field)
    }

    /// The live edge for `identifier.field`, created on first access.
    pub fn get(&mut self, identifier: &Identifier, field: &str) -> GraphResult<&mut Edge> {
        materialize(&mut self.edges, &mut self.registry, identifier, field)
    }

    /// The edge for `identifier.field` if it was ever materialized.
    pub fn peek(&self, identifier: &Identifier, field: &str) -> Option<&Edge> {
        self.edges.get(identifier)?.get(field)
    }

    pub(crate) fn peek_mut(&mut self, identifier: &Identifier, field: &str) -> Option<&mut Edge> {
        self.edges.get_mut(identifier)?.get_mut(field)
    }

    /// Whether `identifier.field` was materialized.
    pub fn has(&self, identifier: &Identifier, field: &str) -> bool {
        self.peek(identifier, field).is_some()
    }

    /// Whether any edge is owned by `identifier`.
    pub fn contains_identifier(&self, identifier: &Identifier) -> bool {
        self.edges.contains_key(identifier)
    }

    /// Materialized fields of `identifier`, sorted.
    pub fn fields_of(&self, identifier: &Identifier) -> Vec<FieldName> {
        let mut fields: Vec<FieldName> = self
            .edges
            .get(identifier)
            .map(|f| f.keys().cloned().collect())
            .unwrap_or_default();
        fields.sort();
        fields
    }

    /// Number of materialized edges.
    pub fn edge_count(&self) -> usize {
        self.edges.values().map(|f| f.len()).sum()
    }

    /// Local view of `identifier.field`.
    pub fn local_state(&mut self, identifier: &Identifier, field: &str) -> GraphResult<Vec<Identifier>> {
        Ok(self.get(identifier, field)?.local_view())
    }

    /// Remote view of `identifier.field`.
    pub fn remote_state(&mut self, identifier: &Identifier, field: &str) -> GraphResult<Vec<Identifier>> {
        Ok(self.get(identifier, field)?.remote_view())
    }

    /// State flags of `identifier.field`; `None` for implicit edges.
    pub fn edge_state(&mut self, identifier: &Identifier, field: &str) -> GraphResult<Option<EdgeState>> {
        Ok(self.get(identifier, field)?.state().copied())
    }

    /// Record that loading `identifier.field` failed.
    pub fn mark_load_failed(&mut self, identifier: &Identifier, field: &str) -> GraphResult<()> {
        if let Some(state) = self.get(identifier, field)?.state_mut() {
            state.has_failed_load_attempt = true;
        }
        Ok(())
    }

    // =========================================================================
    // Client-created records
    // =========================================================================

    /// Mark `identifier` as client-created and not yet persisted.
    ///
    /// Pending local additions of new records survive remote resets.
    pub fn mark_new(&mut self, identifier: &Identifier) {
        self.new_records.insert(identifier.clone());
    }

    /// Clear the client-created mark after persistence.
    pub fn mark_persisted(&mut self, identifier: &Identifier) {
        self.new_records.remove(identifier);
    }

    /// Whether `identifier` is marked client-created.
    pub fn is_new(&self, identifier: &Identifier) -> bool {
        self.new_records.contains(identifier)
    }

    // =========================================================================
    // Validation helpers
    // =========================================================================

    /// Definition of `record.field`, failing unless its kind is one of `allowed`.
    pub(crate) fn expect_kind(
        &mut self,
        operation: &'static str,
        record: &Identifier,
        field: &str,
        allowed: &[relgraph_core::EdgeKind],
    ) -> GraphResult<Resolved> {
        let resolved = self.registry.definition_for(record.resource_type(), field)?;
        if !allowed.contains(&resolved.meta.kind) {
            return Err(GraphError::kind_mismatch(
                operation,
                resolved.meta.kind,
                record.resource_type().as_str(),
                field,
            ));
        }
        Ok(resolved)
    }

    /// Check every value is assignable and its inverse definition resolves,
    /// before any state is mutated.
    pub(crate) fn prepare_values<'v>(
        &mut self,
        meta: &UpgradedMeta,
        values: impl IntoIterator<Item = &'v Identifier>,
    ) -> GraphResult<()> {
        let mut checked: FxHashSet<ResourceType> = FxHashSet::default();
        for value in values {
            if checked.insert(value.resource_type().clone()) {
                self.registry.check_assignable(meta, value)?;
                self.registry
                    .definition_for(value.resource_type(), &meta.inverse_key)?;
            }
        }
        Ok(())
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// Queue a change notification. Implicit edges are never observable.
    pub(crate) fn notify_change(&mut self, identifier: &Identifier, field: &FieldName) {
        if DefinitionRegistry::is_implicit_key(field) {
            return;
        }
        if self.pending_keys.insert((identifier.clone(), field.clone())) {
            self.pending.push((identifier.clone(), field.clone()));
        }
    }

    /// Number of queued, undelivered notifications.
    pub fn pending_notifications(&self) -> usize {
        self.pending.len()
    }

    /// Deliver queued notifications, at most one per `(identifier, field)`.
    pub(crate) fn deliver(&mut self) -> usize {
        let pending = std::mem::take(&mut self.pending);
        self.pending_keys.clear();
        for (identifier, field) in &pending {
            self.sink.notify(identifier, field);
        }
        pending.len()
    }

    pub(crate) fn rename_pending(&mut self, old: &Identifier, new: &Identifier) {
        let pending = std::mem::take(&mut self.pending);
        self.pending_keys.clear();
        for (identifier, field) in pending {
            let identifier = if &identifier == old { new.clone() } else { identifier };
            self.notify_change(&identifier, &field);
        }
    }

    pub(crate) fn forget_pending(&mut self, identifier: &Identifier) {
        self.pending.retain(|(id, _)| id != identifier);
        self.pending_keys.retain(|(id, _)| id != identifier);
    }

    // =========================================================================
    // Flush
    // =========================================================================

    /// End a remote ingestion batch.
    ///
    /// Every scheduled collection edge reconciles its pending local edits with
    /// the new remote state; an edge notifies once if its local view differs
    /// from the view it had before the batch. Queued notifications are then
    /// delivered.
    pub fn flush(&mut self) -> FlushSummary {
        let scheduled = self.transaction.take_scheduled();
        let synced = scheduled.len();
        for sync in scheduled {
            let changed = match self
                .peek_mut(&sync.identifier, &sync.field)
                .and_then(Edge::collection_mut)
            {
                Some(collection) => {
                    collection.sync_remote_to_local();
                    collection.local_state() != sync.before.as_slice()
                }
                None => false,
            };
            if changed {
                self.notify_change(&sync.identifier, &sync.field);
            }
        }
        let touched = self.transaction.finish();
        let notified = self.deliver();
        debug!(
            target: "relgraph::graph",
            touched,
            synced,
            notified,
            "flushed remote batch"
        );
        FlushSummary {
            touched,
            synced,
            notified,
        }
    }
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("registry", &self.registry)
            .field("edges", &self.edge_count())
            .field("pending", &self.pending.len())
            .field("options", &self.options)
            .finish()
    }
}
