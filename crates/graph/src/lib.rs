//! Relationship graph.
//!
//! Tracks bidirectional relationships between resources as per-field edges,
//! keeping a local (edited) and remote (server-confirmed) view of each:
//! - `definitions`: schema resolution into paired edge definitions
//! - `edges`: belongsTo, hasMany, paginated and implicit edge variants
//! - `diff`: collection diffing and local-state derivation
//! - `transaction`: remote batch tracking drained by [`Graph::flush`]
//! - `operations`: the structural operations applied through [`Graph::push`]
//! - `integrity`: unload and reciprocity checks
//! - `snapshot`: serializable debug views

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod definitions;
pub mod diff;
pub mod edges;
pub mod graph;
pub mod integrity;
pub mod operations;
pub mod ordered_set;
pub mod snapshot;
pub mod transaction;

#[cfg(test)]
pub(crate) mod fixtures;

// Re-exports
pub use definitions::{DefinitionRegistry, EdgeDefinition, Resolved, UpgradedMeta};
pub use diff::{apply_local_order, compute_local_state, diff_collection, CollectionDiff};
pub use edges::{
    CollectionEdge, Edge, EdgeState, ImplicitEdge, Page, PageChange, PaginatedEdge, ResourceEdge,
};
pub use graph::{FlushSummary, Graph};
pub use integrity::{ReciprocityViolation, View};
pub use operations::Operation;
pub use ordered_set::OrderedSet;
pub use snapshot::{EdgeSnapshot, GraphSnapshot};
pub use transaction::{ScheduledSync, Transaction};

pub use relgraph_core::{
    AssertionMode, EdgeKind, FieldName, GraphError, GraphOptions, GraphResult, Identifier,
    IdentifierCache, NotificationLog, NotificationSink, RelationshipPayload, ResourceType, Schema,
    SchemaSource,
};
