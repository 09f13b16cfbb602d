//! Public types for the relationship graph facade.
//!
//! This module re-exports types from the workspace crates with one flat surface.

// ============================================================================
// Identifiers and schema input
// ============================================================================

pub use relgraph_core::{FieldName, IdAssignment, Identifier, IdentifierCache, ResourceType};
pub use relgraph_core::{EdgeKind, RelationshipKind, RelationshipSchema, ResourceSchema, Schema, SchemaSource};

// Payloads
pub use relgraph_core::{Links, RelationshipData, RelationshipPayload};

// Notifications
pub use relgraph_core::{Notification, NotificationLog, NotificationSink, NullSink};

// Configuration and errors
pub use relgraph_core::{AssertionMode, GraphError, GraphOptions, GraphResult};

// ============================================================================
// Graph
// ============================================================================

pub use relgraph_graph::{Edge, EdgeState, FlushSummary, Graph, Operation};
pub use relgraph_graph::{EdgeSnapshot, GraphSnapshot, ReciprocityViolation, View};
pub use relgraph_graph::{CollectionEdge, ImplicitEdge, Page, PaginatedEdge, ResourceEdge};
