//! Shared contracts for the relationship graph.
//!
//! This crate holds everything the graph consumes from its collaborators:
//! - Identifiers and the store-scoped identifier cache
//! - Resource schema input and the `SchemaSource` trait
//! - Remote relationship payloads
//! - The notification sink contract
//! - Graph options and the shared error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod identifier;
pub mod notify;
pub mod options;
pub mod payload;
pub mod schema;

// Re-exports
pub use error::{GraphError, GraphResult};
pub use identifier::{FieldName, IdAssignment, Identifier, IdentifierCache, ResourceType};
pub use notify::{Notification, NotificationLog, NotificationSink, NullSink};
pub use options::{AssertionMode, GraphOptions};
pub use payload::{Links, RelationshipData, RelationshipPayload};
pub use schema::{EdgeKind, RelationshipKind, RelationshipSchema, ResourceSchema, Schema, SchemaSource};
