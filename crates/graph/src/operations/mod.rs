//! Structural operations.
//!
//! [`Graph::push`] is the single entry point for mutation. Each operation
//! fully applies its primary change, computing what to detach and attach as
//! plain values, and only then dispatches the reciprocal change on the inverse
//! edge. Reciprocal steps touch only the other side of the same relationship.

mod add_to_related_records;
mod inverse;
mod merge_identifier;
mod remove_from_related_records;
mod replace_related_record;
mod replace_related_records;
mod update_page;
mod update_relationship;

use serde_json::Value;
use tracing::trace;

use relgraph_core::{FieldName, GraphResult, Identifier, Links, RelationshipPayload};

use crate::graph::Graph;

/// A structural mutation.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Set a belongsTo field.
    ReplaceRelatedRecord {
        /// Owner.
        record: Identifier,
        /// belongsTo field.
        field: FieldName,
        /// New value, or `None` to clear.
        value: Option<Identifier>,
    },
    /// Set a collection field's full membership.
    ReplaceRelatedRecords {
        /// Owner.
        record: Identifier,
        /// Collection field.
        field: FieldName,
        /// New membership in order.
        value: Vec<Identifier>,
    },
    /// Add members to a collection field.
    AddToRelatedRecords {
        /// Owner.
        record: Identifier,
        /// Collection field.
        field: FieldName,
        /// Members to add.
        value: Vec<Identifier>,
    },
    /// Remove members from a collection field.
    RemoveFromRelatedRecords {
        /// Owner.
        record: Identifier,
        /// Collection field.
        field: FieldName,
        /// Members to remove.
        value: Vec<Identifier>,
    },
    /// Fold `record` into `value` everywhere.
    MergeIdentifier {
        /// Identifier being retired.
        record: Identifier,
        /// Identifier that survives.
        value: Identifier,
    },
    /// Apply a remote relationship payload. Always remote.
    UpdateRelationship {
        /// Owner.
        record: Identifier,
        /// Relationship field.
        field: FieldName,
        /// Server state.
        payload: RelationshipPayload,
    },
    /// Replace one page of a paginated collection. Always remote.
    UpdatePage {
        /// Owner.
        record: Identifier,
        /// Paginated collection field.
        field: FieldName,
        /// Page key.
        page: String,
        /// Page members in order.
        value: Vec<Identifier>,
        /// Page links.
        links: Option<Links>,
        /// Page meta.
        meta: Option<Value>,
    },
    /// Drop one page of a paginated collection. Always remote.
    RemovePage {
        /// Owner.
        record: Identifier,
        /// Paginated collection field.
        field: FieldName,
        /// Page key.
        page: String,
    },
}

impl Operation {
    /// `replaceRelatedRecord`
    pub fn replace_related_record(record: &Identifier, field: &str, value: Option<Identifier>) -> Self {
        Operation::ReplaceRelatedRecord {
            record: record.clone(),
            field: FieldName::from(field),
            value,
        }
    }

    /// `replaceRelatedRecords`
    pub fn replace_related_records(record: &Identifier, field: &str, value: Vec<Identifier>) -> Self {
        Operation::ReplaceRelatedRecords {
            record: record.clone(),
            field: FieldName::from(field),
            value,
        }
    }

    /// `addToRelatedRecords`
    pub fn add_to_related_records(record: &Identifier, field: &str, value: Vec<Identifier>) -> Self {
        Operation::AddToRelatedRecords {
            record: record.clone(),
            field: FieldName::from(field),
            value,
        }
    }

    /// `removeFromRelatedRecords`
    pub fn remove_from_related_records(record: &Identifier, field: &str, value: Vec<Identifier>) -> Self {
        Operation::RemoveFromRelatedRecords {
            record: record.clone(),
            field: FieldName::from(field),
            value,
        }
    }

    /// `mergeIdentifier`
    pub fn merge_identifier(record: &Identifier, value: &Identifier) -> Self {
        Operation::MergeIdentifier {
            record: record.clone(),
            value: value.clone(),
        }
    }

    /// `updateRelationship`
    pub fn update_relationship(record: &Identifier, field: &str, payload: RelationshipPayload) -> Self {
        Operation::UpdateRelationship {
            record: record.clone(),
            field: FieldName::from(field),
            payload,
        }
    }

    /// `updatePage` without links or meta.
    pub fn update_page(record: &Identifier, field: &str, page: &str, value: Vec<Identifier>) -> Self {
        Operation::UpdatePage {
            record: record.clone(),
            field: FieldName::from(field),
            page: page.to_string(),
            value,
            links: None,
            meta: None,
        }
    }

    /// `removePage`
    pub fn remove_page(record: &Identifier, field: &str, page: &str) -> Self {
        Operation::RemovePage {
            record: record.clone(),
            field: FieldName::from(field),
            page: page.to_string(),
        }
    }

    /// Wire name of the operation.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::ReplaceRelatedRecord { .. } => "replaceRelatedRecord",
            Operation::ReplaceRelatedRecords { .. } => "replaceRelatedRecords",
            Operation::AddToRelatedRecords { .. } => "addToRelatedRecords",
            Operation::RemoveFromRelatedRecords { .. } => "removeFromRelatedRecords",
            Operation::MergeIdentifier { .. } => "mergeIdentifier",
            Operation::UpdateRelationship { .. } => "updateRelationship",
            Operation::UpdatePage { .. } => "updatePage",
            Operation::RemovePage { .. } => "removePage",
        }
    }

    /// Identifier the operation is aimed at.
    pub fn record(&self) -> &Identifier {
        match self {
            Operation::ReplaceRelatedRecord { record, .. }
            | Operation::ReplaceRelatedRecords { record, .. }
            | Operation::AddToRelatedRecords { record, .. }
            | Operation::RemoveFromRelatedRecords { record, .. }
            | Operation::MergeIdentifier { record, .. }
            | Operation::UpdateRelationship { record, .. }
            | Operation::UpdatePage { record, .. }
            | Operation::RemovePage { record, .. } => record,
        }
    }

    /// Whether the operation only exists as a remote update.
    pub fn is_remote_only(&self) -> bool {
        matches!(
            self,
            Operation::UpdateRelationship { .. } | Operation::UpdatePage { .. } | Operation::RemovePage { .. }
        )
    }
}

impl Graph {
    /// Apply one structural operation.
    ///
    /// Local operations deliver their notifications before returning. Remote
    /// operations queue notifications and resyncs until [`Graph::flush`].
    /// Payload and page operations are always applied as remote.
    pub fn push(&mut self, operation: Operation, is_remote: bool) -> GraphResult<()> {
        let is_remote = is_remote || operation.is_remote_only();
        trace!(
            target: "relgraph::graph",
            op = operation.name(),
            record = %operation.record(),
            is_remote,
            "push"
        );

        let result = match operation {
            Operation::ReplaceRelatedRecord { record, field, value } => {
                self.replace_related_record(&record, &field, value, is_remote)
            }
            Operation::ReplaceRelatedRecords { record, field, value } => {
                self.replace_related_records(&record, &field, value, is_remote)
            }
            Operation::AddToRelatedRecords { record, field, value } => {
                self.add_to_related_records(&record, &field, value, is_remote)
            }
            Operation::RemoveFromRelatedRecords { record, field, value } => {
                self.remove_from_related_records(&record, &field, value, is_remote)
            }
            Operation::MergeIdentifier { record, value } => self.merge_identifier(&record, &value),
            Operation::UpdateRelationship { record, field, payload } => {
                self.update_relationship(&record, &field, payload)
            }
            Operation::UpdatePage {
                record,
                field,
                page,
                value,
                links,
                meta,
            } => self.update_page(&record, &field, &page, value, links, meta),
            Operation::RemovePage { record, field, page } => self.remove_page(&record, &field, &page),
        };

        if !is_remote {
            self.deliver();
        }
        result
    }
}
