//! `removeFromRelatedRecords`: drop members from a collection field.

use relgraph_core::{EdgeKind, FieldName, GraphError, GraphResult, Identifier};

use super::add_to_related_records::dedupe;
use crate::graph::{materialize, Graph};

const OP: &str = "removeFromRelatedRecords";

impl Graph {
    pub(crate) fn remove_from_related_records(
        &mut self,
        record: &Identifier,
        field: &FieldName,
        value: Vec<Identifier>,
        is_remote: bool,
    ) -> GraphResult<()> {
        let resolved = self.expect_kind(OP, record, field, &[EdgeKind::HasMany, EdgeKind::Collection])?;
        self.prepare_values(&resolved.meta, &value)?;
        let meta = resolved.meta;
        let values = dedupe(value);

        let edge = materialize(&mut self.edges, &mut self.registry, record, field)?;
        let removed: Vec<Identifier> = if is_remote {
            let removed: Vec<Identifier> = values
                .into_iter()
                .filter(|id| edge.remote_contains(id))
                .collect();
            if removed.is_empty() {
                self.transaction.add(edge);
            } else {
                self.transaction.schedule(edge);
                for id in &removed {
                    edge.remove_remote_member(id);
                }
            }
            removed
        } else {
            let Some(collection) = edge.collection_mut() else {
                return Err(GraphError::kind_mismatch(OP, meta.kind, record.resource_type().as_str(), &**field));
            };
            let removed: Vec<Identifier> = values
                .into_iter()
                .filter(|id| collection.remove_local(id))
                .collect();
            if !removed.is_empty() {
                collection.state.is_empty = collection.local_state().is_empty();
                self.notify_change(record, &meta.key);
            }
            removed
        };

        for id in &removed {
            self.remove_from_inverse(id, &meta.inverse_key, record, is_remote);
        }
        Ok(())
    }
}
