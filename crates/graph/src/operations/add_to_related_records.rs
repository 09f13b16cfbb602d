//! `addToRelatedRecords`: append members to a collection field.

use rustc_hash::FxHashSet;

use relgraph_core::{EdgeKind, FieldName, GraphError, GraphResult, Identifier};

use crate::graph::{materialize, Graph};

const OP: &str = "addToRelatedRecords";

/// Drop repeated identifiers, keeping first occurrences in order.
pub(super) fn dedupe(values: Vec<Identifier>) -> Vec<Identifier> {
    let mut seen = FxHashSet::default();
    values.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

impl Graph {
    pub(crate) fn add_to_related_records(
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
        let added: Vec<Identifier> = if is_remote {
            let added: Vec<Identifier> = values
                .into_iter()
                .filter(|id| !edge.remote_contains(id))
                .collect();
            if added.is_empty() {
                self.transaction.add(edge);
            } else {
                self.transaction.schedule(edge);
                for id in &added {
                    edge.add_remote_member(id);
                }
            }
            added
        } else {
            let Some(collection) = edge.collection_mut() else {
                return Err(GraphError::kind_mismatch(OP, meta.kind, record.resource_type().as_str(), &**field));
            };
            let added: Vec<Identifier> = values.into_iter().filter(|id| collection.add_local(id)).collect();
            if !added.is_empty() {
                collection.state.is_empty = false;
                self.notify_change(record, &meta.key);
            }
            added
        };

        for id in &added {
            self.add_to_inverse(id, &meta.inverse_key, record, is_remote)?;
        }
        Ok(())
    }
}
