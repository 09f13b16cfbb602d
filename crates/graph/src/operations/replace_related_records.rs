//! `replaceRelatedRecords`: set a collection field's full membership.
//!
//! Local and remote replacement each diff against their own view. A remote
//! replace never rewrites the local view inline; the edge is scheduled and
//! reconciled by [`Graph::flush`]. A local replace pins the requested order.

use rustc_hash::FxHashSet;
use tracing::debug;

use relgraph_core::{EdgeKind, FieldName, GraphError, GraphResult, Identifier};

use crate::definitions::UpgradedMeta;
use crate::diff::diff_collection;
use crate::graph::{materialize, Graph};

const OP: &str = "replaceRelatedRecords";

impl Graph {
    pub(crate) fn replace_related_records(
        &mut self,
        record: &Identifier,
        field: &FieldName,
        value: Vec<Identifier>,
        is_remote: bool,
    ) -> GraphResult<()> {
        let resolved = self.expect_kind(OP, record, field, &[EdgeKind::HasMany, EdgeKind::Collection])?;
        self.prepare_values(&resolved.meta, &value)?;
        if is_remote {
            self.replace_remote_records(record, &resolved.meta, value)
        } else {
            self.replace_local_records(record, &resolved.meta, value)
        }
    }

    fn replace_remote_records(
        &mut self,
        record: &Identifier,
        meta: &UpgradedMeta,
        value: Vec<Identifier>,
    ) -> GraphResult<()> {
        let edge = materialize(&mut self.edges, &mut self.registry, record, &meta.key)?;
        let Some(collection) = edge.collection() else {
            return Err(GraphError::kind_mismatch(OP, meta.kind, record.resource_type().as_str(), &*meta.key));
        };
        let diff = diff_collection(&value, collection.remote_state(), collection.remote_members());
        if diff.duplicates > 0 {
            debug!(
                target: "relgraph::graph",
                record = %record,
                field = %meta.key,
                duplicates = diff.duplicates,
                "dropped duplicate identifiers"
            );
        }
        let resetting = meta.reset_on_remote_update && collection.has_local_changes();

        if diff.changed || resetting {
            self.transaction.schedule(edge);
        } else {
            self.transaction.add(edge);
        }
        edge.set_collection_remote(diff.final_state);
        if let Some(state) = edge.state_mut() {
            state.received(diff.final_set.is_empty());
        }

        let mut readd = Vec::new();
        let mut dropped = Vec::new();
        if resetting {
            if let Some(collection) = edge.collection_mut() {
                let final_set = &diff.final_set;
                let new_records = &self.new_records;
                readd = collection
                    .take_removals()
                    .into_iter()
                    .filter(|id| final_set.contains(id))
                    .collect();
                dropped = collection.discard_additions(|id| !final_set.contains(id) && !new_records.contains(id));
                collection.mark_dirty();
            }
        }

        for id in &diff.added {
            self.add_to_inverse(id, &meta.inverse_key, record, true)?;
        }
        for id in &diff.removed {
            self.remove_from_inverse(id, &meta.inverse_key, record, true);
        }
        for id in &readd {
            self.add_to_inverse(id, &meta.inverse_key, record, false)?;
        }
        for id in &dropped {
            self.remove_from_inverse(id, &meta.inverse_key, record, false);
        }
        Ok(())
    }

    fn replace_local_records(
        &mut self,
        record: &Identifier,
        meta: &UpgradedMeta,
        value: Vec<Identifier>,
    ) -> GraphResult<()> {
        let edge = materialize(&mut self.edges, &mut self.registry, record, &meta.key)?;
        let Some(collection) = edge.collection_mut() else {
            return Err(GraphError::kind_mismatch(OP, meta.kind, record.resource_type().as_str(), &*meta.key));
        };
        let prior = collection.local_state().to_vec();
        let prior_set: FxHashSet<Identifier> = prior.iter().cloned().collect();
        let diff = diff_collection(&value, &prior, &prior_set);
        if diff.duplicates > 0 {
            debug!(
                target: "relgraph::graph",
                record = %record,
                field = %meta.key,
                duplicates = diff.duplicates,
                "dropped duplicate identifiers"
            );
        }

        for id in &diff.removed {
            collection.remove_local(id);
        }
        for id in &diff.added {
            collection.add_local(id);
        }
        collection.set_local_order(diff.final_state.clone());
        if let Some(state) = edge.state_mut() {
            state.is_empty = diff.final_set.is_empty();
        }

        if diff.changed {
            self.notify_change(record, &meta.key);
        }
        for id in &diff.removed {
            self.remove_from_inverse(id, &meta.inverse_key, record, false);
        }
        for id in &diff.added {
            self.add_to_inverse(id, &meta.inverse_key, record, false)?;
        }
        Ok(())
    }
}
