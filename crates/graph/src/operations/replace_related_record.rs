//! `replaceRelatedRecord`: set a belongsTo field.

use relgraph_core::{EdgeKind, FieldName, GraphError, GraphResult, Identifier};

use crate::edges::Edge;
use crate::graph::{materialize, Graph};

const OP: &str = "replaceRelatedRecord";

impl Graph {
    pub(crate) fn replace_related_record(
        &mut self,
        record: &Identifier,
        field: &FieldName,
        value: Option<Identifier>,
        is_remote: bool,
    ) -> GraphResult<()> {
        let resolved = self.expect_kind(OP, record, field, &[EdgeKind::BelongsTo])?;
        if let Some(value) = &value {
            self.prepare_values(&resolved.meta, std::iter::once(value))?;
        }
        let meta = resolved.meta;
        let key = meta.key.clone();
        let inverse_key = meta.inverse_key.clone();

        let edge = materialize(&mut self.edges, &mut self.registry, record, field)?;
        if is_remote {
            self.transaction.add(edge);
        }
        let Edge::Resource(e) = edge else {
            return Err(GraphError::kind_mismatch(OP, meta.kind, record.resource_type().as_str(), &**field));
        };

        let old_local = e.local_state.clone();

        if !is_remote {
            if old_local == value {
                return Ok(());
            }
            e.local_state = value.clone();
            e.state.is_empty = value.is_none();
            self.notify_change(record, &key);
            if let Some(old) = &old_local {
                self.remove_from_inverse(old, &inverse_key, record, false);
            }
            if let Some(value) = &value {
                self.add_to_inverse(value, &inverse_key, record, false)?;
            }
            return Ok(());
        }

        let old_remote = e.remote_state.clone();
        e.state.received(value.is_none());
        if old_remote == value {
            e.state.is_empty = e.local_state.is_none();
            return Ok(());
        }
        e.remote_state = value.clone();

        // Clearing the server value never orphans a record the client just created.
        let keeps_new_local =
            value.is_none() && old_local.as_ref().is_some_and(|l| self.new_records.contains(l));
        let local_follows = old_local != value
            && (old_local == old_remote || meta.reset_on_remote_update)
            && !keeps_new_local;
        if local_follows {
            e.local_state = value.clone();
        }
        e.state.is_empty = e.local_state.is_none();

        if let Some(old) = &old_remote {
            self.remove_from_inverse(old, &inverse_key, record, true);
        }
        if let Some(value) = &value {
            self.add_to_inverse(value, &inverse_key, record, true)?;
        }

        if local_follows {
            if let Some(old) = old_local.as_ref().filter(|l| Some(*l) != old_remote.as_ref()) {
                self.remove_from_inverse(old, &inverse_key, record, false);
            }
            self.notify_change(record, &key);
        } else if let Some(value) = value.as_ref().filter(|v| old_local.as_ref() != Some(*v)) {
            // The local edit survives, so the new value must not see us locally.
            self.remove_from_inverse(value, &inverse_key, record, false);
        }
        Ok(())
    }
}
