//! `updateRelationship`: apply a server relationship payload.

use serde_json::Value;

use relgraph_core::{
    EdgeKind, FieldName, GraphError, GraphResult, Identifier, Links, RelationshipData,
    RelationshipPayload,
};

use crate::edges::Edge;
use crate::graph::{materialize, Graph};

const OP: &str = "updateRelationship";

/// Store `links` and `meta` on the edge. Returns whether the `related` link changed.
fn store_links(edge: &mut Edge, links: Option<Links>, meta: Option<Value>) -> bool {
    let (slot_links, slot_meta) = match edge {
        Edge::Resource(e) => (&mut e.links, &mut e.meta),
        Edge::Collection(e) => (&mut e.links, &mut e.meta),
        Edge::Paginated(e) => (&mut e.inner.links, &mut e.inner.meta),
        Edge::Implicit(_) => return false,
    };
    if meta.is_some() {
        *slot_meta = meta;
    }
    let Some(links) = links else {
        return false;
    };
    let previous = slot_links.as_ref().and_then(|l| l.related.as_deref());
    let related_changed = links.related.is_some() && links.related.as_deref() != previous;
    *slot_links = Some(links);
    related_changed
}

impl Graph {
    pub(crate) fn update_relationship(
        &mut self,
        record: &Identifier,
        field: &FieldName,
        payload: RelationshipPayload,
    ) -> GraphResult<()> {
        let resolved = self.registry.definition_for(record.resource_type(), field)?;
        let meta = resolved.meta;
        let kind = meta.kind;
        if kind == EdgeKind::Implicit {
            return Err(GraphError::kind_mismatch(OP, kind, record.resource_type().as_str(), &**field));
        }

        match &payload.data {
            Some(RelationshipData::Single(Some(value))) if kind.is_collection() => {
                return Err(GraphError::invalid_payload(format!(
                    "{record}.{field} is a {kind}; expected an array of identifiers, got {value}"
                )));
            }
            Some(RelationshipData::Many(_)) if kind == EdgeKind::BelongsTo => {
                return Err(GraphError::invalid_payload(format!(
                    "{record}.{field} is a belongsTo; expected a single identifier or null"
                )));
            }
            Some(RelationshipData::Single(Some(value))) => {
                self.prepare_values(&meta, std::iter::once(value))?;
            }
            Some(RelationshipData::Many(values)) => {
                self.prepare_values(&meta, values)?;
            }
            Some(RelationshipData::Single(None)) | None => {}
        }

        let RelationshipPayload {
            data,
            links,
            meta: payload_meta,
        } = payload;

        let edge = materialize(&mut self.edges, &mut self.registry, record, field)?;
        self.transaction.add(edge);
        let related_changed = store_links(edge, links, payload_meta);
        let has_received_data = edge.has_received_data();

        match data {
            Some(RelationshipData::Single(value)) if kind == EdgeKind::BelongsTo => {
                self.replace_related_record(record, field, value, true)
            }
            Some(RelationshipData::Single(_)) => self.replace_related_records(record, field, Vec::new(), true),
            Some(RelationshipData::Many(values)) => self.replace_related_records(record, field, values, true),
            None if !meta.is_async && !has_received_data => {
                if kind == EdgeKind::BelongsTo {
                    self.replace_related_record(record, field, None, true)
                } else {
                    self.replace_related_records(record, field, Vec::new(), true)
                }
            }
            None => {
                if related_changed {
                    if let Some(state) = self.peek_mut(record, &meta.key).and_then(Edge::state_mut) {
                        state.is_stale = true;
                    }
                    self.notify_change(record, &meta.key);
                }
                Ok(())
            }
        }
    }
}
