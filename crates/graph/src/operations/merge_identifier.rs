//! `mergeIdentifier`: fold one identifier into another.
//!
//! Used when a client-created identifier turns out to be a resource the graph
//! already knows under another identifier. Every edge owned by the retired
//! identifier moves to the survivor, and every reference to it in related
//! edges is swapped in place so ordered collections keep their positions.

use tracing::debug;

use relgraph_core::{FieldName, GraphResult, Identifier};

use crate::edges::Edge;
use crate::graph::Graph;

impl Graph {
    pub(crate) fn merge_identifier(&mut self, old: &Identifier, new: &Identifier) -> GraphResult<()> {
        if old == new {
            return Ok(());
        }

        let mut fields: Vec<(FieldName, Edge)> = self
            .edges
            .remove(old)
            .map(|fields| fields.into_iter().collect())
            .unwrap_or_default();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let merged = fields.len();

        for (key, mut edge) in fields {
            let inverse_key = edge.meta().inverse_key.clone();
            let related = edge.related_identifiers();

            let existing_wins = self
                .peek(new, &key)
                .is_some_and(|e| e.has_received_data() || !e.related_identifiers().is_empty());
            if existing_wins {
                for r in related.iter().filter(|r| *r != old && *r != new) {
                    self.scrub_reference(r, &inverse_key, old);
                }
                continue;
            }

            edge.set_identifier(new.clone());
            edge.replace_identifier(old, new);
            self.edges.entry(new.clone()).or_default().insert(key, edge);

            for r in related {
                let target = if &r == old { new.clone() } else { r };
                let visible = self
                    .peek_mut(&target, &inverse_key)
                    .is_some_and(|e| e.replace_identifier(old, new));
                if visible {
                    self.notify_change(&target, &inverse_key);
                }
            }
        }

        self.transaction.rename(old, new);
        self.rename_pending(old, new);
        self.new_records.remove(old);
        debug!(
            target: "relgraph::graph",
            old = %old,
            new = %new,
            fields = merged,
            "merged identifier"
        );
        Ok(())
    }
}
