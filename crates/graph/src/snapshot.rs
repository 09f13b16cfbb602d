//! Serializable point-in-time view of the graph, for debugging and tests.

use serde::{Deserialize, Serialize};

use relgraph_core::{EdgeKind, Identifier};

use crate::edges::EdgeState;
use crate::graph::Graph;

/// One edge as captured by [`Graph::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSnapshot {
    /// Owner, rendered as `type#handle`.
    pub identifier: String,
    /// Field name.
    pub field: String,
    /// Edge kind.
    pub kind: EdgeKind,
    /// Local view.
    pub local: Vec<String>,
    /// Remote view.
    pub remote: Vec<String>,
    /// State flags; absent for implicit edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<EdgeState>,
}

/// Every materialized edge, ordered by owner then field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    /// Captured edges.
    pub edges: Vec<EdgeSnapshot>,
}

impl GraphSnapshot {
    /// Number of captured edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The captured edge for `identifier.field`.
    pub fn find(&self, identifier: &Identifier, field: &str) -> Option<&EdgeSnapshot> {
        let identifier = identifier.to_string();
        self.edges
            .iter()
            .find(|e| e.identifier == identifier && e.field == field)
    }

    /// Pretty-printed JSON.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }
}

fn render(ids: Vec<Identifier>) -> Vec<String> {
    ids.iter().map(ToString::to_string).collect()
}

impl Graph {
    /// Capture every materialized edge.
    ///
    /// Takes `&mut self` because collection local views are memoized lazily.
    pub fn snapshot(&mut self) -> GraphSnapshot {
        let mut owners: Vec<Identifier> = self.edges.keys().cloned().collect();
        owners.sort();

        let mut edges = Vec::with_capacity(self.edge_count());
        for owner in owners {
            let Some(fields) = self.edges.get_mut(&owner) else {
                continue;
            };
            let mut entries: Vec<_> = fields.iter_mut().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            for (field, edge) in entries {
                edges.push(EdgeSnapshot {
                    identifier: owner.to_string(),
                    field: field.to_string(),
                    kind: edge.kind(),
                    local: render(edge.local_view()),
                    remote: render(edge.remote_view()),
                    state: edge.state().copied(),
                });
            }
        }
        GraphSnapshot { edges }
    }
}
