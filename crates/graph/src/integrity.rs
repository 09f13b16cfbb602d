//! Unload and reciprocity checks.
//!
//! Unloading walks only the unloaded identifier's own edges. Implicit edges
//! exist so that relationships the identifier's schema never declared are
//! still reachable from its side.

use rustc_hash::FxHashSet;
use tracing::debug;

use relgraph_core::{FieldName, Identifier};

use crate::edges::Edge;
use crate::graph::Graph;

/// Which view of an edge a violation was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// The locally observable view.
    Local,
    /// The server-confirmed view.
    Remote,
}

/// An edge references a resource whose inverse edge does not reference it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReciprocityViolation {
    /// Owner of the edge holding the dangling reference.
    pub identifier: Identifier,
    /// Field of that edge.
    pub field: FieldName,
    /// Referenced resource.
    pub related: Identifier,
    /// Field on `related` expected to point back.
    pub inverse_field: FieldName,
    /// View the reference was found in.
    pub view: View,
}

impl std::fmt::Display for ReciprocityViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{} -> {} is missing from {}.{} ({:?})",
            self.identifier, self.field, self.related, self.related, self.inverse_field, self.view
        )
    }
}

impl Graph {
    /// Remove every edge owned by `identifier` and scrub it from related edges.
    ///
    /// Related edges that still showed `identifier` locally are notified.
    /// Notifications are delivered before returning.
    pub fn unload(&mut self, identifier: &Identifier) {
        let Some(fields) = self.edges.remove(identifier) else {
            self.forget_pending(identifier);
            return;
        };
        let mut fields: Vec<(FieldName, Edge)> = fields.into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        let count = fields.len();

        for (_, edge) in &fields {
            let inverse_key = &edge.meta().inverse_key;
            for related in edge.related_identifiers() {
                if &related != identifier {
                    self.scrub_reference(&related, inverse_key, identifier);
                }
            }
        }

        self.transaction.forget(identifier);
        self.forget_pending(identifier);
        self.new_records.remove(identifier);
        debug!(
            target: "relgraph::graph",
            identifier = %identifier,
            fields = count,
            "unloaded identifier"
        );
        self.deliver();
    }

    /// Every reference whose inverse edge does not point back.
    ///
    /// The remote view is reciprocal after every operation. The local view of
    /// a collection only catches up with remote changes at [`Graph::flush`],
    /// so check it after flushing.
    pub fn verify_reciprocity(&mut self) -> Vec<ReciprocityViolation> {
        let mut owners: Vec<Identifier> = self.edges.keys().cloned().collect();
        owners.sort();

        let mut references: Vec<(Identifier, FieldName, FieldName, View, Vec<Identifier>)> = Vec::new();
        for owner in &owners {
            let Some(fields) = self.edges.get_mut(owner) else {
                continue;
            };
            let mut keys: Vec<FieldName> = fields.keys().cloned().collect();
            keys.sort();
            for key in keys {
                let Some(edge) = fields.get_mut(&key) else {
                    continue;
                };
                let inverse_key = edge.meta().inverse_key.clone();
                references.push((owner.clone(), key.clone(), inverse_key.clone(), View::Local, edge.local_view()));
                references.push((owner.clone(), key, inverse_key, View::Remote, edge.remote_view()));
            }
        }

        let mut violations = Vec::new();
        let mut checked: FxHashSet<(Identifier, FieldName, Identifier, View)> = FxHashSet::default();
        for (owner, field, inverse_field, view, related) in references {
            for r in related {
                if !checked.insert((owner.clone(), field.clone(), r.clone(), view)) {
                    continue;
                }
                let reciprocal = match self.edges.get_mut(&r).and_then(|f| f.get_mut(&inverse_field)) {
                    Some(inverse) => match view {
                        View::Local => inverse.local_contains(&owner),
                        View::Remote => inverse.remote_contains(&owner),
                    },
                    None => false,
                };
                if !reciprocal {
                    violations.push(ReciprocityViolation {
                        identifier: owner.clone(),
                        field: field.clone(),
                        related: r,
                        inverse_field: inverse_field.clone(),
                        view,
                    });
                }
            }
        }
        violations
    }
}
