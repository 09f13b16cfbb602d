//! Reciprocal mutations on the inverse side of a relationship.
//!
//! `add_to_inverse` may displace a belongsTo occupant and detach it through
//! `remove_from_inverse`. `remove_from_inverse` never recurses, so reciprocal
//! chains stop after one step.

use smallvec::SmallVec;

use relgraph_core::{FieldName, GraphResult, Identifier};

use crate::edges::Edge;
use crate::graph::{materialize, Graph};

impl Graph {
    /// Record `value` on `target.key`, the inverse of one of `value`'s fields.
    pub(crate) fn add_to_inverse(
        &mut self,
        target: &Identifier,
        key: &FieldName,
        value: &Identifier,
        is_remote: bool,
    ) -> GraphResult<()> {
        let edge = materialize(&mut self.edges, &mut self.registry, target, key)?;
        let mut detach: SmallVec<[(Identifier, bool); 2]> = SmallVec::new();
        let mut changed = false;

        if is_remote && !edge.meta().is_implicit && !edge.kind().is_collection() {
            self.transaction.add(edge);
        }

        if edge.kind().is_collection() {
            if is_remote {
                if !edge.remote_contains(value) {
                    self.transaction.schedule(edge);
                    edge.add_remote_member(value);
                } else {
                    self.transaction.add(edge);
                }
            } else if let Some(collection) = edge.collection_mut() {
                changed = collection.add_local(value);
            }
        } else {
            match edge {
                Edge::Resource(e) => {
                    if is_remote && e.remote_state.as_ref() != Some(value) {
                        if let Some(old) = e.remote_state.replace(value.clone()) {
                            detach.push((old, true));
                        }
                        e.state.received(false);
                    }
                    if e.local_state.as_ref() != Some(value) {
                        if let Some(old) = e.local_state.replace(value.clone()) {
                            if !detach.iter().any(|(d, _)| d == &old) {
                                detach.push((old, false));
                            }
                        }
                        e.state.is_empty = false;
                        changed = true;
                    }
                }
                Edge::Implicit(e) => {
                    e.add(value, is_remote);
                }
                Edge::Collection(_) | Edge::Paginated(_) => {}
            }
        }

        let inverse_key = edge.meta().inverse_key.clone();
        for (old, remote) in detach {
            self.remove_from_inverse(&old, &inverse_key, target, remote);
        }
        if changed {
            self.notify_change(target, key);
        }
        Ok(())
    }

    /// Drop `value` from `target.key` if that edge exists.
    pub(crate) fn remove_from_inverse(
        &mut self,
        target: &Identifier,
        key: &FieldName,
        value: &Identifier,
        is_remote: bool,
    ) {
        let Some(edge) = self.edges.get_mut(target).and_then(|f| f.get_mut(&**key)) else {
            return;
        };
        let mut changed = false;

        if edge.kind().is_collection() {
            if is_remote {
                if edge.remote_contains(value) {
                    self.transaction.schedule(edge);
                    edge.remove_remote_member(value);
                }
            } else if let Some(collection) = edge.collection_mut() {
                changed = collection.remove_local(value);
            }
        } else {
            if is_remote {
                self.transaction.add(edge);
            }
            match edge {
                Edge::Resource(e) => {
                    if is_remote && e.remote_state.as_ref() == Some(value) {
                        e.remote_state = None;
                    }
                    if e.local_state.as_ref() == Some(value) {
                        e.local_state = None;
                        e.state.is_empty = true;
                        changed = true;
                    }
                }
                Edge::Implicit(e) => {
                    e.remove(value, is_remote);
                }
                Edge::Collection(_) | Edge::Paginated(_) => {}
            }
        }

        if changed {
            self.notify_change(target, key);
        }
    }

    /// Remove every trace of `value` from `target.key`, notifying if it was locally visible.
    pub(crate) fn scrub_reference(&mut self, target: &Identifier, key: &FieldName, value: &Identifier) {
        let Some(edge) = self.edges.get_mut(target).and_then(|f| f.get_mut(&**key)) else {
            return;
        };
        let visible = edge.scrub(value);
        if visible && edge.meta().is_async {
            if let Some(state) = edge.state_mut() {
                state.has_dematerialized_inverse = true;
            }
        }
        if visible {
            self.notify_change(target, key);
        }
    }
}
