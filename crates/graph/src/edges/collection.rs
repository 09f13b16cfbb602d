//! Unpaginated collection (hasMany) edge.

use rustc_hash::FxHashSet;
use serde_json::Value;

use relgraph_core::{Identifier, Links};

use super::{EdgeState, Related};
use crate::definitions::Resolved;
use crate::diff::{apply_local_order, compute_local_state};
use crate::ordered_set::OrderedSet;

/// Ordered collection with a remote view and pending local edits.
///
/// `remote_state` and `remote_members` always describe the same membership.
/// The local view is memoized and only recomputed while `is_dirty`.
/// Remote mutations leave the memo alone; it is resynced at flush.
/// A local bulk replace pins the local order until the next remote resync.
#[derive(Debug, Clone)]
pub struct CollectionEdge {
    /// Owner of the edge.
    pub identifier: Identifier,
    /// Resolved definition of the owning field.
    pub definition: Resolved,
    /// Load/data state flags.
    pub state: EdgeState,
    remote_members: FxHashSet<Identifier>,
    remote_state: Vec<Identifier>,
    additions: Option<OrderedSet>,
    removals: Option<OrderedSet>,
    local_order: Option<Vec<Identifier>>,
    local_state: Vec<Identifier>,
    is_dirty: bool,
    /// Relationship meta from the last payload.
    pub meta: Option<Value>,
    /// Relationship links from the last payload.
    pub links: Option<Links>,
    /// Generation of the remote batch that last touched this edge.
    pub transaction_ref: u64,
}

impl CollectionEdge {
    /// Create an edge that has received no data.
    pub fn new(identifier: Identifier, definition: Resolved) -> Self {
        Self {
            identifier,
            definition,
            state: EdgeState::default(),
            remote_members: FxHashSet::default(),
            remote_state: Vec::new(),
            additions: None,
            removals: None,
            local_order: None,
            local_state: Vec::new(),
            is_dirty: true,
            meta: None,
            links: None,
            transaction_ref: 0,
        }
    }

    /// Remote membership in server order.
    pub fn remote_state(&self) -> &[Identifier] {
        &self.remote_state
    }

    /// Remote membership set.
    pub fn remote_members(&self) -> &FxHashSet<Identifier> {
        &self.remote_members
    }

    /// Whether `identifier` is a remote member.
    pub fn remote_contains(&self, identifier: &Identifier) -> bool {
        self.remote_members.contains(identifier)
    }

    /// Pending local additions.
    pub fn additions(&self) -> Option<&OrderedSet> {
        self.additions.as_ref()
    }

    /// Pending local removals.
    pub fn removals(&self) -> Option<&OrderedSet> {
        self.removals.as_ref()
    }

    /// Whether there are pending local edits.
    pub fn has_local_changes(&self) -> bool {
        self.additions.is_some() || self.removals.is_some()
    }

    /// Order pinned by the last local bulk replace, if any.
    pub fn local_order(&self) -> Option<&[Identifier]> {
        self.local_order.as_deref()
    }

    /// Pin the local view to `order`. Membership still comes from the pending edits.
    pub fn set_local_order(&mut self, order: Vec<Identifier>) {
        self.local_order = Some(order);
        self.is_dirty = true;
    }

    /// Whether the local memo needs recomputing.
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Force the next read of the local view to recompute.
    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    /// Local view, recomputed only if dirty.
    pub fn local_state(&mut self) -> &[Identifier] {
        if self.is_dirty {
            let local = compute_local_state(
                &self.remote_state,
                self.additions.as_ref(),
                self.removals.as_ref(),
            );
            self.local_state = match &self.local_order {
                Some(order) => apply_local_order(local, order),
                None => local,
            };
            self.is_dirty = false;
        }
        &self.local_state
    }

    /// Whether `identifier` is in the local view.
    pub fn local_contains(&mut self, identifier: &Identifier) -> bool {
        self.local_state().contains(identifier)
    }

    /// Replace remote state wholesale. `members` must be deduplicated.
    pub fn set_remote(&mut self, members: Vec<Identifier>) {
        self.remote_members = members.iter().cloned().collect();
        self.remote_state = members;
        self.state.is_empty = self.remote_state.is_empty();
    }

    /// Append `identifier` to remote state. Returns whether it was added.
    pub fn add_remote(&mut self, identifier: &Identifier) -> bool {
        if !self.remote_members.insert(identifier.clone()) {
            return false;
        }
        self.remote_state.push(identifier.clone());
        self.state.is_empty = false;
        true
    }

    /// Remove `identifier` from remote state. Returns whether it was present.
    ///
    /// A remote removal settles any pending local edit for the same identifier.
    pub fn remove_remote(&mut self, identifier: &Identifier) -> bool {
        let removed = self.remote_members.remove(identifier);
        if removed {
            if let Some(pos) = self.remote_state.iter().position(|i| i == identifier) {
                self.remote_state.remove(pos);
            }
            self.state.is_empty = self.remote_state.is_empty();
        }
        Self::drop_from(&mut self.removals, identifier);
        Self::drop_from(&mut self.additions, identifier);
        removed
    }

    /// Add `identifier` to the local view. Returns whether the local view changed.
    pub fn add_local(&mut self, identifier: &Identifier) -> bool {
        let changed = if self.remote_members.contains(identifier) {
            Self::drop_from(&mut self.removals, identifier)
        } else {
            self.additions
                .get_or_insert_with(OrderedSet::new)
                .insert(identifier.clone())
        };
        if changed {
            if let Some(order) = self.local_order.as_mut() {
                order.retain(|i| i != identifier);
                order.push(identifier.clone());
            }
            self.is_dirty = true;
        }
        changed
    }

    /// Remove `identifier` from the local view. Returns whether the local view changed.
    pub fn remove_local(&mut self, identifier: &Identifier) -> bool {
        let changed = if Self::drop_from(&mut self.additions, identifier) {
            true
        } else if self.remote_members.contains(identifier) {
            self.removals
                .get_or_insert_with(OrderedSet::new)
                .insert(identifier.clone())
        } else {
            false
        };
        if changed {
            if let Some(order) = self.local_order.as_mut() {
                order.retain(|i| i != identifier);
            }
            self.is_dirty = true;
        }
        changed
    }

    fn drop_from(set: &mut Option<OrderedSet>, identifier: &Identifier) -> bool {
        let Some(inner) = set.as_mut() else {
            return false;
        };
        let removed = inner.remove(identifier);
        if inner.is_empty() {
            *set = None;
        }
        removed
    }

    /// Reconcile pending edits with the current remote state and recompute the local view.
    ///
    /// Additions the server now confirms and removals the server already
    /// applied are settled; the rest survive. A pinned local order is dropped
    /// when remote updates reset local state, and kept otherwise.
    pub fn sync_remote_to_local(&mut self) {
        if self.definition.meta.reset_on_remote_update {
            self.local_order = None;
        }
        let members = &self.remote_members;
        if let Some(additions) = self.additions.as_mut() {
            additions.retain(|id| !members.contains(id));
            if additions.is_empty() {
                self.additions = None;
            }
        }
        if let Some(removals) = self.removals.as_mut() {
            removals.retain(|id| members.contains(id));
            if removals.is_empty() {
                self.removals = None;
            }
        }
        self.is_dirty = true;
    }

    /// Drop pending removals. Returns what was dropped.
    pub(crate) fn take_removals(&mut self) -> Vec<Identifier> {
        self.removals
            .take()
            .map(|r| r.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Drop pending additions matching `discard`. Returns what was dropped.
    pub(crate) fn discard_additions(&mut self, mut discard: impl FnMut(&Identifier) -> bool) -> Vec<Identifier> {
        let mut dropped = Vec::new();
        if let Some(additions) = self.additions.as_mut() {
            additions.retain(|id| {
                if discard(id) {
                    dropped.push(id.clone());
                    false
                } else {
                    true
                }
            });
            if additions.is_empty() {
                self.additions = None;
            }
        }
        if !dropped.is_empty() {
            self.is_dirty = true;
        }
        dropped
    }

    pub(crate) fn related_identifiers(&self) -> Related {
        let mut seen: FxHashSet<&Identifier> = FxHashSet::default();
        let mut related = Related::new();
        let pending = self.additions.iter().flat_map(|a| a.iter());
        for id in self.remote_state.iter().chain(pending) {
            if seen.insert(id) {
                related.push(id.clone());
            }
        }
        related
    }

    /// Swap `old` for `new` in place everywhere. Returns whether `old` was locally visible.
    pub(crate) fn replace_identifier(&mut self, old: &Identifier, new: &Identifier) -> bool {
        let visible = self.local_contains(old);

        if self.remote_members.remove(old) {
            if self.remote_members.insert(new.clone()) {
                if let Some(slot) = self.remote_state.iter_mut().find(|i| *i == old) {
                    *slot = new.clone();
                }
            } else {
                self.remote_state.retain(|i| i != old);
            }
        }
        if let Some(additions) = self.additions.as_mut() {
            additions.replace(old, new);
        }
        if let Some(removals) = self.removals.as_mut() {
            removals.replace(old, new);
        }
        if let Some(order) = self.local_order.as_mut() {
            if order.contains(new) {
                order.retain(|i| i != old);
            } else if let Some(slot) = order.iter_mut().find(|i| *i == old) {
                *slot = new.clone();
            }
        }

        if visible {
            if self.local_state.contains(new) {
                self.local_state.retain(|i| i != old);
            } else if let Some(slot) = self.local_state.iter_mut().find(|i| *i == old) {
                *slot = new.clone();
            }
        }
        visible
    }

    /// Remove `value` from every container. Returns whether it was locally visible.
    pub(crate) fn scrub(&mut self, value: &Identifier) -> bool {
        let visible = self.local_contains(value);
        self.remove_remote(value);
        if let Some(order) = self.local_order.as_mut() {
            order.retain(|i| i != value);
        }
        if visible {
            self.local_state.retain(|i| i != value);
        }
        visible
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::DefinitionRegistry;
    use relgraph_core::{IdentifierCache, RelationshipSchema as R, ResourceType, Schema};
    use std::sync::Arc;

    fn setup(n: usize) -> (CollectionEdge, Vec<Identifier>) {
        let schema = Schema::new()
            .with_type("user", vec![R::has_many("pets", "pet").inverse("owner")])
            .with_type("pet", vec![R::belongs_to("owner", "user").inverse("pets")]);
        let mut registry = DefinitionRegistry::new(Arc::new(schema), true);
        let resolved = registry
            .definition_for(&ResourceType::new("user"), "pets")
            .unwrap();
        let mut cache = IdentifierCache::new();
        let user = cache.get_or_create("user", "1");
        let pets = (0..n)
            .map(|i| cache.get_or_create("pet", &i.to_string()))
            .collect();
        (CollectionEdge::new(user, resolved), pets)
    }

    #[test]
    fn local_add_then_remove_restores_remote_view() {
        let (mut edge, p) = setup(3);
        edge.set_remote(vec![p[0].clone(), p[1].clone()]);
        assert!(edge.add_local(&p[2]));
        assert_eq!(edge.local_state(), &[p[0].clone(), p[1].clone(), p[2].clone()]);
        assert!(edge.remove_local(&p[2]));
        assert!(!edge.has_local_changes());
        assert_eq!(edge.local_state(), &[p[0].clone(), p[1].clone()]);
    }

    #[test]
    fn local_edits_are_idempotent() {
        let (mut edge, p) = setup(2);
        edge.set_remote(vec![p[0].clone()]);
        assert!(!edge.add_local(&p[0]));
        assert!(!edge.remove_local(&p[1]));
        assert!(edge.remove_local(&p[0]));
        assert!(!edge.remove_local(&p[0]));
        assert!(edge.local_state().is_empty());
        assert!(edge.add_local(&p[0]));
        assert_eq!(edge.local_state(), &[p[0].clone()]);
    }

    #[test]
    fn remote_changes_wait_for_sync() {
        let (mut edge, p) = setup(2);
        edge.set_remote(vec![p[0].clone()]);
        assert_eq!(edge.local_state(), &[p[0].clone()]);
        edge.add_remote(&p[1]);
        assert_eq!(edge.local_state(), &[p[0].clone()]);
        edge.sync_remote_to_local();
        assert_eq!(edge.local_state(), &[p[0].clone(), p[1].clone()]);
    }

    #[test]
    fn sync_settles_confirmed_additions() {
        let (mut edge, p) = setup(2);
        edge.add_local(&p[0]);
        edge.add_local(&p[1]);
        edge.add_remote(&p[1]);
        edge.sync_remote_to_local();
        let additions: Vec<_> = edge.additions().unwrap().iter().cloned().collect();
        assert_eq!(additions, vec![p[0].clone()]);
        assert_eq!(edge.local_state(), &[p[1].clone(), p[0].clone()]);
    }

    #[test]
    fn remote_removal_settles_pending_edits() {
        let (mut edge, p) = setup(2);
        edge.set_remote(vec![p[0].clone()]);
        edge.remove_local(&p[0]);
        edge.add_local(&p[1]);
        edge.remove_remote(&p[0]);
        edge.remove_remote(&p[1]);
        assert!(!edge.has_local_changes());
    }

    #[test]
    fn replace_identifier_keeps_index() {
        let (mut edge, p) = setup(4);
        edge.set_remote(vec![p[0].clone(), p[1].clone(), p[2].clone()]);
        assert!(edge.replace_identifier(&p[1], &p[3]));
        assert_eq!(edge.remote_state(), &[p[0].clone(), p[3].clone(), p[2].clone()]);
        assert_eq!(edge.local_state(), &[p[0].clone(), p[3].clone(), p[2].clone()]);
    }

    #[test]
    fn pinned_order_survives_local_edits() {
        let (mut edge, p) = setup(4);
        edge.set_remote(vec![p[0].clone(), p[1].clone(), p[2].clone()]);
        edge.set_local_order(vec![p[2].clone(), p[0].clone(), p[1].clone()]);
        assert_eq!(edge.local_state(), &[p[2].clone(), p[0].clone(), p[1].clone()]);

        edge.add_local(&p[3]);
        edge.remove_local(&p[0]);
        assert_eq!(edge.local_state(), &[p[2].clone(), p[1].clone(), p[3].clone()]);
        assert_eq!(edge.local_order().unwrap(), &[p[2].clone(), p[1].clone(), p[3].clone()]);
    }

    #[test]
    fn sync_drops_pinned_order_when_resetting() {
        let (mut edge, p) = setup(2);
        edge.set_remote(vec![p[0].clone(), p[1].clone()]);
        edge.set_local_order(vec![p[1].clone(), p[0].clone()]);
        assert_eq!(edge.local_state(), &[p[1].clone(), p[0].clone()]);
        edge.sync_remote_to_local();
        assert!(edge.local_order().is_none());
        assert_eq!(edge.local_state(), &[p[0].clone(), p[1].clone()]);
    }

    #[test]
    fn scrub_removes_everywhere() {
        let (mut edge, p) = setup(2);
        edge.set_remote(vec![p[0].clone()]);
        edge.add_local(&p[1]);
        assert!(edge.scrub(&p[1]));
        assert!(edge.scrub(&p[0]));
        assert!(edge.local_state().is_empty());
        assert!(edge.remote_state().is_empty());
        assert!(!edge.scrub(&p[0]));
    }
}
