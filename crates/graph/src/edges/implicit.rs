//! Implicit (inverse-only) edge.
//!
//! Records "these resources point at me through a field with no declared
//! inverse" so cleanup can find them. Unordered, and local/remote are plain sets.

use rustc_hash::FxHashSet;

use relgraph_core::Identifier;

use super::Related;
use crate::definitions::Resolved;

/// Unordered back-reference set.
#[derive(Debug, Clone)]
pub struct ImplicitEdge {
    /// Owner of the edge.
    pub identifier: Identifier,
    /// Resolved definition of the synthesized field.
    pub definition: Resolved,
    /// Members visible locally.
    pub local_members: FxHashSet<Identifier>,
    /// Members confirmed remotely.
    pub remote_members: FxHashSet<Identifier>,
}

impl ImplicitEdge {
    /// Create an empty edge.
    pub fn new(identifier: Identifier, definition: Resolved) -> Self {
        Self {
            identifier,
            definition,
            local_members: FxHashSet::default(),
            remote_members: FxHashSet::default(),
        }
    }

    /// Record a back-reference. Remote additions are visible locally too.
    pub fn add(&mut self, value: &Identifier, is_remote: bool) -> bool {
        if is_remote {
            self.remote_members.insert(value.clone());
        }
        self.local_members.insert(value.clone())
    }

    /// Drop a back-reference. Remote removals drop the local view as well.
    pub fn remove(&mut self, value: &Identifier, is_remote: bool) -> bool {
        if is_remote {
            self.remote_members.remove(value);
        }
        self.local_members.remove(value)
    }

    fn sorted(set: &FxHashSet<Identifier>) -> Vec<Identifier> {
        let mut members: Vec<Identifier> = set.iter().cloned().collect();
        members.sort();
        members
    }

    /// Local members ordered by identifier.
    pub fn local_view(&self) -> Vec<Identifier> {
        Self::sorted(&self.local_members)
    }

    /// Remote members ordered by identifier.
    pub fn remote_view(&self) -> Vec<Identifier> {
        Self::sorted(&self.remote_members)
    }

    pub(crate) fn related_identifiers(&self) -> Related {
        let mut related: Related = self.local_view().into_iter().collect();
        for id in self.remote_view() {
            if !self.local_members.contains(&id) {
                related.push(id);
            }
        }
        related
    }

    pub(crate) fn replace_identifier(&mut self, old: &Identifier, new: &Identifier) -> bool {
        if self.remote_members.remove(old) {
            self.remote_members.insert(new.clone());
        }
        if self.local_members.remove(old) {
            self.local_members.insert(new.clone());
            return true;
        }
        false
    }

    pub(crate) fn scrub(&mut self, value: &Identifier) -> bool {
        self.remote_members.remove(value);
        self.local_members.remove(value)
    }
}
