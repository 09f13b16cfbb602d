//! Insertion-ordered identifier set.
//!
//! Backed by a `Vec` for order and an `FxHashSet` for O(1) membership, kept in
//! lockstep.

use rustc_hash::FxHashSet;

use relgraph_core::Identifier;

/// Set of identifiers that remembers insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderedSet {
    items: Vec<Identifier>,
    members: FxHashSet<Identifier>,
}

impl OrderedSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `identifier` if absent. Returns whether it was inserted.
    pub fn insert(&mut self, identifier: Identifier) -> bool {
        if self.members.insert(identifier.clone()) {
            self.items.push(identifier);
            true
        } else {
            false
        }
    }

    /// Remove `identifier`. Returns whether it was present.
    pub fn remove(&mut self, identifier: &Identifier) -> bool {
        if !self.members.remove(identifier) {
            return false;
        }
        if let Some(pos) = self.items.iter().position(|i| i == identifier) {
            self.items.remove(pos);
        }
        true
    }

    /// Membership test.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.members.contains(identifier)
    }

    /// Swap `old` for `new` at the same position.
    ///
    /// If `new` is already a member, `old` is simply removed. Returns whether
    /// `old` was present.
    pub fn replace(&mut self, old: &Identifier, new: &Identifier) -> bool {
        if !self.members.contains(old) {
            return false;
        }
        if self.members.contains(new) {
            return self.remove(old);
        }
        self.members.remove(old);
        self.members.insert(new.clone());
        if let Some(slot) = self.items.iter_mut().find(|i| *i == old) {
            *slot = new.clone();
        }
        true
    }

    /// Keep only the identifiers matching `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&Identifier) -> bool) {
        let members = &mut self.members;
        self.items.retain(|i| {
            let kept = keep(i);
            if !kept {
                members.remove(i);
            }
            kept
        });
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Members in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Identifier> {
        self.items.iter()
    }

    /// Members as an ordered slice.
    pub fn as_slice(&self) -> &[Identifier] {
        &self.items
    }
}

impl FromIterator<Identifier> for OrderedSet {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        let mut set = OrderedSet::new();
        for identifier in iter {
            set.insert(identifier);
        }
        set
    }
}

impl<'a> IntoIterator for &'a OrderedSet {
    type Item = &'a Identifier;
    type IntoIter = std::slice::Iter<'a, Identifier>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
