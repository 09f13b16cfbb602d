//! Local/remote diff engine.
//!
//! [`diff_collection`] compares an incoming ordered membership list with a
//! prior one in a single two-pointer walk. [`compute_local_state`] derives the
//! local view of a collection from its remote state and pending local edits.

use rustc_hash::FxHashSet;

use relgraph_core::Identifier;

use crate::ordered_set::OrderedSet;

/// Result of comparing an incoming collection with its prior state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionDiff {
    /// New members, in incoming order.
    pub added: Vec<Identifier>,
    /// Members no longer present, in prior order.
    pub removed: Vec<Identifier>,
    /// Deduplicated incoming list.
    pub final_state: Vec<Identifier>,
    /// Membership of `final_state`.
    pub final_set: FxHashSet<Identifier>,
    /// Whether membership or order changed.
    pub changed: bool,
    /// Number of duplicate entries dropped from the incoming list.
    pub duplicates: usize,
}

/// Diff `incoming` against `prior_state`/`prior_members`.
///
/// Duplicates in `incoming` are dropped, first occurrence wins. Reordering
/// with unchanged membership still counts as a change.
pub fn diff_collection(
    incoming: &[Identifier],
    prior_state: &[Identifier],
    prior_members: &FxHashSet<Identifier>,
) -> CollectionDiff {
    let new_members: FxHashSet<&Identifier> = incoming.iter().collect();
    let mut diff = CollectionDiff {
        final_state: Vec::with_capacity(incoming.len()),
        ..Default::default()
    };

    let len = incoming.len().max(prior_state.len());
    for i in 0..len {
        if let Some(id) = incoming.get(i) {
            if diff.final_set.insert(id.clone()) {
                diff.final_state.push(id.clone());
                if !prior_members.contains(id) {
                    diff.added.push(id.clone());
                    diff.changed = true;
                }
            } else {
                diff.duplicates += 1;
            }
        }
        if let Some(old) = prior_state.get(i) {
            if !new_members.contains(old) {
                diff.removed.push(old.clone());
                diff.changed = true;
            }
        }
    }

    // Same membership: order is still observable.
    if !diff.changed && diff.final_state.as_slice() != prior_state {
        diff.changed = true;
    }
    diff
}

/// `(remote \ removals)` followed by the additions not already in it, in insertion order.
pub fn compute_local_state(
    remote_state: &[Identifier],
    additions: Option<&OrderedSet>,
    removals: Option<&OrderedSet>,
) -> Vec<Identifier> {
    let mut local: Vec<Identifier> = match removals {
        Some(removals) if !removals.is_empty() => remote_state
            .iter()
            .filter(|id| !removals.contains(id))
            .cloned()
            .collect(),
        _ => remote_state.to_vec(),
    };

    if let Some(additions) = additions {
        if !additions.is_empty() {
            let present: FxHashSet<Identifier> = local.iter().cloned().collect();
            local.extend(additions.iter().filter(|id| !present.contains(*id)).cloned());
        }
    }
    local
}

/// Rearrange `local` so members named in `order` come first, in that order.
///
/// Members missing from `order` keep their relative position after them;
/// entries of `order` that are no longer members are skipped.
pub fn apply_local_order(local: Vec<Identifier>, order: &[Identifier]) -> Vec<Identifier> {
    let members: FxHashSet<&Identifier> = local.iter().collect();
    let mut placed: FxHashSet<&Identifier> = FxHashSet::default();
    let mut ordered: Vec<Identifier> = Vec::with_capacity(local.len());
    for id in order {
        if members.contains(id) && placed.insert(id) {
            ordered.push(id.clone());
        }
    }
    for id in &local {
        if !placed.contains(id) {
            ordered.push(id.clone());
        }
    }
    ordered
}
