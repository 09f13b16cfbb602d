//! Paginated collection edge.
//!
//! Remote membership is partitioned into named pages plus an unpaged bucket.
//! The aggregate remote state is every page in load order followed by the
//! unpaged bucket, and is mirrored into the inner [`CollectionEdge`] so the
//! local/remote machinery is shared with plain collections. Local additions
//! not yet placed on any page live in the inner edge's additions.

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use relgraph_core::{Identifier, Links};

use super::collection::CollectionEdge;

/// One loaded page.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Page key, e.g. a cursor or page number.
    pub key: String,
    /// Members in server order.
    pub members: Vec<Identifier>,
    /// Page links.
    pub links: Option<Links>,
    /// Page meta.
    pub meta: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Bucket {
    Page(String),
    Unpaged,
}

/// Membership change caused by a page update.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageChange {
    /// Identifiers that entered the aggregate.
    pub added: Vec<Identifier>,
    /// Identifiers that left the aggregate.
    pub removed: Vec<Identifier>,
    /// Whether the aggregate membership or order changed.
    pub changed: bool,
    /// Duplicate entries dropped from the incoming page.
    pub duplicates: usize,
}

/// Collection edge whose remote state arrives page by page.
#[derive(Debug, Clone)]
pub struct PaginatedEdge {
    /// Shared collection state; its remote view is the page aggregate.
    pub inner: CollectionEdge,
    pages: Vec<Page>,
    unpaged: Vec<Identifier>,
    placement: FxHashMap<Identifier, Bucket>,
}

impl PaginatedEdge {
    /// Wrap an empty collection edge.
    pub fn new(inner: CollectionEdge) -> Self {
        Self {
            inner,
            pages: Vec::new(),
            unpaged: Vec::new(),
            placement: FxHashMap::default(),
        }
    }

    /// Loaded pages in load order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Page by key.
    pub fn page(&self, key: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.key == key)
    }

    /// Members not assigned to any page.
    pub fn unpaged(&self) -> &[Identifier] {
        &self.unpaged
    }

    fn aggregate(&self) -> Vec<Identifier> {
        self.pages
            .iter()
            .flat_map(|p| p.members.iter())
            .chain(self.unpaged.iter())
            .cloned()
            .collect()
    }

    fn rebuild(&mut self) {
        let aggregate = self.aggregate();
        self.inner.set_remote(aggregate);
    }

    fn take_from_bucket(&mut self, identifier: &Identifier) {
        match self.placement.remove(identifier) {
            Some(Bucket::Page(key)) => {
                if let Some(page) = self.pages.iter_mut().find(|p| p.key == key) {
                    page.members.retain(|i| i != identifier);
                }
            }
            Some(Bucket::Unpaged) => self.unpaged.retain(|i| i != identifier),
            None => {}
        }
    }

    /// Replace the members of page `key`, creating it after the last page if new.
    ///
    /// Members claimed from other pages or the unpaged bucket move here, so no
    /// identifier is ever in two buckets.
    pub fn replace_page(
        &mut self,
        key: &str,
        members: &[Identifier],
        links: Option<Links>,
        meta: Option<Value>,
    ) -> PageChange {
        let prior = self.inner.remote_state().to_vec();
        let prior_set: FxHashSet<Identifier> = prior.iter().cloned().collect();

        let mut incoming: Vec<Identifier> = Vec::with_capacity(members.len());
        let mut incoming_set: FxHashSet<Identifier> = FxHashSet::default();
        let mut change = PageChange::default();
        for id in members {
            if incoming_set.insert(id.clone()) {
                incoming.push(id.clone());
            } else {
                change.duplicates += 1;
            }
        }

        let previous_members = self
            .page(key)
            .map(|p| p.members.clone())
            .unwrap_or_default();
        for id in &previous_members {
            if !incoming_set.contains(id) {
                self.placement.remove(id);
                change.removed.push(id.clone());
            }
        }
        for id in &incoming {
            let here = matches!(self.placement.get(id), Some(Bucket::Page(k)) if k == key);
            if !here {
                self.take_from_bucket(id);
            }
            self.placement.insert(id.clone(), Bucket::Page(key.to_string()));
            if !prior_set.contains(id) {
                change.added.push(id.clone());
            }
        }

        match self.pages.iter_mut().find(|p| p.key == key) {
            Some(page) => {
                page.members = incoming;
                page.links = links;
                page.meta = meta;
            }
            None => self.pages.push(Page {
                key: key.to_string(),
                members: incoming,
                links,
                meta,
            }),
        }

        self.rebuild();
        change.changed = self.inner.remote_state() != prior.as_slice();
        change
    }

    /// Drop page `key`. Returns the members that left the aggregate.
    pub fn remove_page(&mut self, key: &str) -> Vec<Identifier> {
        let Some(pos) = self.pages.iter().position(|p| p.key == key) else {
            return Vec::new();
        };
        let page = self.pages.remove(pos);
        for id in &page.members {
            self.placement.remove(id);
        }
        self.rebuild();
        page.members
    }

    /// Clear all pages and hold `members` (deduplicated) in the unpaged bucket.
    pub fn reset_unpaged(&mut self, members: Vec<Identifier>) {
        self.pages.clear();
        self.placement = members
            .iter()
            .map(|id| (id.clone(), Bucket::Unpaged))
            .collect();
        self.unpaged = members;
        self.rebuild();
    }

    /// Append one remote member to the unpaged bucket. Returns whether it was new.
    pub fn add_remote(&mut self, identifier: &Identifier) -> bool {
        if self.placement.contains_key(identifier) {
            return false;
        }
        self.placement.insert(identifier.clone(), Bucket::Unpaged);
        self.unpaged.push(identifier.clone());
        self.inner.add_remote(identifier)
    }

    /// Remove one remote member from whichever bucket holds it.
    pub fn remove_remote(&mut self, identifier: &Identifier) -> bool {
        self.take_from_bucket(identifier);
        self.inner.remove_remote(identifier)
    }

    /// Swap `old` for `new` in every bucket, keeping positions.
    pub(crate) fn replace_identifier(&mut self, old: &Identifier, new: &Identifier) -> bool {
        if let Some(bucket) = self.placement.remove(old) {
            if self.placement.contains_key(new) {
                match bucket {
                    Bucket::Page(key) => {
                        if let Some(page) = self.pages.iter_mut().find(|p| p.key == key) {
                            page.members.retain(|i| i != old);
                        }
                    }
                    Bucket::Unpaged => self.unpaged.retain(|i| i != old),
                }
            } else {
                let slot = match &bucket {
                    Bucket::Page(key) => self
                        .pages
                        .iter_mut()
                        .find(|p| &p.key == key)
                        .and_then(|p| p.members.iter_mut().find(|i| *i == old)),
                    Bucket::Unpaged => self.unpaged.iter_mut().find(|i| *i == old),
                };
                if let Some(slot) = slot {
                    *slot = new.clone();
                }
                self.placement.insert(new.clone(), bucket);
            }
        }
        self.inner.replace_identifier(old, new)
    }

    pub(crate) fn scrub(&mut self, value: &Identifier) -> bool {
        self.take_from_bucket(value);
        self.inner.scrub(value)
    }
}
