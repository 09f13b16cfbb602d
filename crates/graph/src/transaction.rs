//! Remote batch tracking.
//!
//! Remote operations register every edge they touch and schedule collection
//! edges for a deferred local resync. [`crate::Graph::flush`] drains the
//! schedule once per ingestion batch.

use rustc_hash::FxHashSet;

use relgraph_core::{FieldName, Identifier};

use crate::edges::Edge;

/// Collection edge awaiting a local resync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledSync {
    /// Owner of the edge.
    pub identifier: Identifier,
    /// Field of the edge.
    pub field: FieldName,
    /// Local view before the first remote change of the batch.
    pub before: Vec<Identifier>,
}

/// Edges touched by the current remote batch.
#[derive(Debug)]
pub struct Transaction {
    generation: u64,
    touched: Vec<(Identifier, FieldName)>,
    scheduled: Vec<ScheduledSync>,
    scheduled_keys: FxHashSet<(Identifier, FieldName)>,
}

impl Default for Transaction {
    fn default() -> Self {
        Self {
            generation: 1,
            touched: Vec::new(),
            scheduled: Vec::new(),
            scheduled_keys: FxHashSet::default(),
        }
    }
}

impl Transaction {
    /// Start at the first generation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current batch generation.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Edges touched in this batch, in first-touch order.
    pub fn touched(&self) -> &[(Identifier, FieldName)] {
        &self.touched
    }

    /// Number of edges scheduled for resync.
    pub fn scheduled_len(&self) -> usize {
        self.scheduled.len()
    }

    /// Register `edge` as touched by this batch. Registering twice is a no-op.
    pub fn add(&mut self, edge: &mut Edge) {
        let generation = self.generation;
        let key = (edge.identifier().clone(), edge.meta().key.clone());
        if let Some(transaction_ref) = edge.transaction_ref_mut() {
            if *transaction_ref != generation {
                *transaction_ref = generation;
                self.touched.push(key);
            }
        }
    }

    /// Schedule a collection edge for resync, capturing its current local view.
    ///
    /// Must be called before the edge's remote state changes.
    pub fn schedule(&mut self, edge: &mut Edge) {
        self.add(edge);
        let key = (edge.identifier().clone(), edge.meta().key.clone());
        if self.scheduled_keys.contains(&key) {
            return;
        }
        let before = edge.local_view();
        self.scheduled_keys.insert(key.clone());
        self.scheduled.push(ScheduledSync {
            identifier: key.0,
            field: key.1,
            before,
        });
    }

    /// Whether the edge is awaiting resync.
    pub fn is_scheduled(&self, identifier: &Identifier, field: &str) -> bool {
        self.scheduled
            .iter()
            .any(|s| &s.identifier == identifier && &*s.field == field)
    }

    /// Drain the resync schedule.
    pub fn take_scheduled(&mut self) -> Vec<ScheduledSync> {
        self.scheduled_keys.clear();
        std::mem::take(&mut self.scheduled)
    }

    /// Close the batch. Returns how many edges it touched.
    pub fn finish(&mut self) -> usize {
        let touched = self.touched.len();
        self.touched.clear();
        self.scheduled.clear();
        self.scheduled_keys.clear();
        self.generation += 1;
        touched
    }

    /// Re-key entries of `old` to `new` after an identifier merge.
    pub fn rename(&mut self, old: &Identifier, new: &Identifier) {
        for (identifier, _) in self.touched.iter_mut() {
            if identifier == old {
                *identifier = new.clone();
            }
        }
        let mut seen = FxHashSet::default();
        self.scheduled.retain_mut(|s| {
            if &s.identifier == old {
                s.identifier = new.clone();
                for id in s.before.iter_mut() {
                    if id == old {
                        *id = new.clone();
                    }
                }
            }
            seen.insert((s.identifier.clone(), s.field.clone()))
        });
        self.scheduled_keys = seen;
    }

    /// Drop every entry owned by `identifier`.
    pub fn forget(&mut self, identifier: &Identifier) {
        self.touched.retain(|(id, _)| id != identifier);
        self.scheduled.retain(|s| &s.identifier != identifier);
        self.scheduled_keys.retain(|(id, _)| id != identifier);
    }
}
