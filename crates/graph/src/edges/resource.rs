//! Single-resource (belongsTo) edge.

use serde_json::Value;

use relgraph_core::{Identifier, Links};

use super::{EdgeState, Related};
use crate::definitions::Resolved;

/// Edge pointing at zero or one resource.
#[derive(Debug, Clone)]
pub struct ResourceEdge {
    /// Owner of the edge.
    pub identifier: Identifier,
    /// Resolved definition of the owning field.
    pub definition: Resolved,
    /// Load/data state flags.
    pub state: EdgeState,
    /// Edited-or-synced current value.
    pub local_state: Option<Identifier>,
    /// Last value confirmed by the server.
    pub remote_state: Option<Identifier>,
    /// Relationship meta from the last payload.
    pub meta: Option<Value>,
    /// Relationship links from the last payload.
    pub links: Option<Links>,
    /// Generation of the remote batch that last touched this edge.
    pub transaction_ref: u64,
}

impl ResourceEdge {
    /// Create an edge that has received no data.
    pub fn new(identifier: Identifier, definition: Resolved) -> Self {
        Self {
            identifier,
            definition,
            state: EdgeState::default(),
            local_state: None,
            remote_state: None,
            meta: None,
            links: None,
            transaction_ref: 0,
        }
    }

    /// Whether local and remote disagree.
    pub fn is_diverged(&self) -> bool {
        self.local_state != self.remote_state
    }

    pub(crate) fn related_identifiers(&self) -> Related {
        let mut related = Related::new();
        if let Some(local) = &self.local_state {
            related.push(local.clone());
        }
        if let Some(remote) = &self.remote_state {
            if self.local_state.as_ref() != Some(remote) {
                related.push(remote.clone());
            }
        }
        related
    }

    /// Swap `old` for `new` in both views. Returns whether `old` was the local value.
    pub(crate) fn replace_identifier(&mut self, old: &Identifier, new: &Identifier) -> bool {
        if self.remote_state.as_ref() == Some(old) {
            self.remote_state = Some(new.clone());
        }
        if self.local_state.as_ref() == Some(old) {
            self.local_state = Some(new.clone());
            return true;
        }
        false
    }

    /// Drop `value` from both views. Returns whether it was the local value.
    pub(crate) fn scrub(&mut self, value: &Identifier) -> bool {
        if self.remote_state.as_ref() == Some(value) {
            self.remote_state = None;
        }
        if self.local_state.as_ref() == Some(value) {
            self.local_state = None;
            self.state.is_empty = true;
            return true;
        }
        false
    }
}
