//! Edge variants.
//!
//! One [`Edge`] is stored per `(identifier, field)`. The variant is chosen by
//! the field's resolved kind when the edge is first materialized.

pub mod collection;
pub mod implicit;
pub mod paginated;
pub mod resource;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use relgraph_core::{EdgeKind, Identifier};

use crate::definitions::{Resolved, UpgradedMeta};

pub use collection::CollectionEdge;
pub use implicit::ImplicitEdge;
pub use paginated::{Page, PageChange, PaginatedEdge};
pub use resource::ResourceEdge;

/// Scratch list of related identifiers.
pub type Related = SmallVec<[Identifier; 4]>;

/// Load and data flags of a declared edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeState {
    /// Any payload or remote operation has set the edge's data.
    pub has_received_data: bool,
    /// The edge currently holds no related resource.
    pub is_empty: bool,
    /// Links changed without data; the edge should be reloaded.
    pub is_stale: bool,
    /// The last load attempt failed.
    pub has_failed_load_attempt: bool,
    /// A related resource was unloaded while still referenced.
    pub has_dematerialized_inverse: bool,
}

impl Default for EdgeState {
    fn default() -> Self {
        Self {
            has_received_data: false,
            is_empty: true,
            is_stale: false,
            has_failed_load_attempt: false,
            has_dematerialized_inverse: false,
        }
    }
}

impl EdgeState {
    /// Record that authoritative data arrived.
    pub fn received(&mut self, is_empty: bool) {
        self.has_received_data = true;
        self.is_empty = is_empty;
        self.is_stale = false;
        self.has_failed_load_attempt = false;
        self.has_dematerialized_inverse = false;
    }
}

/// Stored relationship state for one `(identifier, field)`.
#[derive(Debug, Clone)]
pub enum Edge {
    /// belongsTo
    Resource(ResourceEdge),
    /// hasMany
    Collection(CollectionEdge),
    /// paginated hasMany
    Paginated(PaginatedEdge),
    /// inverse-only bookkeeping
    Implicit(ImplicitEdge),
}

impl Edge {
    /// Materialize an empty edge of the kind `definition` describes.
    pub fn new(identifier: Identifier, definition: Resolved) -> Self {
        match definition.meta.kind {
            EdgeKind::BelongsTo => Edge::Resource(ResourceEdge::new(identifier, definition)),
            EdgeKind::HasMany => Edge::Collection(CollectionEdge::new(identifier, definition)),
            EdgeKind::Collection => Edge::Paginated(PaginatedEdge::new(CollectionEdge::new(
                identifier, definition,
            ))),
            EdgeKind::Implicit => Edge::Implicit(ImplicitEdge::new(identifier, definition)),
        }
    }

    /// Edge kind.
    pub fn kind(&self) -> EdgeKind {
        self.meta().kind
    }

    /// Owner of the edge.
    pub fn identifier(&self) -> &Identifier {
        match self {
            Edge::Resource(e) => &e.identifier,
            Edge::Collection(e) => &e.identifier,
            Edge::Paginated(e) => &e.inner.identifier,
            Edge::Implicit(e) => &e.identifier,
        }
    }

    /// Resolved definition.
    pub fn definition(&self) -> &Resolved {
        match self {
            Edge::Resource(e) => &e.definition,
            Edge::Collection(e) => &e.definition,
            Edge::Paginated(e) => &e.inner.definition,
            Edge::Implicit(e) => &e.definition,
        }
    }

    /// Metadata of the owning side.
    pub fn meta(&self) -> &UpgradedMeta {
        &self.definition().meta
    }

    /// State flags; implicit edges have none.
    pub fn state(&self) -> Option<&EdgeState> {
        match self {
            Edge::Resource(e) => Some(&e.state),
            Edge::Collection(e) => Some(&e.state),
            Edge::Paginated(e) => Some(&e.inner.state),
            Edge::Implicit(_) => None,
        }
    }

    /// Mutable state flags; implicit edges have none.
    pub fn state_mut(&mut self) -> Option<&mut EdgeState> {
        match self {
            Edge::Resource(e) => Some(&mut e.state),
            Edge::Collection(e) => Some(&mut e.state),
            Edge::Paginated(e) => Some(&mut e.inner.state),
            Edge::Implicit(_) => None,
        }
    }

    /// Whether the edge ever received authoritative data.
    pub fn has_received_data(&self) -> bool {
        self.state().map_or(false, |s| s.has_received_data)
    }

    /// Collection state of hasMany and paginated edges.
    pub fn collection(&self) -> Option<&CollectionEdge> {
        match self {
            Edge::Collection(e) => Some(e),
            Edge::Paginated(e) => Some(&e.inner),
            _ => None,
        }
    }

    /// Mutable collection state of hasMany and paginated edges.
    pub fn collection_mut(&mut self) -> Option<&mut CollectionEdge> {
        match self {
            Edge::Collection(e) => Some(e),
            Edge::Paginated(e) => Some(&mut e.inner),
            _ => None,
        }
    }

    pub(crate) fn transaction_ref_mut(&mut self) -> Option<&mut u64> {
        match self {
            Edge::Resource(e) => Some(&mut e.transaction_ref),
            Edge::Collection(e) => Some(&mut e.transaction_ref),
            Edge::Paginated(e) => Some(&mut e.inner.transaction_ref),
            Edge::Implicit(_) => None,
        }
    }

    /// Append one remote member to a collection edge.
    pub(crate) fn add_remote_member(&mut self, identifier: &Identifier) -> bool {
        match self {
            Edge::Collection(e) => e.add_remote(identifier),
            Edge::Paginated(e) => e.add_remote(identifier),
            _ => false,
        }
    }

    /// Remove one remote member from a collection edge.
    pub(crate) fn remove_remote_member(&mut self, identifier: &Identifier) -> bool {
        match self {
            Edge::Collection(e) => e.remove_remote(identifier),
            Edge::Paginated(e) => e.remove_remote(identifier),
            _ => false,
        }
    }

    /// Replace a collection edge's remote state wholesale. Paginated edges lose their pages.
    pub(crate) fn set_collection_remote(&mut self, members: Vec<Identifier>) {
        match self {
            Edge::Collection(e) => e.set_remote(members),
            Edge::Paginated(e) => e.reset_unpaged(members),
            _ => {}
        }
    }

    /// Local view.
    pub fn local_view(&mut self) -> Vec<Identifier> {
        match self {
            Edge::Resource(e) => e.local_state.iter().cloned().collect(),
            Edge::Collection(e) => e.local_state().to_vec(),
            Edge::Paginated(e) => e.inner.local_state().to_vec(),
            Edge::Implicit(e) => e.local_view(),
        }
    }

    /// Remote view.
    pub fn remote_view(&self) -> Vec<Identifier> {
        match self {
            Edge::Resource(e) => e.remote_state.iter().cloned().collect(),
            Edge::Collection(e) => e.remote_state().to_vec(),
            Edge::Paginated(e) => e.inner.remote_state().to_vec(),
            Edge::Implicit(e) => e.remote_view(),
        }
    }

    /// Whether `value` is in the local view.
    pub fn local_contains(&mut self, value: &Identifier) -> bool {
        match self {
            Edge::Resource(e) => e.local_state.as_ref() == Some(value),
            Edge::Collection(e) => e.local_contains(value),
            Edge::Paginated(e) => e.inner.local_contains(value),
            Edge::Implicit(e) => e.local_members.contains(value),
        }
    }

    /// Whether `value` is in the remote view.
    pub fn remote_contains(&self, value: &Identifier) -> bool {
        match self {
            Edge::Resource(e) => e.remote_state.as_ref() == Some(value),
            Edge::Collection(e) => e.remote_contains(value),
            Edge::Paginated(e) => e.inner.remote_contains(value),
            Edge::Implicit(e) => e.remote_members.contains(value),
        }
    }

    /// Every identifier referenced by either view or pending edits.
    pub fn related_identifiers(&self) -> Related {
        match self {
            Edge::Resource(e) => e.related_identifiers(),
            Edge::Collection(e) => e.related_identifiers(),
            Edge::Paginated(e) => e.inner.related_identifiers(),
            Edge::Implicit(e) => e.related_identifiers(),
        }
    }

    /// Re-point the edge at a new owner.
    pub(crate) fn set_identifier(&mut self, identifier: Identifier) {
        match self {
            Edge::Resource(e) => e.identifier = identifier,
            Edge::Collection(e) => e.identifier = identifier,
            Edge::Paginated(e) => e.inner.identifier = identifier,
            Edge::Implicit(e) => e.identifier = identifier,
        }
    }

    /// Swap `old` for `new` in every container. Returns whether `old` was locally visible.
    pub(crate) fn replace_identifier(&mut self, old: &Identifier, new: &Identifier) -> bool {
        match self {
            Edge::Resource(e) => e.replace_identifier(old, new),
            Edge::Collection(e) => e.replace_identifier(old, new),
            Edge::Paginated(e) => e.replace_identifier(old, new),
            Edge::Implicit(e) => e.replace_identifier(old, new),
        }
    }

    /// Remove `value` from every container. Returns whether it was locally visible.
    pub(crate) fn scrub(&mut self, value: &Identifier) -> bool {
        match self {
            Edge::Resource(e) => e.scrub(value),
            Edge::Collection(e) => e.scrub(value),
            Edge::Paginated(e) => e.scrub(value),
            Edge::Implicit(e) => e.scrub(value),
        }
    }
}
