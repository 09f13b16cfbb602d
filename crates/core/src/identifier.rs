//! Resource identifiers and the store-scoped identifier cache.
//!
//! An [`Identifier`] is an opaque, stable handle for one logical resource. Two
//! identifiers are equal only if they were allocated as the same handle by the
//! same [`IdentifierCache`]; the graph relies on nothing else besides the
//! resource type carried alongside the handle.
//!
//! There is no process-wide registry. Every cache draws a random namespace
//! when created and stamps it on each identifier it allocates, so identifiers
//! from independent stores (for example, one per test) never compare equal.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Resource type tag, e.g. `"user"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceType(Arc<str>);

impl ResourceType {
    /// Create a resource type tag.
    pub fn new(name: impl AsRef<str>) -> Self {
        ResourceType(Arc::from(name.as_ref()))
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ResourceType {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ResourceType {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ResourceType {
    fn from(s: &str) -> Self {
        ResourceType::new(s)
    }
}

impl From<String> for ResourceType {
    fn from(s: String) -> Self {
        ResourceType(Arc::from(s))
    }
}

impl PartialEq<str> for ResourceType {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

/// Field (relationship) name on a resource type.
pub type FieldName = Arc<str>;

/// Stable handle for one logical resource.
///
/// Equality and hashing use the owning cache's namespace and the allocation handle.
#[derive(Clone)]
pub struct Identifier {
    namespace: u128,
    handle: u64,
    resource_type: ResourceType,
}

impl Identifier {
    /// Resource type of the identified resource.
    pub fn resource_type(&self) -> &ResourceType {
        &self.resource_type
    }

    /// Allocation handle, unique within the owning cache.
    pub fn handle(&self) -> u64 {
        self.handle
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && self.namespace == other.namespace
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.handle.hash(state);
    }
}

impl PartialOrd for Identifier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Identifier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.handle
            .cmp(&other.handle)
            .then(self.namespace.cmp(&other.namespace))
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.resource_type, self.handle)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.resource_type, self.handle)
    }
}

/// Bookkeeping kept by the cache for each identifier.
#[derive(Debug, Clone)]
struct IdentifierRecord {
    identifier: Identifier,
    /// Primary key; `None` until the resource is persisted.
    id: Option<String>,
    /// Client-local key, stable for the identifier's lifetime.
    lid: String,
}

/// Outcome of [`IdentifierCache::assign_id`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdAssignment {
    /// The primary key was recorded on the identifier.
    Assigned,
    /// Another identifier already owns `(type, id)`; the caller should merge
    /// the assigned identifier into `existing`.
    Collision {
        /// Identifier that already owns the primary key.
        existing: Identifier,
    },
}

/// Allocates identifiers and maps `(type, id)` and client keys to them.
#[derive(Debug)]
pub struct IdentifierCache {
    namespace: u128,
    next_handle: u64,
    records: FxHashMap<u64, IdentifierRecord>,
    by_key: FxHashMap<(ResourceType, String), Identifier>,
    by_lid: FxHashMap<String, Identifier>,
}

impl Default for IdentifierCache {
    fn default() -> Self {
        Self {
            namespace: uuid::Uuid::new_v4().as_u128(),
            next_handle: 0,
            records: FxHashMap::default(),
            by_key: FxHashMap::default(),
            by_lid: FxHashMap::default(),
        }
    }
}

impl IdentifierCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, identifier: &Identifier) -> Option<&IdentifierRecord> {
        self.records
            .get(&identifier.handle)
            .filter(|r| r.identifier == *identifier)
    }

    /// Number of live identifiers.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the cache holds no identifiers.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn allocate(&mut self, resource_type: ResourceType, id: Option<String>) -> Identifier {
        self.next_handle += 1;
        let identifier = Identifier {
            namespace: self.namespace,
            handle: self.next_handle,
            resource_type,
        };
        let lid = format!("@lid:{}-{}", identifier.resource_type, uuid::Uuid::new_v4());
        self.by_lid.insert(lid.clone(), identifier.clone());
        self.records.insert(
            identifier.handle,
            IdentifierRecord {
                identifier: identifier.clone(),
                id,
                lid,
            },
        );
        identifier
    }

    /// Return the identifier for a server-known resource, allocating one on first use.
    pub fn get_or_create(&mut self, resource_type: impl Into<ResourceType>, id: &str) -> Identifier {
        let resource_type = resource_type.into();
        let key = (resource_type.clone(), id.to_string());
        if let Some(existing) = self.by_key.get(&key) {
            return existing.clone();
        }
        let identifier = self.allocate(resource_type, Some(id.to_string()));
        self.by_key.insert(key, identifier.clone());
        identifier
    }

    /// Allocate an identifier for a client-created resource with no primary key yet.
    pub fn create_local(&mut self, resource_type: impl Into<ResourceType>) -> Identifier {
        self.allocate(resource_type.into(), None)
    }

    /// Look up an identifier by type and primary key without allocating.
    pub fn peek(&self, resource_type: &str, id: &str) -> Option<Identifier> {
        self.by_key
            .get(&(ResourceType::new(resource_type), id.to_string()))
            .cloned()
    }

    /// Look up an identifier by its client-local key.
    pub fn peek_lid(&self, lid: &str) -> Option<Identifier> {
        self.by_lid.get(lid).cloned()
    }

    /// Primary key of the identifier, if persisted.
    pub fn id_of(&self, identifier: &Identifier) -> Option<&str> {
        self.record(identifier).and_then(|r| r.id.as_deref())
    }

    /// Client-local key of the identifier.
    pub fn client_key_of(&self, identifier: &Identifier) -> Option<&str> {
        self.record(identifier).map(|r| r.lid.as_str())
    }

    /// Whether the identifier has no primary key yet.
    pub fn is_new(&self, identifier: &Identifier) -> bool {
        self.record(identifier).map_or(false, |r| r.id.is_none())
    }

    /// Whether the identifier is live in this cache.
    pub fn contains(&self, identifier: &Identifier) -> bool {
        self.record(identifier)
            .map_or(false, |r| r.identifier.resource_type == identifier.resource_type)
    }

    /// Record the primary key assigned to `identifier` by the server.
    ///
    /// Returns [`IdAssignment::Collision`] if a different identifier already owns
    /// the key; nothing is changed in that case.
    pub fn assign_id(&mut self, identifier: &Identifier, id: &str) -> GraphResult<IdAssignment> {
        let key = (identifier.resource_type.clone(), id.to_string());
        if let Some(existing) = self.by_key.get(&key) {
            if existing == identifier {
                return Ok(IdAssignment::Assigned);
            }
            return Ok(IdAssignment::Collision {
                existing: existing.clone(),
            });
        }

        let record = self
            .records
            .get_mut(&identifier.handle)
            .filter(|r| r.identifier == *identifier)
            .ok_or_else(|| GraphError::UnknownIdentifier(identifier.to_string()))?;
        if let Some(previous) = record.id.replace(id.to_string()) {
            self.by_key
                .remove(&(identifier.resource_type.clone(), previous));
        }
        self.by_key.insert(key, identifier.clone());
        Ok(IdAssignment::Assigned)
    }

    /// Drop the identifier from the cache.
    pub fn forget(&mut self, identifier: &Identifier) {
        if self.record(identifier).is_none() {
            return;
        }
        if let Some(record) = self.records.remove(&identifier.handle) {
            self.by_lid.remove(&record.lid);
            if let Some(id) = record.id {
                let key = (record.identifier.resource_type.clone(), id);
                if self.by_key.get(&key) == Some(identifier) {
                    self.by_key.remove(&key);
                }
            }
        }
    }
}
