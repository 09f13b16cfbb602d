//! Resource schema input consumed by the edge definition registry.
//!
//! The graph never parses raw schema documents on its own; it is handed
//! normalized relationship declarations through the [`SchemaSource`] trait.
//! [`Schema`] is the in-crate implementation, buildable in code or from JSON.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

/// Declared kind of a relationship field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationshipKind {
    /// Points at zero or one resource.
    BelongsTo,
    /// Unpaginated ordered collection.
    HasMany,
    /// Paginated ordered collection.
    Collection,
}

/// Kind of a stored edge. Adds the schema-less implicit kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeKind {
    /// Single-resource edge.
    BelongsTo,
    /// Unpaginated collection edge.
    HasMany,
    /// Paginated collection edge.
    Collection,
    /// Inverse-only bookkeeping edge with no declared field.
    Implicit,
}

impl EdgeKind {
    /// Whether the edge holds an ordered collection.
    pub fn is_collection(self) -> bool {
        matches!(self, EdgeKind::HasMany | EdgeKind::Collection)
    }
}

impl From<RelationshipKind> for EdgeKind {
    fn from(kind: RelationshipKind) -> Self {
        match kind {
            RelationshipKind::BelongsTo => EdgeKind::BelongsTo,
            RelationshipKind::HasMany => EdgeKind::HasMany,
            RelationshipKind::Collection => EdgeKind::Collection,
        }
    }
}

impl fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EdgeKind::BelongsTo => "belongsTo",
            EdgeKind::HasMany => "hasMany",
            EdgeKind::Collection => "collection",
            EdgeKind::Implicit => "implicit",
        };
        f.write_str(name)
    }
}

fn default_true() -> bool {
    true
}

/// One relationship declaration on a resource type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipSchema {
    /// Declared kind.
    pub kind: RelationshipKind,
    /// Field name on the owning type.
    pub name: String,
    /// Related resource type, or abstract trait name when polymorphic.
    #[serde(rename = "type")]
    pub related_type: String,
    /// Inverse field on the related type; `None` means no declared inverse.
    #[serde(default)]
    pub inverse: Option<String>,
    /// Whether the relationship is loaded asynchronously.
    #[serde(default, rename = "async")]
    pub is_async: bool,
    /// Whether the related type is an abstract trait.
    #[serde(default)]
    pub polymorphic: bool,
    /// Abstract trait this field's owner implements for the inverse side.
    #[serde(default, rename = "as", skip_serializing_if = "Option::is_none")]
    pub implements: Option<String>,
    /// Whether remote updates discard pending local edits.
    #[serde(default = "default_true")]
    pub reset_on_remote_update: bool,
}

impl RelationshipSchema {
    fn new(kind: RelationshipKind, name: &str, related_type: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
            related_type: related_type.to_string(),
            inverse: None,
            is_async: false,
            polymorphic: false,
            implements: None,
            reset_on_remote_update: true,
        }
    }

    /// Declare a belongs-to field.
    pub fn belongs_to(name: &str, related_type: &str) -> Self {
        Self::new(RelationshipKind::BelongsTo, name, related_type)
    }

    /// Declare an unpaginated has-many field.
    pub fn has_many(name: &str, related_type: &str) -> Self {
        Self::new(RelationshipKind::HasMany, name, related_type)
    }

    /// Declare a paginated collection field.
    pub fn collection(name: &str, related_type: &str) -> Self {
        Self::new(RelationshipKind::Collection, name, related_type)
    }

    /// Set the inverse field name.
    pub fn inverse(mut self, inverse: &str) -> Self {
        self.inverse = Some(inverse.to_string());
        self
    }

    /// Mark the relationship as async.
    pub fn async_(mut self) -> Self {
        self.is_async = true;
        self
    }

    /// Mark the related type as an abstract trait.
    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }

    /// Declare that the owner implements `trait_name` for the inverse side.
    pub fn implements(mut self, trait_name: &str) -> Self {
        self.implements = Some(trait_name.to_string());
        self
    }

    /// Keep pending local edits when remote updates arrive.
    pub fn keep_local_on_remote_update(mut self) -> Self {
        self.reset_on_remote_update = false;
        self
    }
}

/// Relationship declarations of one resource type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Declared relationship fields.
    #[serde(default)]
    pub relationships: Vec<RelationshipSchema>,
    /// Abstract traits this type implements.
    #[serde(default)]
    pub traits: Vec<String>,
}

/// Normalized schema metadata the registry reads from.
pub trait SchemaSource: Send + Sync {
    /// Relationship declaration for `resource_type.field`, if any.
    fn relationship(&self, resource_type: &str, field: &str) -> Option<&RelationshipSchema>;

    /// Whether `resource_type` is a declared type.
    fn has_type(&self, resource_type: &str) -> bool;

    /// Whether concrete `resource_type` implements abstract `trait_name`.
    fn implements(&self, resource_type: &str, trait_name: &str) -> bool;

    /// First concrete type declaring `field` as an implementation of `trait_name`.
    fn find_implementer(
        &self,
        trait_name: &str,
        field: &str,
    ) -> Option<(&str, &RelationshipSchema)>;
}

/// Map of resource type to its declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    types: BTreeMap<String, ResourceSchema>,
}

impl Schema {
    /// Create an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`Schema::register_type`].
    pub fn with_type(mut self, resource_type: &str, relationships: Vec<RelationshipSchema>) -> Self {
        self.register_type(resource_type, relationships);
        self
    }

    /// Declare that `resource_type` implements an abstract trait.
    pub fn with_trait(mut self, resource_type: &str, trait_name: &str) -> Self {
        self.types
            .entry(resource_type.to_string())
            .or_default()
            .traits
            .push(trait_name.to_string());
        self
    }

    /// Add (or extend) a resource type with relationship declarations.
    pub fn register_type(&mut self, resource_type: &str, relationships: Vec<RelationshipSchema>) {
        self.types
            .entry(resource_type.to_string())
            .or_default()
            .relationships
            .extend(relationships);
    }

    /// Parse a schema from a JSON document of the form
    /// `{"user": {"relationships": [...], "traits": [...]}}`.
    pub fn from_json(json: &str) -> GraphResult<Self> {
        serde_json::from_str(json).map_err(|e| GraphError::Schema(e.to_string()))
    }

    /// Declarations for one type.
    pub fn resource(&self, resource_type: &str) -> Option<&ResourceSchema> {
        self.types.get(resource_type)
    }

    /// Declared type names, sorted.
    pub fn resource_types(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl SchemaSource for Schema {
    fn relationship(&self, resource_type: &str, field: &str) -> Option<&RelationshipSchema> {
        self.types
            .get(resource_type)?
            .relationships
            .iter()
            .find(|r| r.name == field)
    }

    fn has_type(&self, resource_type: &str) -> bool {
        self.types.contains_key(resource_type)
    }

    fn implements(&self, resource_type: &str, trait_name: &str) -> bool {
        self.types.get(resource_type).map_or(false, |t| {
            t.traits.iter().any(|name| name == trait_name)
                || t
                    .relationships
                    .iter()
                    .any(|r| r.implements.as_deref() == Some(trait_name))
        })
    }

    fn find_implementer(
        &self,
        trait_name: &str,
        field: &str,
    ) -> Option<(&str, &RelationshipSchema)> {
        self.types.iter().find_map(|(name, t)| {
            t.relationships
                .iter()
                .find(|r| r.name == field && r.implements.as_deref() == Some(trait_name))
                .map(|r| (name.as_str(), r))
        })
    }
}
