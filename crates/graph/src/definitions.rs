//! Edge definition registry.
//!
//! Resolves `(resource type, field)` to normalized relationship metadata and
//! memoizes the result. Definitions are built in pairs: resolving one side of
//! a relationship populates the other side too, so both ends share one
//! [`EdgeDefinition`]. A field declared with no inverse gets a synthesized
//! implicit inverse, keyed `implicit-<type>:<field>`, so every relationship
//! stays trackable from both ends.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{trace, warn};

use relgraph_core::{
    EdgeKind, FieldName, GraphError, GraphResult, Identifier, RelationshipSchema, ResourceType,
    SchemaSource,
};

const IMPLICIT_PREFIX: &str = "implicit-";

/// Normalized metadata for one side of a relationship.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpgradedMeta {
    /// Edge kind on this side.
    pub kind: EdgeKind,
    /// Field name on the owner.
    pub key: FieldName,
    /// Owner type; an abstract trait name when this side is shared by implementers.
    pub owner_type: ResourceType,
    /// Related type, or abstract trait name when polymorphic.
    pub related_type: ResourceType,
    /// Whether this side loads asynchronously.
    pub is_async: bool,
    /// Whether the related type is an abstract trait.
    pub is_polymorphic: bool,
    /// Whether this side is a synthesized implicit edge.
    pub is_implicit: bool,
    /// Whether remote updates discard pending local edits. Synced across both sides.
    pub reset_on_remote_update: bool,
    /// Edge kind of the inverse side.
    pub inverse_kind: EdgeKind,
    /// Field name of the inverse side.
    pub inverse_key: FieldName,
    /// Owner type of the inverse side.
    pub inverse_type: ResourceType,
    /// Whether the inverse side loads asynchronously.
    pub inverse_is_async: bool,
    /// Whether the inverse side is polymorphic.
    pub inverse_is_polymorphic: bool,
    /// Whether the inverse side is implicit.
    pub inverse_is_implicit: bool,
}

/// Both sides of one logical relationship.
#[derive(Debug, PartialEq, Eq)]
pub struct EdgeDefinition {
    /// Side that was resolved first.
    pub lhs: Arc<UpgradedMeta>,
    /// The other side. Same allocation as `lhs` when reflexive.
    pub rhs: Arc<UpgradedMeta>,
    /// Both sides are owned by the same type.
    pub is_self_referential: bool,
    /// The field is its own inverse (`user.bestFriend <-> user.bestFriend`).
    pub is_reflexive: bool,
}

/// A definition together with the side that applies to the asking field.
#[derive(Debug, Clone)]
pub struct Resolved {
    /// Shared pair definition.
    pub definition: Arc<EdgeDefinition>,
    /// Metadata of the asking side.
    pub meta: Arc<UpgradedMeta>,
}

impl Resolved {
    fn lhs(definition: &Arc<EdgeDefinition>) -> Self {
        Resolved {
            definition: definition.clone(),
            meta: definition.lhs.clone(),
        }
    }

    fn rhs(definition: &Arc<EdgeDefinition>) -> Self {
        Resolved {
            definition: definition.clone(),
            meta: definition.rhs.clone(),
        }
    }

    /// The opposite side of the same definition.
    pub fn inverse(&self) -> Resolved {
        if Arc::ptr_eq(&self.meta, &self.definition.lhs) {
            Resolved::rhs(&self.definition)
        } else {
            Resolved::lhs(&self.definition)
        }
    }
}

/// Intermediate description of one side before pairing.
#[derive(Debug, Clone)]
struct Side {
    kind: EdgeKind,
    key: FieldName,
    owner_type: ResourceType,
    related_type: ResourceType,
    is_async: bool,
    is_polymorphic: bool,
    is_implicit: bool,
    reset_on_remote_update: bool,
}

impl Side {
    fn declared(rel: &RelationshipSchema, owner_type: ResourceType) -> Self {
        Side {
            kind: rel.kind.into(),
            key: FieldName::from(rel.name.as_str()),
            owner_type,
            related_type: ResourceType::new(&rel.related_type),
            is_async: rel.is_async,
            is_polymorphic: rel.polymorphic,
            is_implicit: false,
            reset_on_remote_update: rel.reset_on_remote_update,
        }
    }

    fn implicit_for(lhs: &Side) -> Self {
        Side {
            kind: EdgeKind::Implicit,
            key: FieldName::from(implicit_key(&lhs.owner_type, &lhs.key)),
            owner_type: lhs.related_type.clone(),
            related_type: lhs.owner_type.clone(),
            is_async: false,
            is_polymorphic: false,
            is_implicit: true,
            reset_on_remote_update: lhs.reset_on_remote_update,
        }
    }

    fn upgrade(&self, other: &Side, reset_on_remote_update: bool) -> UpgradedMeta {
        UpgradedMeta {
            kind: self.kind,
            key: self.key.clone(),
            owner_type: self.owner_type.clone(),
            related_type: self.related_type.clone(),
            is_async: self.is_async,
            is_polymorphic: self.is_polymorphic,
            is_implicit: self.is_implicit,
            reset_on_remote_update,
            inverse_kind: other.kind,
            inverse_key: other.key.clone(),
            inverse_type: other.owner_type.clone(),
            inverse_is_async: other.is_async,
            inverse_is_polymorphic: other.is_polymorphic,
            inverse_is_implicit: other.is_implicit,
        }
    }
}

fn implicit_key(owner_type: &ResourceType, field: &str) -> String {
    format!("{}{}:{}", IMPLICIT_PREFIX, owner_type, field)
}

fn pair(lhs: &Side, rhs: &Side) -> Arc<EdgeDefinition> {
    let reset = lhs.reset_on_remote_update && rhs.reset_on_remote_update;
    let is_self_referential = lhs.owner_type == rhs.owner_type;
    let is_reflexive = is_self_referential && lhs.key == rhs.key;
    let lhs_meta = Arc::new(lhs.upgrade(rhs, reset));
    let rhs_meta = if is_reflexive {
        lhs_meta.clone()
    } else {
        Arc::new(rhs.upgrade(lhs, reset))
    };
    Arc::new(EdgeDefinition {
        lhs: lhs_meta,
        rhs: rhs_meta,
        is_self_referential,
        is_reflexive,
    })
}

/// Memoizing resolver from `(type, field)` to [`Resolved`] definitions.
pub struct DefinitionRegistry {
    schema: Arc<dyn SchemaSource>,
    strict: bool,
    cache: FxHashMap<ResourceType, FxHashMap<FieldName, Resolved>>,
    implicit: FxHashMap<FieldName, Resolved>,
    /// Concrete type -> abstract types it was accepted for.
    polymorphic_types: FxHashMap<ResourceType, FxHashSet<ResourceType>>,
}

impl DefinitionRegistry {
    /// Create a registry reading from `schema`.
    pub fn new(schema: Arc<dyn SchemaSource>, strict: bool) -> Self {
        Self {
            schema,
            strict,
            cache: FxHashMap::default(),
            implicit: FxHashMap::default(),
            polymorphic_types: FxHashMap::default(),
        }
    }

    /// Whether checked assertions run.
    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Whether `field` names a synthesized implicit inverse.
    pub fn is_implicit_key(field: &str) -> bool {
        field.starts_with(IMPLICIT_PREFIX)
    }

    fn cached(&self, resource_type: &str, field: &str) -> Option<Resolved> {
        self.cache.get(resource_type)?.get(field).cloned()
    }

    fn insert(&mut self, resource_type: &ResourceType, field: &FieldName, resolved: Resolved) {
        self.cache
            .entry(resource_type.clone())
            .or_default()
            .insert(field.clone(), resolved);
    }

    /// Resolve the definition for `resource_type.field`.
    pub fn definition_for(&mut self, resource_type: &ResourceType, field: &str) -> GraphResult<Resolved> {
        if let Some(found) = self.cached(resource_type.as_str(), field) {
            return Ok(found);
        }

        if Self::is_implicit_key(field) {
            return self
                .implicit
                .get(field)
                .cloned()
                .ok_or_else(|| GraphError::unknown_field(resource_type.as_str(), field));
        }

        let declared = self.schema.relationship(resource_type.as_str(), field).cloned();
        let Some(rel) = declared else {
            return self.resolve_alias(resource_type, field);
        };

        let resolved = match rel.inverse.clone() {
            None => self.resolve_implicit(resource_type, &rel),
            Some(inverse) => self.resolve_explicit(resource_type, &rel, &inverse)?,
        };
        trace!(
            target: "relgraph::graph",
            resource_type = %resource_type,
            field,
            kind = %resolved.meta.kind,
            inverse = %resolved.meta.inverse_key,
            "resolved edge definition"
        );
        Ok(resolved)
    }

    /// Unknown field: fall back to abstract types this concrete type was accepted for.
    fn resolve_alias(&mut self, resource_type: &ResourceType, field: &str) -> GraphResult<Resolved> {
        let found = self.polymorphic_types.get(resource_type).and_then(|aliases| {
            let mut aliases: Vec<&ResourceType> = aliases.iter().collect();
            aliases.sort();
            aliases
                .into_iter()
                .find_map(|alias| self.cached(alias.as_str(), field))
        });
        match found {
            Some(resolved) => {
                let key = resolved.meta.key.clone();
                self.insert(resource_type, &key, resolved.clone());
                Ok(resolved)
            }
            None => Err(GraphError::unknown_field(resource_type.as_str(), field)),
        }
    }

    fn resolve_implicit(&mut self, resource_type: &ResourceType, rel: &RelationshipSchema) -> Resolved {
        let lhs = Side::declared(rel, resource_type.clone());
        let rhs = Side::implicit_for(&lhs);
        let definition = pair(&lhs, &rhs);
        let resolved = Resolved::lhs(&definition);
        self.insert(resource_type, &lhs.key, resolved.clone());
        self.implicit.insert(rhs.key.clone(), Resolved::rhs(&definition));
        resolved
    }

    fn resolve_explicit(
        &mut self,
        resource_type: &ResourceType,
        rel: &RelationshipSchema,
        inverse: &str,
    ) -> GraphResult<Resolved> {
        let field = rel.name.as_str();
        let related = ResourceType::new(&rel.related_type);

        // An implementer of an abstract trait shares the trait-owned side.
        let lhs_owner = match &rel.implements {
            Some(trait_name) => ResourceType::new(trait_name),
            None => resource_type.clone(),
        };

        if let Some(existing) = self.cached(related.as_str(), inverse) {
            if &*existing.meta.inverse_key == field {
                let ours = existing.inverse();
                let key = ours.meta.key.clone();
                self.insert(resource_type, &key, ours.clone());
                if lhs_owner != *resource_type {
                    self.insert(&lhs_owner, &key, ours.clone());
                }
                return Ok(ours);
            }
        }

        let lhs = Side::declared(rel, lhs_owner.clone());

        let rhs_rel = if rel.polymorphic || !self.schema.has_type(related.as_str()) {
            self.schema
                .find_implementer(related.as_str(), inverse)
                .map(|(_, r)| r.clone())
                .or_else(|| self.schema.relationship(related.as_str(), inverse).cloned())
        } else {
            self.schema.relationship(related.as_str(), inverse).cloned()
        }
        .ok_or_else(|| {
            GraphError::missing_inverse(
                related.as_str(),
                inverse,
                format!("{}.{}", resource_type, field),
            )
        })?;

        if self.strict && rhs_rel.inverse.as_deref() != Some(field) {
            return Err(GraphError::InverseMismatch {
                resource_type: related.to_string(),
                field: inverse.to_string(),
                declared: rhs_rel.inverse.clone().unwrap_or_else(|| "null".to_string()),
                expected: field.to_string(),
            });
        }

        let rhs = Side::declared(&rhs_rel, related.clone());
        let definition = pair(&lhs, &rhs);
        let resolved = Resolved::lhs(&definition);
        self.insert(resource_type, &lhs.key, resolved.clone());
        if lhs_owner != *resource_type {
            self.insert(&lhs_owner, &lhs.key, resolved.clone());
        }
        if !definition.is_reflexive {
            self.insert(&related, &rhs.key, Resolved::rhs(&definition));
        }
        Ok(resolved)
    }

    /// Check that `value` may be stored in an edge described by `meta`.
    ///
    /// Accepted mismatching types are registered as polymorphic aliases of the
    /// declared type so their inverse definitions resolve through it.
    pub fn check_assignable(&mut self, meta: &UpgradedMeta, value: &Identifier) -> GraphResult<()> {
        let actual = value.resource_type();
        if meta.is_implicit || *actual == meta.related_type {
            return Ok(());
        }

        let already_accepted = self
            .polymorphic_types
            .get(actual)
            .map_or(false, |aliases| aliases.contains(&meta.related_type));
        if already_accepted {
            return Ok(());
        }

        let compatible = meta.is_polymorphic
            && self
                .schema
                .implements(actual.as_str(), meta.related_type.as_str());
        if !compatible {
            if self.strict {
                return Err(GraphError::incompatible_type(
                    meta.owner_type.as_str(),
                    &*meta.key,
                    meta.related_type.as_str(),
                    actual.as_str(),
                ));
            }
            warn!(
                target: "relgraph::graph",
                owner = %meta.owner_type,
                field = %meta.key,
                expected = %meta.related_type,
                actual = %actual,
                "accepting related resource of incompatible type"
            );
        }

        self.register_polymorphic_type(actual, &meta.related_type);
        Ok(())
    }

    /// Record that `concrete` is accepted wherever `abstract_type` is declared.
    pub fn register_polymorphic_type(&mut self, concrete: &ResourceType, abstract_type: &ResourceType) {
        self.polymorphic_types
            .entry(concrete.clone())
            .or_default()
            .insert(abstract_type.clone());
    }
}

impl std::fmt::Debug for DefinitionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefinitionRegistry")
            .field("strict", &self.strict)
            .field("types", &self.cache.len())
            .field("implicit", &self.implicit.len())
            .finish()
    }
}
