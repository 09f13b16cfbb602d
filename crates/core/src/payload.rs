//! Remote relationship payloads.
//!
//! A payload is the server's view of one relationship: optional membership
//! (`data`), optional `links` and optional `meta`. JSON:API style documents are
//! parsed with [`RelationshipPayload::from_json`], resolving resource
//! identifier objects through the store's [`IdentifierCache`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{GraphError, GraphResult};
use crate::identifier::{Identifier, IdentifierCache};

/// Membership carried by a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationshipData {
    /// Single-resource relationship; `None` is an explicit null.
    Single(Option<Identifier>),
    /// Collection relationship.
    Many(Vec<Identifier>),
}

impl RelationshipData {
    /// Whether the data denotes an empty relationship.
    pub fn is_empty(&self) -> bool {
        match self {
            RelationshipData::Single(value) => value.is_none(),
            RelationshipData::Many(values) => values.is_empty(),
        }
    }
}

/// Relationship links.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Links {
    /// Link to the relationship itself.
    #[serde(default, rename = "self", skip_serializing_if = "Option::is_none")]
    pub self_link: Option<String>,
    /// Link to the related resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<String>,
    /// First page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<String>,
    /// Previous page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<String>,
    /// Next page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    /// Last page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<String>,
}

impl Links {
    /// Links with only a `related` href.
    pub fn related(href: &str) -> Self {
        Links {
            related: Some(href.to_string()),
            ..Default::default()
        }
    }
}

/// Server-side state of one relationship.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationshipPayload {
    /// Membership, if the payload carried `data`.
    pub data: Option<RelationshipData>,
    /// Links, if present.
    pub links: Option<Links>,
    /// Meta, if present.
    pub meta: Option<Value>,
}

impl RelationshipPayload {
    /// Payload carrying a single related resource (or null).
    pub fn single(value: Option<Identifier>) -> Self {
        RelationshipPayload {
            data: Some(RelationshipData::Single(value)),
            ..Default::default()
        }
    }

    /// Payload carrying a collection.
    pub fn many(values: Vec<Identifier>) -> Self {
        RelationshipPayload {
            data: Some(RelationshipData::Many(values)),
            ..Default::default()
        }
    }

    /// Payload carrying only links.
    pub fn links_only(links: Links) -> Self {
        RelationshipPayload {
            links: Some(links),
            ..Default::default()
        }
    }

    /// Parse a JSON:API relationship object, resolving identifiers through `cache`.
    ///
    /// Resource identifier objects need a `type` and either an `id` or a `lid`
    /// already known to the cache.
    pub fn from_json(value: &Value, cache: &mut IdentifierCache) -> GraphResult<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| GraphError::invalid_payload("relationship must be an object"))?;

        let data = match object.get("data") {
            None => None,
            Some(Value::Null) => Some(RelationshipData::Single(None)),
            Some(Value::Array(items)) => {
                let identifiers = items
                    .iter()
                    .map(|item| resolve_identifier(item, cache))
                    .collect::<GraphResult<Vec<_>>>()?;
                Some(RelationshipData::Many(identifiers))
            }
            Some(item @ Value::Object(_)) => {
                Some(RelationshipData::Single(Some(resolve_identifier(item, cache)?)))
            }
            Some(other) => {
                return Err(GraphError::invalid_payload(format!(
                    "data must be null, an object or an array, got {}",
                    other
                )))
            }
        };

        let links = match object.get("links") {
            None | Some(Value::Null) => None,
            Some(links) => Some(
                serde_json::from_value::<Links>(links.clone())
                    .map_err(|e| GraphError::invalid_payload(e.to_string()))?,
            ),
        };

        let meta = object.get("meta").filter(|m| !m.is_null()).cloned();

        Ok(RelationshipPayload { data, links, meta })
    }
}

fn resolve_identifier(item: &Value, cache: &mut IdentifierCache) -> GraphResult<Identifier> {
    let resource_type = item
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| GraphError::invalid_payload("resource identifier is missing 'type'"))?;

    if let Some(id) = item.get("id") {
        let id = match id {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            other => {
                return Err(GraphError::invalid_payload(format!(
                    "resource identifier 'id' must be a string or number, got {}",
                    other
                )))
            }
        };
        return Ok(cache.get_or_create(resource_type, &id));
    }

    if let Some(lid) = item.get("lid").and_then(Value::as_str) {
        return cache
            .peek_lid(lid)
            .filter(|identifier| identifier.resource_type() == resource_type)
            .ok_or_else(|| GraphError::invalid_payload(format!("unknown lid '{}'", lid)));
    }

    Err(GraphError::invalid_payload(
        "resource identifier needs an 'id' or a 'lid'",
    ))
}
