//! Error type shared by the relationship graph crates.
//!
//! Schema and usage mistakes (an operation aimed at the wrong kind of edge, a
//! field the schema never declared) are surfaced as [`GraphError`] values rather
//! than panics. Tolerated data shapes (duplicates, already-present members) are
//! never errors.

use thiserror::Error;

use crate::schema::EdgeKind;

/// Errors raised by the relationship graph.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// The resource type does not declare a relationship with this name.
    #[error("no relationship schema found for '{resource_type}.{field}'")]
    UnknownField {
        /// Resource type that was asked for the field.
        resource_type: String,
        /// Field name that could not be resolved.
        field: String,
    },

    /// A declared inverse could not be located on the related type.
    #[error(
        "expected a relationship schema for '{resource_type}.{field}' to be the inverse of '{inverse_of}', but none was found"
    )]
    MissingInverse {
        /// Related type expected to carry the inverse.
        resource_type: String,
        /// Inverse field name.
        field: String,
        /// `type.field` of the relationship that named this inverse.
        inverse_of: String,
    },

    /// Both sides declare inverses, but they do not point at each other.
    #[error("'{resource_type}.{field}' declares inverse '{declared}', expected '{expected}'")]
    InverseMismatch {
        /// Type declaring the disagreeing field.
        resource_type: String,
        /// The disagreeing field.
        field: String,
        /// Inverse it declares.
        declared: String,
        /// Inverse it should declare.
        expected: String,
    },

    /// An operation was applied to an edge of the wrong kind.
    #[error("operation '{operation}' cannot be applied to {kind} relationship '{resource_type}.{field}'")]
    KindMismatch {
        /// Operation name.
        operation: &'static str,
        /// Kind of the edge that was found.
        kind: EdgeKind,
        /// Owner resource type.
        resource_type: String,
        /// Field name.
        field: String,
    },

    /// A related resource's type is not assignable to the relationship.
    #[error(
        "the '{actual}' type does not implement '{expected}' and thus cannot be assigned to the '{field}' relationship in '{resource_type}'"
    )]
    IncompatibleType {
        /// Owner resource type.
        resource_type: String,
        /// Field name.
        field: String,
        /// Declared related type (or abstract trait).
        expected: String,
        /// Concrete type that was supplied.
        actual: String,
    },

    /// Identifier is not known to the identifier cache.
    #[error("unknown identifier '{0}'")]
    UnknownIdentifier(String),

    /// A relationship payload could not be interpreted.
    #[error("invalid relationship payload: {0}")]
    InvalidPayload(String),

    /// Graph options could not be parsed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A schema document could not be parsed.
    #[error("invalid schema: {0}")]
    Schema(String),
}

impl GraphError {
    /// Field not declared on a type.
    pub fn unknown_field(resource_type: impl Into<String>, field: impl Into<String>) -> Self {
        GraphError::UnknownField {
            resource_type: resource_type.into(),
            field: field.into(),
        }
    }

    /// Inverse named by `inverse_of` not found at `resource_type.field`.
    pub fn missing_inverse(
        resource_type: impl Into<String>,
        field: impl Into<String>,
        inverse_of: impl Into<String>,
    ) -> Self {
        GraphError::MissingInverse {
            resource_type: resource_type.into(),
            field: field.into(),
            inverse_of: inverse_of.into(),
        }
    }

    /// Operation applied to an edge of the wrong kind.
    pub fn kind_mismatch(
        operation: &'static str,
        kind: EdgeKind,
        resource_type: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        GraphError::KindMismatch {
            operation,
            kind,
            resource_type: resource_type.into(),
            field: field.into(),
        }
    }

    /// Concrete type not assignable to the declared type.
    pub fn incompatible_type(
        resource_type: impl Into<String>,
        field: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        GraphError::IncompatibleType {
            resource_type: resource_type.into(),
            field: field.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Malformed relationship payload.
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        GraphError::InvalidPayload(reason.into())
    }

    /// Whether this error reflects a schema/usage mistake by the caller.
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            GraphError::UnknownField { .. }
                | GraphError::KindMismatch { .. }
                | GraphError::IncompatibleType { .. }
                | GraphError::InverseMismatch { .. }
        )
    }
}

/// Result alias for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;
