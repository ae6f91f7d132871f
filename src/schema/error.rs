//! Schema resolution error types.
//!
//! Every variant here describes metadata that is wrong in code. None of them
//! is recoverable at runtime.

use thiserror::Error;

use crate::schema::descriptor::Endpoint;

/// Result type alias for metadata resolution.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while resolving graph metadata from a type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// labels were requested for a relationship type
    #[error("domain type {type_name} is not mapped to a node")]
    NotANodeType { type_name: String },

    /// a relationship type (or endpoints) was requested for a node type
    #[error("domain type {type_name} is not mapped to a relationship")]
    NotARelationshipType { type_name: String },

    /// two attributes resolve to the same property key
    #[error("domain type {type_name} declares property name \"{key}\" at least twice")]
    DuplicatePropertyName { type_name: String, key: String },

    /// no attribute carries the identity marker
    #[error("domain type {type_name} does not declare any identity attribute")]
    MissingIdentity { type_name: String },

    /// several attributes carry the identity marker
    #[error("domain type {type_name} declares too many identity attributes: {}", .fields.join(", "))]
    AmbiguousIdentity {
        type_name: String,
        fields: Vec<String>,
    },

    /// no attribute carries the start/end marker
    #[error("relationship type {type_name} has no {endpoint} attribute")]
    MissingEndpoint { type_name: String, endpoint: Endpoint },

    /// several attributes carry the start/end marker
    #[error("relationship type {type_name} has too many {endpoint} attributes: {}", .fields.join(", "))]
    AmbiguousEndpoint {
        type_name: String,
        endpoint: Endpoint,
        fields: Vec<String>,
    },

    /// the descriptor names an attribute the instance does not expose
    #[error("domain type {type_name} has no value for attribute {field}")]
    MissingAttribute { type_name: String, field: String },

    /// an endpoint attribute holds a scalar instead of a domain instance
    #[error("attribute {field} of {type_name} does not hold a domain instance")]
    NotAnEntity { type_name: String, field: String },

    /// a property that must be stored on a graph element holds a domain instance
    #[error("property {key} of {type_name} holds a domain instance and cannot be stored")]
    NonScalarProperty { type_name: String, key: String },
}

impl SchemaError {
    /// check if the error is about the node/relationship kind of a type
    pub fn is_kind_mismatch(&self) -> bool {
        matches!(
            self,
            SchemaError::NotANodeType { .. } | SchemaError::NotARelationshipType { .. }
        )
    }

    /// name of the domain type whose metadata is wrong
    pub fn type_name(&self) -> &str {
        match self {
            SchemaError::NotANodeType { type_name }
            | SchemaError::NotARelationshipType { type_name }
            | SchemaError::DuplicatePropertyName { type_name, .. }
            | SchemaError::MissingIdentity { type_name }
            | SchemaError::AmbiguousIdentity { type_name, .. }
            | SchemaError::MissingEndpoint { type_name, .. }
            | SchemaError::AmbiguousEndpoint { type_name, .. }
            | SchemaError::MissingAttribute { type_name, .. }
            | SchemaError::NotAnEntity { type_name, .. }
            | SchemaError::NonScalarProperty { type_name, .. } => type_name,
        }
    }
}
