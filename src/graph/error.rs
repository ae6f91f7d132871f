//! Graph store error types.

use serde_json::Value;
use thiserror::Error;

use crate::graph::types::{ElementKind, NodeId, RelationshipId};

/// Result type for graph store operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors raised by a graph transaction.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GraphError {
    /// Node does not exist (or was deleted in this transaction).
    #[error("node not found: {0}")]
    NodeNotFound(NodeId),

    /// Relationship does not exist (or was deleted in this transaction).
    #[error("relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),

    /// A lookup that expects at most one element found several.
    #[error("index {index} holds {hits} {kind:?} entries for {key}={value}")]
    MultipleIndexHits {
        index: String,
        kind: ElementKind,
        key: String,
        value: Value,
        hits: usize,
    },
}

impl GraphError {
    /// Check if the error reports a missing element.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            GraphError::NodeNotFound(_) | GraphError::RelationshipNotFound(_)
        )
    }
}
