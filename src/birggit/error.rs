//! Engine error types.

use thiserror::Error;

use crate::domain::DomainError;
use crate::graph::{GraphError, NodeId};
use crate::schema::SchemaError;

/// Result type for engine operations.
pub type BirggitResult<T> = Result<T, BirggitError>;

/// Errors raised by BIRGGIT operations.
///
/// Expected misses (unknown branch in a lookup, unknown commit identifier)
/// are `Ok(None)` rather than errors.
#[derive(Debug, Error)]
pub enum BirggitError {
    /// The caller passed an argument the operation cannot work with.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Mapping metadata of a domain type is wrong.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    #[error("domain error: {0}")]
    Domain(#[from] DomainError),

    /// No branch of that name is indexed.
    #[error("branch not found: {name}")]
    BranchNotFound { name: String },

    /// Several projects index a branch of that name.
    #[error("branch {name} exists in several projects: {}", .projects.join(", "))]
    AmbiguousBranch { name: String, projects: Vec<String> },

    /// Several commit nodes carry the same identifier.
    #[error("{hits} commits share identifier {identifier}")]
    AmbiguousCommit { identifier: String, hits: usize },

    /// A commit with that identifier is already stored.
    #[error("commit already exists: {identifier}")]
    CommitExists { identifier: String },

    #[error("node not found: {0}")]
    NodeNotFound(NodeId),
}

impl BirggitError {
    /// Check if the error points at a bug in the calling code or in the
    /// mapping metadata rather than at the state of the graph.
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            BirggitError::InvalidArgument(_)
                | BirggitError::InvalidConfig(_)
                | BirggitError::Schema(_)
                | BirggitError::Domain(_)
        )
    }

    /// Check if the error reports a missing branch or element.
    pub fn is_not_found(&self) -> bool {
        match self {
            BirggitError::BranchNotFound { .. } | BirggitError::NodeNotFound(_) => true,
            BirggitError::Graph(e) => e.is_not_found(),
            _ => false,
        }
    }

    /// Check if the error reports elements clashing on an identity.
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            BirggitError::AmbiguousBranch { .. }
                | BirggitError::AmbiguousCommit { .. }
                | BirggitError::CommitExists { .. }
                | BirggitError::Graph(GraphError::MultipleIndexHits { .. })
        )
    }
}
