//! Graph store abstraction and the in-memory store.
//!
//! The engine talks to a graph only through [`GraphGateway`] and
//! [`GraphTransaction`]: nodes with labels, typed relationships, properties
//! held as JSON values, named exact-match indexes, depth-first traversal and
//! a small typed node query. [`MemoryGraph`] implements that surface in
//! process.

mod error;
mod gateway;
mod memory;
mod query;
mod record;
mod traverse;
mod types;

pub use error::{GraphError, GraphResult};
pub use gateway::{GraphGateway, GraphTransaction};
pub use memory::{MemoryGraph, MemoryTransaction};
pub use query::{Degree, NodeQuery, Predicate};
pub use record::{IndexEntry, NodeRecord, PropertyMap, RelationshipRecord};
pub use traverse::{Traversal, TraversalSpec};
pub use types::{
    Direction, ElementId, ElementKind, Label, NodeId, RelationshipId, RelationshipType,
};
