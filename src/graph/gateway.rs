//! The graph store surface consumed by the engine.
//!
//! A `GraphGateway` hands out transactions. All reads and writes go through a
//! `GraphTransaction`, which publishes its changes on `commit` and discards
//! them on `rollback` or when dropped.

use serde_json::Value;
use tracing::trace;

use crate::graph::error::{GraphError, GraphResult};
use crate::graph::query::NodeQuery;
use crate::graph::record::{IndexEntry, NodeRecord, RelationshipRecord};
use crate::graph::traverse::{Traversal, TraversalSpec};
use crate::graph::types::{
    Direction, ElementId, ElementKind, Label, NodeId, RelationshipId, RelationshipType,
};

/// Entry point to a graph store.
pub trait GraphGateway {
    type Transaction<'g>: GraphTransaction
    where
        Self: 'g;

    /// Begin a transaction.
    fn begin(&self) -> GraphResult<Self::Transaction<'_>>;
}

/// All-or-nothing unit of work against a graph store.
pub trait GraphTransaction {
    /// Transaction identifier, for logging.
    fn id(&self) -> &str;

    /// Publish every change made in this transaction.
    fn commit(self) -> GraphResult<()>
    where
        Self: Sized;

    /// Discard every change made in this transaction.
    fn rollback(self)
    where
        Self: Sized;

    // ==================== Nodes ====================

    fn create_node(&mut self) -> GraphResult<NodeId>;

    /// Delete a node together with its relationships and index entries.
    fn delete_node(&mut self, node: NodeId) -> GraphResult<()>;

    fn node(&self, node: NodeId) -> GraphResult<Option<NodeRecord>>;

    fn add_label(&mut self, node: NodeId, label: Label) -> GraphResult<()>;

    fn labels(&self, node: NodeId) -> GraphResult<Vec<Label>>;

    // ==================== Properties ====================

    fn set_property(&mut self, element: ElementId, key: &str, value: Value) -> GraphResult<()>;

    fn property(&self, element: ElementId, key: &str) -> GraphResult<Option<Value>>;

    fn property_keys(&self, element: ElementId) -> GraphResult<Vec<String>>;

    // ==================== Relationships ====================

    fn create_relationship(
        &mut self,
        start: NodeId,
        end: NodeId,
        rel_type: RelationshipType,
    ) -> GraphResult<RelationshipId>;

    /// Delete a relationship together with its index entries.
    fn delete_relationship(&mut self, relationship: RelationshipId) -> GraphResult<()>;

    fn relationship(&self, relationship: RelationshipId) -> GraphResult<Option<RelationshipRecord>>;

    /// Relationships of a node, oldest first.
    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<&RelationshipType>,
        direction: Direction,
    ) -> GraphResult<Vec<RelationshipRecord>>;

    // ==================== Indexes ====================

    /// Add `element` under `key=value` in the named index.
    fn index_add(&mut self, index: &str, element: ElementId, key: &str, value: &Value)
        -> GraphResult<()>;

    /// Remove the entries of `element` from the named index, optionally only
    /// those under `key`. Returns the number of entries removed.
    fn index_remove(&mut self, index: &str, element: ElementId, key: Option<&str>)
        -> GraphResult<usize>;

    /// Elements of the given kind indexed under `key=value`, in id order.
    fn index_get(
        &self,
        index: &str,
        kind: ElementKind,
        key: &str,
        value: &Value,
    ) -> GraphResult<Vec<ElementId>>;

    /// Every index entry held by `element`.
    fn index_entries(&self, element: ElementId) -> GraphResult<Vec<IndexEntry>>;

    // ==================== Queries ====================

    /// Ids of the nodes matching a query, in id order.
    fn query(&self, query: &NodeQuery) -> GraphResult<Vec<NodeId>>;

    /// Lazy depth-first walk from `start`.
    fn traverse(&self, start: NodeId, spec: TraversalSpec) -> Traversal<'_, Self>
    where
        Self: Sized,
    {
        Traversal::new(self, start, spec)
    }

    /// The single element indexed under `key=value`, if any.
    fn index_get_single(
        &self,
        index: &str,
        kind: ElementKind,
        key: &str,
        value: &Value,
    ) -> GraphResult<Option<ElementId>> {
        let hits = self.index_get(index, kind, key, value)?;
        match hits.as_slice() {
            [] => Ok(None),
            [single] => Ok(Some(*single)),
            many => Err(GraphError::MultipleIndexHits {
                index: index.to_string(),
                kind,
                key: key.to_string(),
                value: value.clone(),
                hits: many.len(),
            }),
        }
    }

    /// Return the node indexed under `key=value`, or create, initialize and
    /// index a new one.
    fn get_or_create_node<F, E>(
        &mut self,
        index: &str,
        key: &str,
        value: &Value,
        init: F,
    ) -> Result<NodeId, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self, NodeId) -> Result<(), E>,
        E: From<GraphError>,
    {
        if let Some(existing) = self.index_get_single(index, ElementKind::Node, key, value)? {
            if let Some(node) = existing.as_node() {
                trace!(index, key, %value, %node, "node already indexed");
                return Ok(node);
            }
        }

        let node = self.create_node()?;
        init(self, node)?;
        self.index_add(index, node.into(), key, value)?;
        trace!(index, key, %value, %node, "node created");
        Ok(node)
    }

    /// Return the relationship indexed under `key=value`, or create and index
    /// the one built by `create`.
    fn get_or_create_relationship<F, E>(
        &mut self,
        index: &str,
        key: &str,
        value: &Value,
        create: F,
    ) -> Result<RelationshipId, E>
    where
        Self: Sized,
        F: FnOnce(&mut Self) -> Result<RelationshipId, E>,
        E: From<GraphError>,
    {
        if let Some(existing) = self.index_get_single(index, ElementKind::Relationship, key, value)? {
            if let Some(relationship) = existing.as_relationship() {
                trace!(index, key, %value, %relationship, "relationship already indexed");
                return Ok(relationship);
            }
        }

        let relationship = create(self)?;
        self.index_add(index, relationship.into(), key, value)?;
        trace!(index, key, %value, %relationship, "relationship created");
        Ok(relationship)
    }
}
