//! In-process graph store.
//!
//! `MemoryGraph` keeps the committed graph behind a mutex. A transaction holds
//! the lock for its whole lifetime. Reads go straight to the committed state
//! until the first write, which takes a private copy; that copy replaces the
//! committed state on `commit`. Dropping a transaction without committing
//! leaves the committed state untouched.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use serde_json::Value;
use tracing::debug;
use ulid::Ulid;

use crate::graph::error::{GraphError, GraphResult};
use crate::graph::gateway::{GraphGateway, GraphTransaction};
use crate::graph::query::{Degree, NodeQuery};
use crate::graph::record::{IndexEntry, NodeRecord, PropertyMap, RelationshipRecord};
use crate::graph::types::{
    Direction, ElementId, ElementKind, Label, NodeId, RelationshipId, RelationshipType,
};

/// Location of one index bucket.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct IndexSlot {
    kind: ElementKind,
    index: String,
    key: String,
    /// canonical JSON text of the value
    value: String,
}

impl IndexSlot {
    fn new(kind: ElementKind, index: &str, key: &str, value: &Value) -> Self {
        Self {
            kind,
            index: index.to_string(),
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct IndexBucket {
    value: Value,
    members: BTreeSet<ElementId>,
}

#[derive(Debug, Clone, Default)]
struct GraphState {
    nodes: BTreeMap<NodeId, NodeRecord>,
    relationships: BTreeMap<RelationshipId, RelationshipRecord>,
    outgoing: BTreeMap<NodeId, BTreeSet<RelationshipId>>,
    incoming: BTreeMap<NodeId, BTreeSet<RelationshipId>>,
    indexes: BTreeMap<IndexSlot, IndexBucket>,
    next_node: u64,
    next_relationship: u64,
}

impl GraphState {
    fn node_mut(&mut self, node: NodeId) -> GraphResult<&mut NodeRecord> {
        self.nodes.get_mut(&node).ok_or(GraphError::NodeNotFound(node))
    }

    fn properties(&self, element: ElementId) -> GraphResult<&PropertyMap> {
        match element {
            ElementId::Node(id) => self
                .nodes
                .get(&id)
                .map(|n| &n.properties)
                .ok_or(GraphError::NodeNotFound(id)),
            ElementId::Relationship(id) => self
                .relationships
                .get(&id)
                .map(|r| &r.properties)
                .ok_or(GraphError::RelationshipNotFound(id)),
        }
    }

    fn properties_mut(&mut self, element: ElementId) -> GraphResult<&mut PropertyMap> {
        match element {
            ElementId::Node(id) => self
                .nodes
                .get_mut(&id)
                .map(|n| &mut n.properties)
                .ok_or(GraphError::NodeNotFound(id)),
            ElementId::Relationship(id) => self
                .relationships
                .get_mut(&id)
                .map(|r| &mut r.properties)
                .ok_or(GraphError::RelationshipNotFound(id)),
        }
    }

    fn degree(&self, node: NodeId) -> Degree {
        Degree {
            outgoing: self.outgoing.get(&node).map_or(0, |s| s.len()),
            incoming: self.incoming.get(&node).map_or(0, |s| s.len()),
        }
    }

    /// Remove `element` from matching buckets, dropping buckets left empty.
    fn unindex<P>(&mut self, element: ElementId, mut slot_filter: P) -> usize
    where
        P: FnMut(&IndexSlot) -> bool,
    {
        let mut removed = 0;
        self.indexes.retain(|slot, bucket| {
            if slot.kind == element.kind() && slot_filter(slot) && bucket.members.remove(&element) {
                removed += 1;
            }
            !bucket.members.is_empty()
        });
        removed
    }

    fn remove_relationship(&mut self, id: RelationshipId) -> GraphResult<RelationshipRecord> {
        let record = self
            .relationships
            .remove(&id)
            .ok_or(GraphError::RelationshipNotFound(id))?;
        if let Some(set) = self.outgoing.get_mut(&record.start) {
            set.remove(&id);
        }
        if let Some(set) = self.incoming.get_mut(&record.end) {
            set.remove(&id);
        }
        self.unindex(id.into(), |_| true);
        Ok(record)
    }
}

/// Shared in-memory graph. Clones refer to the same graph.
#[derive(Clone, Default)]
pub struct MemoryGraph {
    inner: Arc<Mutex<GraphState>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed nodes.
    ///
    /// Blocks while a transaction is open.
    pub fn node_count(&self) -> usize {
        self.inner.lock().nodes.len()
    }

    /// Number of committed relationships.
    ///
    /// Blocks while a transaction is open.
    pub fn relationship_count(&self) -> usize {
        self.inner.lock().relationships.len()
    }
}

impl fmt::Debug for MemoryGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryGraph").finish_non_exhaustive()
    }
}

impl GraphGateway for MemoryGraph {
    type Transaction<'g> = MemoryTransaction<'g>;

    fn begin(&self) -> GraphResult<MemoryTransaction<'_>> {
        let committed = self.inner.lock();
        let tx_id = Ulid::new().to_string().to_lowercase();
        debug!(tx_id = %tx_id, "transaction started");
        Ok(MemoryTransaction {
            tx_id,
            committed,
            working: None,
            finished: false,
        })
    }
}

/// Transaction over a `MemoryGraph`.
pub struct MemoryTransaction<'g> {
    tx_id: String,
    committed: MutexGuard<'g, GraphState>,
    /// private copy, taken on the first write
    working: Option<GraphState>,
    finished: bool,
}

impl MemoryTransaction<'_> {
    fn state(&self) -> &GraphState {
        self.working.as_ref().unwrap_or(&*self.committed)
    }

    fn state_mut(&mut self) -> &mut GraphState {
        let committed = &self.committed;
        self.working.get_or_insert_with(|| (**committed).clone())
    }
}

impl fmt::Debug for MemoryTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("tx_id", &self.tx_id)
            .field("dirty", &self.working.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.finished {
            debug!(tx_id = %self.tx_id, "transaction dropped, changes discarded");
        }
    }
}

impl GraphTransaction for MemoryTransaction<'_> {
    fn id(&self) -> &str {
        &self.tx_id
    }

    fn commit(mut self) -> GraphResult<()> {
        if let Some(working) = self.working.take() {
            *self.committed = working;
        }
        self.finished = true;
        debug!(tx_id = %self.tx_id, "transaction committed");
        Ok(())
    }

    fn rollback(mut self) {
        self.finished = true;
        debug!(tx_id = %self.tx_id, "transaction rolled back");
    }

    fn create_node(&mut self) -> GraphResult<NodeId> {
        let state = self.state_mut();
        let id = NodeId(state.next_node);
        state.next_node += 1;
        state.nodes.insert(id, NodeRecord::new(id));
        state.outgoing.insert(id, BTreeSet::new());
        state.incoming.insert(id, BTreeSet::new());
        Ok(id)
    }

    fn delete_node(&mut self, node: NodeId) -> GraphResult<()> {
        let state = self.state_mut();
        if !state.nodes.contains_key(&node) {
            return Err(GraphError::NodeNotFound(node));
        }

        let mut attached: BTreeSet<RelationshipId> = BTreeSet::new();
        attached.extend(state.outgoing.remove(&node).unwrap_or_default());
        attached.extend(state.incoming.remove(&node).unwrap_or_default());
        for rel in attached {
            state.remove_relationship(rel)?;
        }

        state.nodes.remove(&node);
        state.unindex(node.into(), |_| true);
        Ok(())
    }

    fn node(&self, node: NodeId) -> GraphResult<Option<NodeRecord>> {
        Ok(self.state().nodes.get(&node).cloned())
    }

    fn add_label(&mut self, node: NodeId, label: Label) -> GraphResult<()> {
        self.state_mut().node_mut(node)?.labels.insert(label);
        Ok(())
    }

    fn labels(&self, node: NodeId) -> GraphResult<Vec<Label>> {
        self.state()
            .nodes
            .get(&node)
            .map(|n| n.labels.iter().cloned().collect())
            .ok_or(GraphError::NodeNotFound(node))
    }

    fn set_property(&mut self, element: ElementId, key: &str, value: Value) -> GraphResult<()> {
        self.state_mut()
            .properties_mut(element)?
            .insert(key.to_string(), value);
        Ok(())
    }

    fn property(&self, element: ElementId, key: &str) -> GraphResult<Option<Value>> {
        Ok(self.state().properties(element)?.get(key).cloned())
    }

    fn property_keys(&self, element: ElementId) -> GraphResult<Vec<String>> {
        Ok(self.state().properties(element)?.keys().cloned().collect())
    }

    fn create_relationship(
        &mut self,
        start: NodeId,
        end: NodeId,
        rel_type: RelationshipType,
    ) -> GraphResult<RelationshipId> {
        let state = self.state_mut();
        for node in [start, end] {
            if !state.nodes.contains_key(&node) {
                return Err(GraphError::NodeNotFound(node));
            }
        }

        let id = RelationshipId(state.next_relationship);
        state.next_relationship += 1;
        state
            .relationships
            .insert(id, RelationshipRecord::new(id, start, end, rel_type));
        state.outgoing.entry(start).or_default().insert(id);
        state.incoming.entry(end).or_default().insert(id);
        Ok(id)
    }

    fn delete_relationship(&mut self, relationship: RelationshipId) -> GraphResult<()> {
        self.state_mut().remove_relationship(relationship).map(|_| ())
    }

    fn relationship(&self, relationship: RelationshipId) -> GraphResult<Option<RelationshipRecord>> {
        Ok(self.state().relationships.get(&relationship).cloned())
    }

    fn relationships(
        &self,
        node: NodeId,
        rel_type: Option<&RelationshipType>,
        direction: Direction,
    ) -> GraphResult<Vec<RelationshipRecord>> {
        let state = self.state();
        if !state.nodes.contains_key(&node) {
            return Err(GraphError::NodeNotFound(node));
        }

        let mut ids: BTreeSet<RelationshipId> = BTreeSet::new();
        if matches!(direction, Direction::Outgoing | Direction::Both) {
            ids.extend(state.outgoing.get(&node).into_iter().flatten());
        }
        if matches!(direction, Direction::Incoming | Direction::Both) {
            ids.extend(state.incoming.get(&node).into_iter().flatten());
        }

        Ok(ids
            .iter()
            .filter_map(|id| state.relationships.get(id))
            .filter(|r| rel_type.map_or(true, |t| &r.rel_type == t))
            .cloned()
            .collect())
    }

    fn index_add(
        &mut self,
        index: &str,
        element: ElementId,
        key: &str,
        value: &Value,
    ) -> GraphResult<()> {
        let state = self.state_mut();
        state.properties(element)?;
        state
            .indexes
            .entry(IndexSlot::new(element.kind(), index, key, value))
            .or_insert_with(|| IndexBucket {
                value: value.clone(),
                members: BTreeSet::new(),
            })
            .members
            .insert(element);
        Ok(())
    }

    fn index_remove(
        &mut self,
        index: &str,
        element: ElementId,
        key: Option<&str>,
    ) -> GraphResult<usize> {
        Ok(self.state_mut().unindex(element, |slot| {
            slot.index == index && key.map_or(true, |k| slot.key == k)
        }))
    }

    fn index_get(
        &self,
        index: &str,
        kind: ElementKind,
        key: &str,
        value: &Value,
    ) -> GraphResult<Vec<ElementId>> {
        Ok(self
            .state()
            .indexes
            .get(&IndexSlot::new(kind, index, key, value))
            .map(|bucket| bucket.members.iter().copied().collect())
            .unwrap_or_default())
    }

    fn index_entries(&self, element: ElementId) -> GraphResult<Vec<IndexEntry>> {
        self.state().properties(element)?;
        Ok(self
            .state()
            .indexes
            .iter()
            .filter(|(_, bucket)| bucket.members.contains(&element))
            .map(|(slot, bucket)| IndexEntry {
                index: slot.index.clone(),
                key: slot.key.clone(),
                value: bucket.value.clone(),
            })
            .collect())
    }

    fn query(&self, query: &NodeQuery) -> GraphResult<Vec<NodeId>> {
        debug!(tx_id = %self.tx_id, query = %query, "query");
        let state = self.state();
        Ok(state
            .nodes
            .values()
            .filter(|node| query.matches(node, state.degree(node.id)))
            .map(|node| node.id)
            .collect())
    }
}
