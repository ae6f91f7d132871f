//! Snapshots of stored graph elements.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::graph::types::{Label, NodeId, RelationshipId, RelationshipType};

/// Properties of a node or relationship, ordered by key.
pub type PropertyMap = BTreeMap<String, Value>;

/// A node with its labels and properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    pub labels: BTreeSet<Label>,
    pub properties: PropertyMap,
}

impl NodeRecord {
    pub fn new(id: NodeId) -> Self {
        Self {
            id,
            labels: BTreeSet::new(),
            properties: PropertyMap::new(),
        }
    }

    pub fn has_label(&self, label: &Label) -> bool {
        self.labels.contains(label)
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// A relationship between two nodes.
///
/// Every relationship is stored with a start and an end node. Undirected
/// relationship types are a mapping concern: the store keeps the order they
/// were created in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipRecord {
    pub id: RelationshipId,
    pub start: NodeId,
    pub end: NodeId,
    pub rel_type: RelationshipType,
    pub properties: PropertyMap,
}

impl RelationshipRecord {
    pub fn new(id: RelationshipId, start: NodeId, end: NodeId, rel_type: RelationshipType) -> Self {
        Self {
            id,
            start,
            end,
            rel_type,
            properties: PropertyMap::new(),
        }
    }

    /// The node at the other end, seen from `node`.
    pub fn other(&self, node: NodeId) -> NodeId {
        if self.start == node {
            self.end
        } else {
            self.start
        }
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// One index entry held by an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub index: String,
    pub key: String,
    pub value: Value,
}
