//! Depth-first traversal.

use std::collections::HashSet;

use crate::graph::error::GraphResult;
use crate::graph::gateway::GraphTransaction;
use crate::graph::types::{Direction, NodeId, RelationshipType};

/// What a traversal follows and how far.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraversalSpec {
    /// only relationships of this type, or all of them
    pub rel_type: Option<RelationshipType>,
    pub direction: Direction,
    /// nodes deeper than this are not visited; `None` walks the whole component
    pub max_depth: Option<usize>,
}

impl TraversalSpec {
    pub fn new(direction: Direction) -> Self {
        Self {
            rel_type: None,
            direction,
            max_depth: None,
        }
    }

    pub fn relationship_type(mut self, rel_type: RelationshipType) -> Self {
        self.rel_type = Some(rel_type);
        self
    }

    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }
}

/// Lazy depth-first iterator over node ids, start node first.
///
/// Each node is yielded at most once, so cycles terminate. Siblings are
/// visited in relationship creation order.
pub struct Traversal<'t, T: ?Sized> {
    tx: &'t T,
    spec: TraversalSpec,
    stack: Vec<(NodeId, usize)>,
    visited: HashSet<NodeId>,
    failed: bool,
}

impl<'t, T: GraphTransaction + ?Sized> Traversal<'t, T> {
    pub fn new(tx: &'t T, start: NodeId, spec: TraversalSpec) -> Self {
        Self {
            tx,
            spec,
            stack: vec![(start, 0)],
            visited: HashSet::new(),
            failed: false,
        }
    }

    fn expand(&mut self, node: NodeId, depth: usize) -> GraphResult<()> {
        if self.spec.max_depth.map_or(false, |max| depth >= max) {
            return Ok(());
        }
        let relationships = self
            .tx
            .relationships(node, self.spec.rel_type.as_ref(), self.spec.direction)?;
        // reversed so the oldest relationship is popped first
        for rel in relationships.iter().rev() {
            let next = rel.other(node);
            if !self.visited.contains(&next) {
                self.stack.push((next, depth + 1));
            }
        }
        Ok(())
    }
}

impl<'t, T: GraphTransaction + ?Sized> Iterator for Traversal<'t, T> {
    type Item = GraphResult<NodeId>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        while let Some((node, depth)) = self.stack.pop() {
            if !self.visited.insert(node) {
                continue;
            }
            if let Err(e) = self.expand(node, depth) {
                self.failed = true;
                return Some(Err(e));
            }
            return Some(Ok(node));
        }
        None
    }
}
