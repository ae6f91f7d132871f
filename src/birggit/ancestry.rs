//! Commit ancestry: logs and common ancestors.
//!
//! Ancestry follows `HAS_PARENT` relationships backwards, from a commit to
//! its parents. A log is the depth-first order of that walk, head first.

use std::collections::{HashMap, HashSet, VecDeque};

use crate::graph::{
    Direction, GraphResult, GraphTransaction, NodeId, RelationshipType, TraversalSpec,
};

/// Depth-first ancestry of `head`, head first, at most `limit` commits.
pub(crate) fn log<T: GraphTransaction>(
    tx: &T,
    parent_type: &RelationshipType,
    head: NodeId,
    limit: Option<usize>,
) -> GraphResult<Vec<NodeId>> {
    let spec = TraversalSpec::new(Direction::Incoming).relationship_type(parent_type.clone());
    match limit {
        Some(limit) => tx.traverse(head, spec).take(limit).collect(),
        None => tx.traverse(head, spec).collect(),
    }
}

/// First commit of `ours`, in order, that also appears in `theirs`.
pub(crate) fn first_match(ours: &[NodeId], theirs: &[NodeId]) -> Option<NodeId> {
    let theirs: HashSet<NodeId> = theirs.iter().copied().collect();
    ours.iter().copied().find(|node| theirs.contains(node))
}

/// Distance in parent links from `head` to each of its ancestors.
fn depths<T: GraphTransaction>(
    tx: &T,
    parent_type: &RelationshipType,
    head: NodeId,
) -> GraphResult<HashMap<NodeId, usize>> {
    let mut depths = HashMap::from([(head, 0)]);
    let mut frontier = VecDeque::from([(head, 0)]);
    while let Some((node, depth)) = frontier.pop_front() {
        for rel in tx.relationships(node, Some(parent_type), Direction::Incoming)? {
            let parent = rel.other(node);
            if !depths.contains_key(&parent) {
                depths.insert(parent, depth + 1);
                frontier.push_back((parent, depth + 1));
            }
        }
    }
    Ok(depths)
}

/// Common ancestor closest to both heads.
///
/// Candidates are ranked by the larger of their two distances, then by the
/// sum of both distances, then by their position in `ours_log`.
pub(crate) fn merge_base<T: GraphTransaction>(
    tx: &T,
    parent_type: &RelationshipType,
    ours_log: &[NodeId],
    ours: NodeId,
    theirs: NodeId,
) -> GraphResult<Option<NodeId>> {
    let ours_depths = depths(tx, parent_type, ours)?;
    let theirs_depths = depths(tx, parent_type, theirs)?;

    let best = ours_log
        .iter()
        .enumerate()
        .filter_map(|(position, node)| {
            let a = *ours_depths.get(node)?;
            let b = *theirs_depths.get(node)?;
            Some(((a.max(b), a + b, position), *node))
        })
        .min_by_key(|(rank, _)| *rank)
        .map(|(_, node)| node);
    Ok(best)
}
