//! BIRGGIT operations.
//!
//! Every public operation runs in exactly one graph transaction. It commits
//! when the operation succeeds and rolls back on the first error, so a failed
//! operation leaves the graph as it found it.

use std::collections::BTreeSet;

use serde_json::Value;
use tracing::{debug, info};
use ulid::Ulid;

use crate::birggit::ancestry;
use crate::birggit::config::{AncestorStrategy, BirggitConfig, OrphanRule};
use crate::birggit::error::{BirggitError, BirggitResult};
use crate::birggit::mapping::{create_relationship, merge_node, merge_relationship};
use crate::domain::{Branch, Commit, ParentCommit, Project};
use crate::graph::{
    Direction, ElementKind, GraphError, GraphGateway, GraphTransaction, Label, MemoryGraph,
    NodeId, NodeQuery, NodeRecord, RelationshipId, RelationshipRecord, RelationshipType,
};
use crate::schema::{
    resolve_identity, resolve_identity_key, resolve_identity_property, resolve_index_name,
    resolve_labels, resolve_relationship_type,
};

/// Commit-graph engine over a graph store.
#[derive(Debug, Clone)]
pub struct Birggit<G: GraphGateway> {
    graph: G,
    config: BirggitConfig,
}

impl Birggit<MemoryGraph> {
    /// Engine over a fresh in-memory graph with the default configuration.
    pub fn in_memory() -> Self {
        Self {
            graph: MemoryGraph::new(),
            config: BirggitConfig::default(),
        }
    }
}

impl<G: GraphGateway> Birggit<G> {
    pub fn new(graph: G, config: BirggitConfig) -> BirggitResult<Self> {
        config.validate()?;
        Ok(Self { graph, config })
    }

    pub fn graph(&self) -> &G {
        &self.graph
    }

    pub fn config(&self) -> &BirggitConfig {
        &self.config
    }

    /// Run `f` in a transaction, committing on `Ok` and rolling back on `Err`.
    fn with_transaction<'s, T, F>(&'s self, operation: &'static str, f: F) -> BirggitResult<T>
    where
        G: 's,
        F: FnOnce(&mut G::Transaction<'s>) -> BirggitResult<T>,
    {
        let mut tx = self.graph.begin()?;
        match f(&mut tx) {
            Ok(result) => {
                tx.commit()?;
                Ok(result)
            }
            Err(e) => {
                debug!(operation, error = %e, "operation failed, rolling back");
                tx.rollback();
                Err(e)
            }
        }
    }

    // ==================== Projects and commits ====================

    /// Get or create the node of a project.
    pub fn create_project(&self, project: &Project) -> BirggitResult<NodeId> {
        self.with_transaction("create_project", |tx| {
            let node = merge_node(tx, project)?;
            info!(project = project.name(), %node, "project stored");
            Ok(node)
        })
    }

    /// Get or create the node of a commit.
    pub fn commit(&self, commit: &Commit) -> BirggitResult<NodeId> {
        self.with_transaction("commit", |tx| {
            let node = merge_node(tx, commit)?;
            info!(commit = commit.identifier(), %node, "commit stored");
            Ok(node)
        })
    }

    /// Replace a commit by a copy with a new message.
    ///
    /// The copy gets every label and property of the original, the identifier
    /// `<old identifier><amend suffix>` and the new message. Every relationship
    /// of the original is recreated on the copy, with its index entries, and
    /// then deleted. The original stays in the graph as an orphan.
    pub fn amend(&self, node: NodeId, message: &str) -> BirggitResult<NodeId> {
        self.with_transaction("amend", |tx| {
            let original = tx.node(node)?.ok_or(BirggitError::NodeNotFound(node))?;
            let identifier = commit_identifier_of(&original)?;
            let amended = format!("{}{}", identifier, self.config.amend_suffix);

            let descriptor = Commit::descriptor();
            let index = resolve_index_name(descriptor);
            let key = resolve_identity_key(descriptor)?;
            let amended_value = Value::String(amended.clone());
            if tx
                .index_get_single(&index, ElementKind::Node, &key, &amended_value)?
                .is_some()
            {
                return Err(BirggitError::CommitExists {
                    identifier: amended,
                });
            }

            let clone = tx.create_node()?;
            let labels: BTreeSet<Label> = resolve_labels(descriptor)?
                .into_iter()
                .chain(original.labels.iter().cloned())
                .collect();
            for label in labels {
                tx.add_label(clone, label)?;
            }
            for (property, value) in &original.properties {
                tx.set_property(clone.into(), property, value.clone())?;
            }
            tx.set_property(clone.into(), Commit::IDENTIFIER, amended_value.clone())?;
            tx.set_property(clone.into(), Commit::MESSAGE, Value::String(message.to_string()))?;
            tx.index_add(&index, clone.into(), &key, &amended_value)?;

            for rel in tx.relationships(node, None, Direction::Both)? {
                relink(tx, &rel, node, clone)?;
            }

            info!(from = %identifier, to = %amended, %clone, "commit amended");
            Ok(clone)
        })
    }

    // ==================== Branches ====================

    /// Create a branch relationship, getting or creating its project and
    /// head commit. The branch is not indexed.
    pub fn create_branch(&self, branch: &Branch) -> BirggitResult<RelationshipId> {
        self.with_transaction("create_branch", |tx| {
            let relationship = create_relationship(tx, branch)?;
            debug!(branch = branch.name(), %relationship, "branch created");
            Ok(relationship)
        })
    }

    /// Make a branch relationship findable by name.
    ///
    /// An indexed branch of the same project under the same name is
    /// superseded: its relationship is deleted. Branches of the same name in
    /// other projects stay indexed.
    pub fn index_branch(&self, branch: RelationshipId) -> BirggitResult<()> {
        self.with_transaction("index_branch", |tx| index_branch(tx, branch))
    }

    /// Indexed branch of that name, across all projects.
    pub fn find_branch(&self, name: &str) -> BirggitResult<Option<RelationshipId>> {
        check_branch_name(name)?;
        self.with_transaction("find_branch", |tx| {
            Ok(find_branch(&*tx, name)?.map(|r| r.id))
        })
    }

    /// Indexed branch of that name in one project.
    pub fn find_project_branch(
        &self,
        project: &Project,
        name: &str,
    ) -> BirggitResult<Option<RelationshipId>> {
        check_branch_name(name)?;
        self.with_transaction("find_project_branch", |tx| {
            Ok(find_project_branch(&*tx, project, name)?.map(|r| r.id))
        })
    }

    /// Make `commit` the new head of `branch`, as a child of the current head.
    ///
    /// Returns the new branch relationship.
    pub fn commit_on_branch(&self, commit: &Commit, branch: &Branch) -> BirggitResult<RelationshipId> {
        self.with_transaction("commit_on_branch", |tx| advance(tx, commit, branch))
    }

    /// Merge `second` into `first`.
    ///
    /// A merge commit with a generated identifier becomes the head of
    /// `first`; it has both former heads as parents. Returns the new
    /// relationship of `first`.
    pub fn merge(&self, first: &Branch, second: &Branch) -> BirggitResult<RelationshipId> {
        if first == second {
            return Err(BirggitError::InvalidArgument(format!(
                "cannot merge branch {} into itself",
                first.name()
            )));
        }

        self.with_transaction("merge", |tx| {
            let theirs = find_project_branch(&*tx, second.project(), second.name())?
                .ok_or_else(|| BirggitError::BranchNotFound {
                    name: second.name().to_string(),
                })?;
            let ours = find_project_branch(&*tx, first.project(), first.name())?
                .ok_or_else(|| BirggitError::BranchNotFound {
                    name: first.name().to_string(),
                })?;
            // a merge commit needs two distinct parents
            if ours.end == theirs.end {
                return Err(BirggitError::InvalidArgument(format!(
                    "branches {} and {} share their head, nothing to merge",
                    first.name(),
                    second.name()
                )));
            }
            let their_head = commit_at(&*tx, theirs.end)?;

            let merge_commit = Commit::new(
                Ulid::new().to_string().to_lowercase(),
                format!("Merged {}", second.name()),
            )?;
            let relationship = advance(tx, &merge_commit, first)?;
            merge_relationship(tx, &ParentCommit::new(their_head, merge_commit.clone()))?;

            info!(
                into = first.name(),
                from = second.name(),
                commit = merge_commit.identifier(),
                "branches merged"
            );
            Ok(relationship)
        })
    }

    /// Create and index `branch`, then commit each of `commits` on it in order.
    ///
    /// Returns the final branch relationship.
    pub fn init(&self, branch: &Branch, commits: &[Commit]) -> BirggitResult<RelationshipId> {
        if commits.is_empty() {
            return Err(BirggitError::InvalidArgument(
                "init needs at least one commit".to_string(),
            ));
        }

        self.with_transaction("init", |tx| {
            let mut relationship = create_relationship(tx, branch)?;
            index_branch(tx, relationship)?;

            let mut current = branch.clone();
            for commit in commits {
                relationship = advance(tx, commit, &current)?;
                current = current.advanced(commit.clone());
            }
            info!(branch = branch.name(), commits = commits.len(), "branch initialized");
            Ok(relationship)
        })
    }

    // ==================== History ====================

    /// Latest commits of a branch, head first, one page long.
    pub fn log(&self, branch: &str) -> BirggitResult<Vec<NodeId>> {
        self.log_page(branch, self.config.page_size)
    }

    /// Latest `limit` commits of a branch, head first.
    pub fn log_page(&self, branch: &str, limit: usize) -> BirggitResult<Vec<NodeId>> {
        check_branch_name(branch)?;
        self.with_transaction("log", |tx| {
            let head = branch_head(&*tx, branch)?;
            let parent = parent_type()?;
            Ok(ancestry::log(&*tx, &parent, head, Some(limit))?)
        })
    }

    /// Common ancestor of the heads of two branches.
    pub fn find_common_ancestor(&self, a: &str, b: &str) -> BirggitResult<Option<NodeId>> {
        check_branch_name(a)?;
        check_branch_name(b)?;
        self.with_transaction("find_common_ancestor", |tx| {
            let parent = parent_type()?;
            let ours = branch_head(&*tx, a)?;
            let theirs = branch_head(&*tx, b)?;
            self.common_ancestor(&*tx, &parent, ours, theirs)
        })
    }

    /// Commits of branch `b` since it parted from branch `a`, head first,
    /// ending with the common ancestor. At most one page long; empty when the
    /// branches share no history.
    pub fn log_between(&self, a: &str, b: &str) -> BirggitResult<Vec<NodeId>> {
        check_branch_name(a)?;
        check_branch_name(b)?;
        self.with_transaction("log_between", |tx| {
            let parent = parent_type()?;
            let ours = branch_head(&*tx, a)?;
            let theirs = branch_head(&*tx, b)?;
            let Some(ancestor) = self.common_ancestor(&*tx, &parent, ours, theirs)? else {
                return Ok(Vec::new());
            };

            let mut commits = Vec::new();
            for node in ancestry::log(&*tx, &parent, theirs, Some(self.config.page_size))? {
                commits.push(node);
                if node == ancestor {
                    break;
                }
            }
            Ok(commits)
        })
    }

    fn common_ancestor<T: GraphTransaction>(
        &self,
        tx: &T,
        parent: &RelationshipType,
        ours: NodeId,
        theirs: NodeId,
    ) -> BirggitResult<Option<NodeId>> {
        let our_log = ancestry::log(tx, parent, ours, None)?;
        let ancestor = match self.config.ancestor_strategy {
            AncestorStrategy::FirstMatch => {
                let their_log = ancestry::log(tx, parent, theirs, None)?;
                ancestry::first_match(&our_log, &their_log)
            }
            AncestorStrategy::MergeBase => {
                ancestry::merge_base(tx, parent, &our_log, ours, theirs)?
            }
        };
        debug!(%ours, %theirs, ?ancestor, "common ancestor");
        Ok(ancestor)
    }

    // ==================== Lookup and cleanup ====================

    /// Node of the commit with that identifier.
    pub fn find_one_commit(&self, identifier: &str) -> BirggitResult<Option<NodeId>> {
        self.with_transaction("find_one_commit", |tx| {
            let query = NodeQuery::label(commit_label()?)
                .where_eq(Commit::IDENTIFIER, Value::String(identifier.to_string()));
            match tx.query(&query)?.as_slice() {
                [] => Ok(None),
                [node] => Ok(Some(*node)),
                many => Err(BirggitError::AmbiguousCommit {
                    identifier: identifier.to_string(),
                    hits: many.len(),
                }),
            }
        })
    }

    /// Delete the commit with that identifier and its relationships.
    /// Returns the number of commits deleted.
    pub fn delete(&self, identifier: &str) -> BirggitResult<usize> {
        self.with_transaction("delete", |tx| {
            let query = NodeQuery::label(commit_label()?)
                .where_eq(Commit::IDENTIFIER, Value::String(identifier.to_string()));
            delete_matching(tx, &query)
        })
    }

    /// Delete every commit with one of those identifiers.
    pub fn delete_all(&self, identifiers: &[&str]) -> BirggitResult<usize> {
        if identifiers.is_empty() {
            return Err(BirggitError::InvalidArgument(
                "no commit identifiers given".to_string(),
            ));
        }
        self.with_transaction("delete_all", |tx| {
            let values = identifiers
                .iter()
                .map(|id| Value::String(id.to_string()))
                .collect();
            let query = NodeQuery::label(commit_label()?).where_in(Commit::IDENTIFIER, values);
            delete_matching(tx, &query)
        })
    }

    /// Commits matching the configured orphan rule, in node id order.
    pub fn find_orphan_commits(&self) -> BirggitResult<Vec<NodeId>> {
        self.with_transaction("find_orphan_commits", |tx| {
            Ok(tx.query(&self.orphan_query()?)?)
        })
    }

    /// Delete every orphan commit. Returns the number deleted.
    pub fn gc(&self) -> BirggitResult<usize> {
        self.with_transaction("gc", |tx| {
            let deleted = delete_matching(tx, &self.orphan_query()?)?;
            info!(deleted, "garbage collected");
            Ok(deleted)
        })
    }

    fn orphan_query(&self) -> BirggitResult<NodeQuery> {
        let query = NodeQuery::label(commit_label()?);
        Ok(match self.config.orphan_rule {
            OrphanRule::NoOutgoing => query.without_outgoing(),
            OrphanRule::Disconnected => query.without_relationships(),
        })
    }

    // ==================== Reads ====================

    pub fn node(&self, node: NodeId) -> BirggitResult<Option<NodeRecord>> {
        self.with_transaction("node", |tx| Ok(tx.node(node)?))
    }

    pub fn relationship(&self, relationship: RelationshipId) -> BirggitResult<Option<RelationshipRecord>> {
        self.with_transaction("relationship", |tx| Ok(tx.relationship(relationship)?))
    }

    /// Identifier of a commit node.
    pub fn commit_identifier(&self, node: NodeId) -> BirggitResult<Option<String>> {
        self.with_transaction("commit_identifier", |tx| {
            Ok(tx.node(node)?.and_then(|record| {
                record
                    .property(Commit::IDENTIFIER)
                    .and_then(Value::as_str)
                    .map(str::to_string)
            }))
        })
    }
}

fn check_branch_name(name: &str) -> BirggitResult<()> {
    if name.is_empty() {
        return Err(BirggitError::InvalidArgument(
            "branch name cannot be empty".to_string(),
        ));
    }
    Ok(())
}

fn commit_label() -> BirggitResult<Label> {
    resolve_labels(Commit::descriptor())?
        .into_iter()
        .next()
        .ok_or_else(|| BirggitError::InvalidArgument("commit type has no label".to_string()))
}

fn parent_type() -> BirggitResult<RelationshipType> {
    Ok(resolve_relationship_type(ParentCommit::descriptor())?.rel_type)
}

fn commit_identifier_of(node: &NodeRecord) -> BirggitResult<String> {
    node.property(Commit::IDENTIFIER)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| BirggitError::InvalidArgument(format!("{} is not a commit", node.id)))
}

/// Stored commit at `node`, rebuilt as a domain value.
fn commit_at<T: GraphTransaction>(tx: &T, node: NodeId) -> BirggitResult<Commit> {
    let record = tx.node(node)?.ok_or(BirggitError::NodeNotFound(node))?;
    Ok(Commit::from_node(&record)?)
}

fn project_name<T: GraphTransaction>(tx: &T, node: NodeId) -> BirggitResult<String> {
    let name = tx
        .property(node.into(), Project::NAME)?
        .and_then(|v| v.as_str().map(str::to_string))
        .unwrap_or_else(|| node.to_string());
    Ok(name)
}

/// Recreate `rel` with `from` replaced by `to` at either end, move its index
/// entries over and delete it.
fn relink<T: GraphTransaction>(
    tx: &mut T,
    rel: &RelationshipRecord,
    from: NodeId,
    to: NodeId,
) -> BirggitResult<RelationshipId> {
    let swap = |node: NodeId| if node == from { to } else { node };
    let recreated = tx.create_relationship(swap(rel.start), swap(rel.end), rel.rel_type.clone())?;
    for (key, value) in &rel.properties {
        tx.set_property(recreated.into(), key, value.clone())?;
    }
    for entry in tx.index_entries(rel.id.into())? {
        tx.index_add(&entry.index, recreated.into(), &entry.key, &entry.value)?;
    }
    tx.delete_relationship(rel.id)?;
    Ok(recreated)
}

/// Relationships indexed as branches under `name`.
fn indexed_branches<T: GraphTransaction>(
    tx: &T,
    name: &str,
) -> BirggitResult<Vec<RelationshipRecord>> {
    let descriptor = Branch::descriptor();
    let index = resolve_index_name(descriptor);
    let key = resolve_identity_key(descriptor)?;

    let mut branches = Vec::new();
    for element in tx.index_get(&index, ElementKind::Relationship, &key, &Value::String(name.to_string()))? {
        let Some(id) = element.as_relationship() else {
            continue;
        };
        let record = tx
            .relationship(id)?
            .ok_or(GraphError::RelationshipNotFound(id))?;
        branches.push(record);
    }
    Ok(branches)
}

fn find_branch<T: GraphTransaction>(
    tx: &T,
    name: &str,
) -> BirggitResult<Option<RelationshipRecord>> {
    let mut branches = indexed_branches(tx, name)?;
    match branches.len() {
        0 => Ok(None),
        1 => Ok(branches.pop()),
        _ => {
            let mut projects = Vec::with_capacity(branches.len());
            for branch in &branches {
                projects.push(project_name(tx, branch.start)?);
            }
            Err(BirggitError::AmbiguousBranch {
                name: name.to_string(),
                projects,
            })
        }
    }
}

fn find_project_branch<T: GraphTransaction>(
    tx: &T,
    project: &Project,
    name: &str,
) -> BirggitResult<Option<RelationshipRecord>> {
    let identity = resolve_identity(project)?;
    let index = resolve_index_name(Project::descriptor());
    let Some(project_node) = tx
        .index_get_single(&index, ElementKind::Node, &identity.key, identity.value)?
        .and_then(|e| e.as_node())
    else {
        return Ok(None);
    };

    let mut branches: Vec<RelationshipRecord> = indexed_branches(tx, name)?
        .into_iter()
        .filter(|b| b.start == project_node)
        .collect();
    match branches.len() {
        0 => Ok(None),
        1 => Ok(branches.pop()),
        _ => Err(BirggitError::AmbiguousBranch {
            name: name.to_string(),
            projects: vec![project.name().to_string(); branches.len()],
        }),
    }
}

fn branch_head<T: GraphTransaction>(tx: &T, name: &str) -> BirggitResult<NodeId> {
    find_branch(tx, name)?
        .map(|branch| branch.end)
        .ok_or_else(|| BirggitError::BranchNotFound {
            name: name.to_string(),
        })
}

fn index_branch<T: GraphTransaction>(tx: &mut T, branch: RelationshipId) -> BirggitResult<()> {
    let record = tx
        .relationship(branch)?
        .ok_or(GraphError::RelationshipNotFound(branch))?;
    let descriptor = Branch::descriptor();
    let branch_type = resolve_relationship_type(descriptor)?.rel_type;
    if record.rel_type != branch_type {
        return Err(BirggitError::InvalidArgument(format!(
            "{} is a {} relationship, not {}",
            branch, record.rel_type, branch_type
        )));
    }

    let property = resolve_identity_property(descriptor)?;
    let name = record.property(property).cloned().ok_or_else(|| {
        BirggitError::InvalidArgument(format!("{} has no {} property", branch, property))
    })?;
    let index = resolve_index_name(descriptor);
    let key = resolve_identity_key(descriptor)?;

    for element in tx.index_get(&index, ElementKind::Relationship, &key, &name)? {
        let Some(id) = element.as_relationship() else {
            continue;
        };
        if id == branch {
            continue;
        }
        let same_project = tx
            .relationship(id)?
            .map_or(false, |other| other.start == record.start);
        if same_project {
            // deleting also drops its index entries
            tx.delete_relationship(id)?;
            debug!(%id, %branch, "superseded branch deleted");
        }
    }

    tx.index_add(&index, branch.into(), &key, &name)?;
    debug!(%branch, %name, "branch indexed");
    Ok(())
}

/// Commit on a branch inside an open transaction.
fn advance<T: GraphTransaction>(
    tx: &mut T,
    commit: &Commit,
    branch: &Branch,
) -> BirggitResult<RelationshipId> {
    let current = find_project_branch(&*tx, branch.project(), branch.name())?.ok_or_else(|| {
        BirggitError::BranchNotFound {
            name: branch.name().to_string(),
        }
    })?;
    let head = commit_at(&*tx, current.end)?;
    if head == *commit {
        return Err(BirggitError::InvalidArgument(format!(
            "{} is already the head of {}",
            commit.identifier(),
            branch.name()
        )));
    }

    tx.delete_relationship(current.id)?;
    merge_relationship(tx, &ParentCommit::new(head, commit.clone()))?;

    let relationship = create_relationship(tx, &branch.advanced(commit.clone()))?;
    index_branch(tx, relationship)?;

    debug!(branch = branch.name(), commit = commit.identifier(), %relationship, "branch advanced");
    Ok(relationship)
}

/// Delete the nodes matched by `query` with their relationships.
fn delete_matching<T: GraphTransaction>(tx: &mut T, query: &NodeQuery) -> BirggitResult<usize> {
    let nodes = tx.query(query)?;
    for node in &nodes {
        tx.delete_node(*node)?;
    }
    debug!(%query, deleted = nodes.len(), "nodes deleted");
    Ok(nodes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::ElementId;
    use serde_json::json;
    use tracing_subscriber::EnvFilter;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn setup() -> Birggit<MemoryGraph> {
        init_tracing();
        Birggit::in_memory()
    }

    fn project() -> Project {
        Project::new("BIRGGIT").unwrap()
    }

    fn commit(identifier: &str) -> Commit {
        Commit::new(identifier, format!("commit {}", identifier)).unwrap()
    }

    fn identifiers(birggit: &Birggit<MemoryGraph>, nodes: &[NodeId]) -> Vec<String> {
        nodes
            .iter()
            .map(|node| birggit.commit_identifier(*node).unwrap().unwrap())
            .collect()
    }

    fn head(birggit: &Birggit<MemoryGraph>, branch: RelationshipId) -> NodeId {
        birggit.relationship(branch).unwrap().unwrap().end
    }

    fn incoming_parents(birggit: &Birggit<MemoryGraph>, node: NodeId) -> usize {
        let tx = birggit.graph().begin().unwrap();
        let parents = tx
            .relationships(node, Some(&RelationshipType::new("HAS_PARENT")), Direction::Incoming)
            .unwrap();
        parents.len()
    }

    /// munster: 0xcafebabe <- 00124e98ca <- 123e76cdf <- 0xe43770ad
    /// prod:    00124e98ca <- 0xf0f0f0f0
    fn two_branches(birggit: &Birggit<MemoryGraph>) {
        birggit
            .init(
                &Branch::new(project(), commit("0xcafebabe")),
                &[commit("00124e98ca"), commit("123e76cdf"), commit("0xe43770ad")],
            )
            .unwrap();
        birggit
            .init(
                &Branch::named(project(), commit("00124e98ca"), "prod").unwrap(),
                &[commit("0xf0f0f0f0")],
            )
            .unwrap();
    }

    #[test]
    fn test_create_project_and_commit_are_idempotent() {
        let birggit = setup();
        let first = birggit.create_project(&project()).unwrap();
        let second = birggit.create_project(&project()).unwrap();
        assert_eq!(first, second);

        let c1 = birggit.commit(&commit("0xcafebabe")).unwrap();
        let again = birggit
            .commit(&Commit::new("0xcafebabe", "other message").unwrap())
            .unwrap();
        assert_eq!(c1, again);
        assert_eq!(birggit.graph().node_count(), 2);

        let record = birggit.node(first).unwrap().unwrap();
        assert!(record.has_label(&Label::new("PROJECT")));
        assert_eq!(record.property("name"), Some(&json!("BIRGGIT")));
    }

    #[test]
    fn test_create_and_index_branch() {
        let birggit = setup();
        let branch = Branch::new(project(), commit("0xbwahahaha"));
        let relationship = birggit.create_branch(&branch).unwrap();

        let record = birggit.relationship(relationship).unwrap().unwrap();
        assert_eq!(record.rel_type, RelationshipType::new("HAS_BRANCH"));
        assert_eq!(record.property("name"), Some(&json!("munster")));
        assert_eq!(birggit.find_branch("munster").unwrap(), None);

        birggit.index_branch(relationship).unwrap();
        assert_eq!(birggit.find_branch("munster").unwrap(), Some(relationship));
        assert_eq!(
            birggit.find_project_branch(&project(), "munster").unwrap(),
            Some(relationship)
        );
        assert_eq!(birggit.find_branch("prod").unwrap(), None);
    }

    #[test]
    fn test_index_branch_replaces_same_project_entry() {
        let birggit = setup();
        let first = birggit
            .create_branch(&Branch::new(project(), commit("c1")))
            .unwrap();
        let second = birggit
            .create_branch(&Branch::new(project(), commit("c2")))
            .unwrap();
        birggit.index_branch(first).unwrap();
        birggit.index_branch(second).unwrap();

        assert_eq!(birggit.find_branch("munster").unwrap(), Some(second));
        assert!(birggit.relationship(first).unwrap().is_none());
        assert!(birggit.relationship(second).unwrap().is_some());
    }

    #[test]
    fn test_index_branch_rejects_other_relationships() {
        let birggit = setup();
        birggit
            .init(&Branch::new(project(), commit("c1")), &[commit("c2")])
            .unwrap();
        let c2 = birggit.find_one_commit("c2").unwrap().unwrap();
        let tx = birggit.graph().begin().unwrap();
        let parent_link = tx
            .relationships(c2, None, Direction::Incoming)
            .unwrap()
            .into_iter()
            .find(|r| r.rel_type.as_str() == "HAS_PARENT")
            .unwrap()
            .id;
        drop(tx);

        let result = birggit.index_branch(parent_link);
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));
    }

    #[test]
    fn test_find_branch_argument_checks() {
        let birggit = setup();
        assert!(matches!(
            birggit.find_branch(""),
            Err(BirggitError::InvalidArgument(_))
        ));
        assert_eq!(birggit.find_branch("missing").unwrap(), None);
        let result = birggit.log("missing");
        assert!(matches!(result, Err(BirggitError::BranchNotFound { .. })));
    }

    #[test]
    fn test_commit_on_branch_moves_head() {
        let birggit = setup();
        let branch = Branch::new(project(), commit("c1"));
        let initial = birggit.create_branch(&branch).unwrap();
        birggit.index_branch(initial).unwrap();

        let updated = birggit.commit_on_branch(&commit("c2"), &branch).unwrap();
        assert_ne!(initial, updated);
        assert!(birggit.relationship(initial).unwrap().is_none());
        assert_eq!(birggit.find_branch("munster").unwrap(), Some(updated));

        let log = birggit.log("munster").unwrap();
        assert_eq!(identifiers(&birggit, &log), vec!["c2", "c1"]);

        let c2 = head(&birggit, updated);
        assert_eq!(incoming_parents(&birggit, c2), 1);
    }

    #[test]
    fn test_commit_on_branch_requires_indexed_branch() {
        let birggit = setup();
        let branch = Branch::new(project(), commit("c1"));
        birggit.create_branch(&branch).unwrap();

        let result = birggit.commit_on_branch(&commit("c2"), &branch);
        assert!(matches!(result, Err(BirggitError::BranchNotFound { .. })));
        assert!(birggit.find_one_commit("c2").unwrap().is_none());
    }

    #[test]
    fn test_init_requires_commits() {
        let birggit = setup();
        let result = birggit.init(&Branch::new(project(), commit("c1")), &[]);
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));
        assert_eq!(birggit.graph().node_count(), 0);
    }

    #[test]
    fn test_failed_operation_rolls_back() {
        let birggit = setup();
        let result = birggit.init(
            &Branch::new(project(), commit("c1")),
            &[commit("c2"), commit("c2")],
        );
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));
        assert_eq!(birggit.graph().node_count(), 0);
        assert_eq!(birggit.graph().relationship_count(), 0);
    }

    #[test]
    fn test_log_page() {
        let birggit = setup();
        birggit
            .init(
                &Branch::new(project(), commit("c1")),
                &[commit("c2"), commit("c3")],
            )
            .unwrap();

        let page = birggit.log_page("munster", 2).unwrap();
        assert_eq!(identifiers(&birggit, &page), vec!["c3", "c2"]);
        assert!(birggit.log_page("munster", 0).unwrap().is_empty());
    }

    #[test]
    fn test_log_uses_configured_page_size() {
        init_tracing();
        let config = BirggitConfig::new().page_size(2);
        let birggit = Birggit::new(MemoryGraph::new(), config).unwrap();
        birggit
            .init(
                &Branch::new(project(), commit("c1")),
                &[commit("c2"), commit("c3"), commit("c4")],
            )
            .unwrap();

        let log = birggit.log("munster").unwrap();
        assert_eq!(identifiers(&birggit, &log), vec!["c4", "c3"]);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = Birggit::new(MemoryGraph::new(), BirggitConfig::new().page_size(0));
        assert!(matches!(result, Err(BirggitError::InvalidConfig(_))));
    }

    #[test]
    fn test_two_branches() {
        let birggit = setup();
        two_branches(&birggit);

        let munster = birggit.log("munster").unwrap();
        assert_eq!(
            identifiers(&birggit, &munster),
            vec!["0xe43770ad", "123e76cdf", "00124e98ca", "0xcafebabe"]
        );

        let page = birggit.log_page("munster", 2).unwrap();
        assert_eq!(identifiers(&birggit, &page), vec!["0xe43770ad", "123e76cdf"]);

        let prod = birggit.log_page("prod", 3).unwrap();
        assert_eq!(
            identifiers(&birggit, &prod),
            vec!["0xf0f0f0f0", "00124e98ca", "0xcafebabe"]
        );
    }

    #[test]
    fn test_common_ancestor_and_log_between() {
        let birggit = setup();
        two_branches(&birggit);

        let ancestor = birggit.find_common_ancestor("munster", "prod").unwrap();
        assert_eq!(ancestor, birggit.find_one_commit("00124e98ca").unwrap());

        let between = birggit.log_between("munster", "prod").unwrap();
        assert_eq!(identifiers(&birggit, &between), vec!["0xf0f0f0f0", "00124e98ca"]);
    }

    #[test]
    fn test_common_ancestor_with_merge_base() {
        init_tracing();
        let config = BirggitConfig::new().ancestor_strategy(AncestorStrategy::MergeBase);
        let birggit = Birggit::new(MemoryGraph::new(), config).unwrap();
        two_branches(&birggit);

        let ancestor = birggit.find_common_ancestor("prod", "munster").unwrap();
        assert_eq!(ancestor, birggit.find_one_commit("00124e98ca").unwrap());
    }

    #[test]
    fn test_disjoint_histories() {
        let birggit = setup();
        let other = Project::new("OTHER").unwrap();
        birggit
            .init(
                &Branch::named(project(), commit("a1"), "left").unwrap(),
                &[commit("a2")],
            )
            .unwrap();
        birggit
            .init(
                &Branch::named(other, commit("b1"), "right").unwrap(),
                &[commit("b2")],
            )
            .unwrap();

        assert_eq!(birggit.find_common_ancestor("left", "right").unwrap(), None);
        assert!(birggit.log_between("left", "right").unwrap().is_empty());
    }

    #[test]
    fn test_merge() {
        let birggit = setup();
        let munster = Branch::new(project(), commit("c1"));
        birggit.init(&munster, &[commit("c2")]).unwrap();
        let prod = Branch::named(project(), commit("c1"), "prod").unwrap();
        birggit.init(&prod, &[commit("p1")]).unwrap();

        let merged = birggit.merge(&munster, &prod).unwrap();
        let merge_node = head(&birggit, merged);
        let record = birggit.node(merge_node).unwrap().unwrap();
        assert_eq!(record.property("message"), Some(&json!("Merged prod")));
        assert_eq!(incoming_parents(&birggit, merge_node), 2);
        assert_eq!(birggit.find_branch("munster").unwrap(), Some(merged));

        let log = birggit.log("munster").unwrap();
        assert_eq!(log[0], merge_node);
        assert_eq!(identifiers(&birggit, &log[1..]), vec!["c2", "c1", "p1"]);

        // the merged branch keeps its head
        let prod_log = birggit.log("prod").unwrap();
        assert_eq!(identifiers(&birggit, &prod_log), vec!["p1", "c1"]);
    }

    #[test]
    fn test_merge_errors() {
        let birggit = setup();
        let munster = Branch::new(project(), commit("c1"));
        birggit.init(&munster, &[commit("c2")]).unwrap();
        let nodes = birggit.graph().node_count();

        let missing = Branch::named(project(), commit("c1"), "missing").unwrap();
        let result = birggit.merge(&munster, &missing);
        assert!(matches!(result, Err(BirggitError::BranchNotFound { .. })));
        assert_eq!(birggit.graph().node_count(), nodes);

        let result = birggit.merge(&munster, &munster);
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));
    }

    #[test]
    fn test_merge_rejects_shared_head() {
        let birggit = setup();
        let munster = Branch::new(project(), commit("c1"));
        birggit.init(&munster, &[commit("c2")]).unwrap();
        let prod = Branch::named(project(), commit("c2"), "prod").unwrap();
        let prod_branch = birggit.create_branch(&prod).unwrap();
        birggit.index_branch(prod_branch).unwrap();
        let nodes = birggit.graph().node_count();
        let relationships = birggit.graph().relationship_count();

        let result = birggit.merge(&munster, &prod);
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));
        assert_eq!(birggit.graph().node_count(), nodes);
        assert_eq!(birggit.graph().relationship_count(), relationships);

        let log = birggit.log("munster").unwrap();
        assert_eq!(identifiers(&birggit, &log), vec!["c2", "c1"]);
    }

    #[test]
    fn test_stored_commit_serializes_like_original() {
        let birggit = setup();
        let original = Commit::new("0xcafebabe", "Hello world").unwrap();
        let node = birggit.commit(&original).unwrap();

        let record = birggit.node(node).unwrap().unwrap();
        let rebuilt = Commit::from_node(&record).unwrap();
        assert_eq!(rebuilt, original);
        assert_eq!(
            crate::cypher::serialize(&rebuilt).unwrap(),
            crate::cypher::serialize(&original).unwrap()
        );
        assert_eq!(
            crate::cypher::serialize(&rebuilt).unwrap(),
            "(n:COMMIT {identifier:'0xcafebabe',message:'Hello world'})"
        );
    }

    #[test]
    fn test_init_again_replaces_branch_relationship() {
        let birggit = setup();
        let munster = Branch::new(project(), commit("c1"));
        birggit.init(&munster, &[commit("c2")]).unwrap();
        let project_node = birggit.create_project(&project()).unwrap();

        let branch = birggit.init(&munster, &[commit("c2")]).unwrap();
        assert_eq!(birggit.find_branch("munster").unwrap(), Some(branch));

        let tx = birggit.graph().begin().unwrap();
        let branches = tx
            .relationships(
                project_node,
                Some(&RelationshipType::new("HAS_BRANCH")),
                Direction::Outgoing,
            )
            .unwrap();
        assert_eq!(branches.len(), 1);
        assert_eq!(branches[0].id, branch);
    }

    #[test]
    fn test_branch_names_shared_across_projects() {
        let birggit = setup();
        let other = Project::new("OTHER").unwrap();
        birggit
            .init(&Branch::new(project(), commit("a1")), &[commit("a2")])
            .unwrap();
        let other_branch = Branch::new(other.clone(), commit("b1"));
        birggit.init(&other_branch, &[commit("b2")]).unwrap();

        match birggit.find_branch("munster") {
            Err(BirggitError::AmbiguousBranch { projects, .. }) => {
                assert_eq!(projects, vec!["BIRGGIT".to_string(), "OTHER".to_string()]);
            }
            result => panic!("unexpected result: {:?}", result),
        }

        let updated = birggit
            .commit_on_branch(&commit("b3"), &other_branch)
            .unwrap();
        assert_eq!(
            birggit.find_project_branch(&other, "munster").unwrap(),
            Some(updated)
        );
        let a_head = birggit.find_project_branch(&project(), "munster").unwrap().unwrap();
        assert_eq!(
            birggit.commit_identifier(head(&birggit, a_head)).unwrap().as_deref(),
            Some("a2")
        );
    }

    #[test]
    fn test_amend_isolated_commit() {
        let birggit = setup();
        let original = birggit
            .commit(&Commit::new("0xdeadbeef", "Awesomely awesome").unwrap())
            .unwrap();
        let amended = birggit.amend(original, "Oops, forgot that!").unwrap();
        assert_ne!(original, amended);

        let record = birggit.node(amended).unwrap().unwrap();
        assert!(record.has_label(&Label::new("COMMIT")));
        assert_eq!(record.property("identifier"), Some(&json!("0xdeadbeef_amended")));
        assert_eq!(record.property("message"), Some(&json!("Oops, forgot that!")));
        assert_eq!(birggit.find_one_commit("0xdeadbeef_amended").unwrap(), Some(amended));

        let before = birggit.node(original).unwrap().unwrap();
        assert_eq!(before.property("message"), Some(&json!("Awesomely awesome")));

        assert_eq!(birggit.find_orphan_commits().unwrap(), vec![original, amended]);
        assert_eq!(birggit.gc().unwrap(), 2);
        assert!(birggit.find_orphan_commits().unwrap().is_empty());
        assert_eq!(birggit.graph().node_count(), 0);
    }

    #[test]
    fn test_amend_relinks_relationships() {
        let birggit = setup();
        birggit
            .init(
                &Branch::new(project(), commit("c1")),
                &[commit("c2"), commit("c3")],
            )
            .unwrap();
        let c2 = birggit.find_one_commit("c2").unwrap().unwrap();

        let amended = birggit.amend(c2, "better message").unwrap();

        let log = birggit.log("munster").unwrap();
        assert_eq!(identifiers(&birggit, &log), vec!["c3", "c2_amended", "c1"]);

        let tx = birggit.graph().begin().unwrap();
        assert!(tx.relationships(c2, None, Direction::Both).unwrap().is_empty());
        let link = tx
            .index_get_single(
                "PARENT_COMMIT",
                ElementKind::Relationship,
                "parentCommitIdentifier",
                &json!("c1->c2"),
            )
            .unwrap()
            .and_then(|e| e.as_relationship())
            .unwrap();
        assert_eq!(tx.relationship(link).unwrap().unwrap().end, amended);
        assert_eq!(
            tx.property(ElementId::Relationship(link), "identifier").unwrap(),
            Some(json!("c1->c2"))
        );
    }

    #[test]
    fn test_amend_branch_head() {
        let birggit = setup();
        birggit
            .init(&Branch::new(project(), commit("c1")), &[commit("c2")])
            .unwrap();
        let c2 = birggit.find_one_commit("c2").unwrap().unwrap();

        let amended = birggit.amend(c2, "fixed").unwrap();
        let branch = birggit.find_branch("munster").unwrap().unwrap();
        assert_eq!(head(&birggit, branch), amended);

        birggit
            .commit_on_branch(&commit("c3"), &Branch::new(project(), commit("c2_amended")))
            .unwrap();
        let log = birggit.log("munster").unwrap();
        assert_eq!(identifiers(&birggit, &log), vec!["c3", "c2_amended", "c1"]);
    }

    #[test]
    fn test_amend_errors() {
        let birggit = setup();
        let result = birggit.amend(NodeId(42), "nope");
        assert!(matches!(result, Err(BirggitError::NodeNotFound(_))));

        let project_node = birggit.create_project(&project()).unwrap();
        let result = birggit.amend(project_node, "nope");
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));

        let original = birggit.commit(&commit("c1")).unwrap();
        birggit.amend(original, "once").unwrap();
        let result = birggit.amend(original, "twice");
        assert!(matches!(result, Err(BirggitError::CommitExists { .. })));
    }

    #[test]
    fn test_orphan_rules() {
        let birggit = setup();
        birggit
            .init(
                &Branch::new(project(), commit("c1")),
                &[commit("c2"), commit("c3")],
            )
            .unwrap();
        let c2 = birggit.find_one_commit("c2").unwrap().unwrap();
        let c3 = birggit.find_one_commit("c3").unwrap().unwrap();
        birggit.amend(c2, "amended").unwrap();

        // branch heads point nowhere
        assert_eq!(birggit.find_orphan_commits().unwrap(), vec![c2, c3]);

        let disconnected = Birggit::new(
            birggit.graph().clone(),
            BirggitConfig::new().orphan_rule(OrphanRule::Disconnected),
        )
        .unwrap();
        assert_eq!(disconnected.find_orphan_commits().unwrap(), vec![c2]);
        assert_eq!(disconnected.gc().unwrap(), 1);
        assert_eq!(
            identifiers(&disconnected, &disconnected.log("munster").unwrap()),
            vec!["c3", "c2_amended", "c1"]
        );
    }

    #[test]
    fn test_find_and_delete_commits() {
        let birggit = setup();
        for id in ["a", "b", "c"] {
            birggit.commit(&commit(id)).unwrap();
        }
        assert!(birggit.find_one_commit("a").unwrap().is_some());
        assert!(birggit.find_one_commit("zzz").unwrap().is_none());

        assert_eq!(birggit.delete("a").unwrap(), 1);
        assert_eq!(birggit.delete("a").unwrap(), 0);
        assert!(birggit.find_one_commit("a").unwrap().is_none());

        assert_eq!(birggit.delete_all(&["b", "c", "zzz"]).unwrap(), 2);
        assert_eq!(birggit.graph().node_count(), 0);

        let result = birggit.delete_all(&[]);
        assert!(matches!(result, Err(BirggitError::InvalidArgument(_))));
    }

    #[test]
    fn test_delete_branch_head_drops_branch() {
        let birggit = setup();
        birggit
            .init(&Branch::new(project(), commit("c1")), &[commit("c2")])
            .unwrap();
        assert_eq!(birggit.delete("c2").unwrap(), 1);
        assert_eq!(birggit.find_branch("munster").unwrap(), None);
    }
}
