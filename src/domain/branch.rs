use std::fmt;

use serde_json::Value;

use crate::domain::commit::Commit;
use crate::domain::error::{non_empty, DomainResult};
use crate::domain::project::Project;
use crate::domain::text;
use crate::schema::{AttributeValue, Domain, FieldDescriptor, TypeDescriptor};

/// Name given to branches created without one.
pub const DEFAULT_BRANCH_NAME: &str = "munster";

static BRANCH: TypeDescriptor = TypeDescriptor::relationship("Branch", true)
    .relationship_type("HAS_BRANCH")
    .fields(&[
        FieldDescriptor::new("project").start(),
        FieldDescriptor::new("commit").end(),
        FieldDescriptor::new("name")
            .property_named(Branch::NAME)
            .identity_named("branchName"),
    ]);

static PARENT_COMMIT: TypeDescriptor = TypeDescriptor::relationship("ParentCommit", true)
    .relationship_type("HAS_PARENT")
    .fields(&[
        FieldDescriptor::new("parent").start(),
        FieldDescriptor::new("child").end(),
        FieldDescriptor::new("identifier")
            .property_named(ParentCommit::IDENTIFIER)
            .identity_named("parentCommitIdentifier"),
    ]);

/// A named pointer from a project to its head commit.
#[derive(Debug, Clone)]
pub struct Branch {
    project: Project,
    commit: Commit,
    name: Value,
}

impl Branch {
    /// property holding the branch name
    pub const NAME: &'static str = "name";

    /// create the default branch of a project
    pub fn new(project: Project, commit: Commit) -> Self {
        Self {
            project,
            commit,
            name: Value::String(DEFAULT_BRANCH_NAME.to_string()),
        }
    }

    /// create a named branch, rejecting empty names
    pub fn named(project: Project, commit: Commit, name: impl Into<String>) -> DomainResult<Self> {
        let name = non_empty("branch name", name.into())?;
        Ok(Self {
            project,
            commit,
            name: Value::String(name),
        })
    }

    /// The same branch moved to another head commit.
    pub fn advanced(&self, commit: Commit) -> Self {
        Self {
            project: self.project.clone(),
            commit,
            name: self.name.clone(),
        }
    }

    pub fn project(&self) -> &Project {
        &self.project
    }

    pub fn commit(&self) -> &Commit {
        &self.commit
    }

    pub fn name(&self) -> &str {
        text(&self.name)
    }

    pub fn descriptor() -> &'static TypeDescriptor {
        &BRANCH
    }
}

impl Domain for Branch {
    fn descriptor(&self) -> &'static TypeDescriptor {
        &BRANCH
    }

    fn attribute(&self, field: &str) -> Option<AttributeValue<'_>> {
        match field {
            "project" => Some(AttributeValue::Entity(&self.project)),
            "commit" => Some(AttributeValue::Entity(&self.commit)),
            "name" => Some(AttributeValue::Scalar(&self.name)),
            _ => None,
        }
    }
}

/// Branches are equal when they share project and name, whatever their head.
impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.project == other.project && self.name == other.name
    }
}

impl Eq for Branch {}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}-[:HAS_BRANCH {{name: {}}}]->{}",
            self.project,
            self.name(),
            self.commit
        )
    }
}

/// Link from a parent commit to one of its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentCommit {
    parent: Commit,
    child: Commit,
    identifier: Value,
}

impl ParentCommit {
    /// property holding the link identifier
    pub const IDENTIFIER: &'static str = "identifier";

    /// Link `parent` to `child`. The identifier is `<parent>-><child>`.
    pub fn new(parent: Commit, child: Commit) -> Self {
        let identifier = format!("{}->{}", parent.identifier(), child.identifier());
        Self {
            parent,
            child,
            identifier: Value::String(identifier),
        }
    }

    pub fn parent(&self) -> &Commit {
        &self.parent
    }

    pub fn child(&self) -> &Commit {
        &self.child
    }

    pub fn identifier(&self) -> &str {
        text(&self.identifier)
    }

    pub fn descriptor() -> &'static TypeDescriptor {
        &PARENT_COMMIT
    }
}

impl Domain for ParentCommit {
    fn descriptor(&self) -> &'static TypeDescriptor {
        &PARENT_COMMIT
    }

    fn attribute(&self, field: &str) -> Option<AttributeValue<'_>> {
        match field {
            "parent" => Some(AttributeValue::Entity(&self.parent)),
            "child" => Some(AttributeValue::Entity(&self.child)),
            "identifier" => Some(AttributeValue::Scalar(&self.identifier)),
            _ => None,
        }
    }
}

impl fmt::Display for ParentCommit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-[:HAS_PARENT]->{}", self.parent, self.child)
    }
}
