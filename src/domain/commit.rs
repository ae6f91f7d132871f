use std::fmt;

use serde_json::Value;

use crate::domain::error::{non_empty, DomainError, DomainResult};
use crate::domain::text;
use crate::graph::NodeRecord;
use crate::schema::{AttributeValue, Domain, FieldDescriptor, TypeDescriptor};

static COMMIT: TypeDescriptor = TypeDescriptor::node("Commit")
    .labels(&["COMMIT"])
    .fields(&[
        FieldDescriptor::new("identifier")
            .property_named(Commit::IDENTIFIER)
            .identity_named("commitIdentifier"),
        FieldDescriptor::new("message").property_named(Commit::MESSAGE),
    ]);

/// A commit, identified by an opaque identifier.
///
/// Commits are never changed once stored: amending one creates a new commit.
#[derive(Debug, Clone)]
pub struct Commit {
    identifier: Value,
    message: Value,
}

impl Commit {
    /// property holding the commit identifier
    pub const IDENTIFIER: &'static str = "identifier";
    /// property holding the commit message
    pub const MESSAGE: &'static str = "message";

    /// create a commit, rejecting empty identifiers
    pub fn new(identifier: impl Into<String>, message: impl Into<String>) -> DomainResult<Self> {
        let identifier = non_empty("commit identifier", identifier.into())?;
        Ok(Self {
            identifier: Value::String(identifier),
            message: Value::String(message.into()),
        })
    }

    /// Rebuild a commit from a stored node.
    ///
    /// A node without a message gets an empty one.
    pub fn from_node(node: &NodeRecord) -> DomainResult<Self> {
        let identifier = node
            .property(Self::IDENTIFIER)
            .and_then(Value::as_str)
            .ok_or(DomainError::MissingProperty {
                label: "COMMIT",
                property: Self::IDENTIFIER,
            })?;
        let message = node
            .property(Self::MESSAGE)
            .and_then(Value::as_str)
            .unwrap_or_default();
        Self::new(identifier, message)
    }

    pub fn identifier(&self) -> &str {
        text(&self.identifier)
    }

    pub fn message(&self) -> &str {
        text(&self.message)
    }

    pub fn descriptor() -> &'static TypeDescriptor {
        &COMMIT
    }
}

impl Domain for Commit {
    fn descriptor(&self) -> &'static TypeDescriptor {
        &COMMIT
    }

    fn attribute(&self, field: &str) -> Option<AttributeValue<'_>> {
        match field {
            "identifier" => Some(AttributeValue::Scalar(&self.identifier)),
            "message" => Some(AttributeValue::Scalar(&self.message)),
            _ => None,
        }
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.identifier == other.identifier
    }
}

impl Eq for Commit {}

impl fmt::Display for Commit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(:COMMIT {{identifier: {}, message: {}}})",
            self.identifier(),
            self.message()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Label, NodeId};
    use crate::schema::{resolve_identity_key, resolve_index_name, resolve_labels, resolve_property_keys};
    use serde_json::json;

    #[test]
    fn test_commit_mapping() {
        let descriptor = Commit::descriptor();
        assert_eq!(resolve_labels(descriptor).unwrap(), vec![Label::new("COMMIT")]);
        assert_eq!(resolve_index_name(descriptor), "COMMIT");
        assert_eq!(resolve_identity_key(descriptor).unwrap(), "commitIdentifier");
        assert_eq!(
            resolve_property_keys(descriptor).unwrap(),
            vec!["identifier", "message"]
        );
    }

    #[test]
    fn test_equality_by_identifier() {
        let a = Commit::new("0xcafebabe", "Hello world").unwrap();
        let b = Commit::new("0xcafebabe", "Something else").unwrap();
        assert_eq!(a, b);
        assert!(Commit::new("", "no id").is_err());
    }

    #[test]
    fn test_from_node() {
        let mut node = NodeRecord::new(NodeId(0));
        node.properties
            .insert(Commit::IDENTIFIER.to_string(), json!("0xcafebabe"));
        let commit = Commit::from_node(&node).unwrap();
        assert_eq!(commit.identifier(), "0xcafebabe");
        assert_eq!(commit.message(), "");

        let empty = NodeRecord::new(NodeId(1));
        assert!(matches!(
            Commit::from_node(&empty),
            Err(DomainError::MissingProperty { .. })
        ));
    }
}
