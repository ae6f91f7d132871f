//! Typed node queries.
//!
//! `NodeQuery` covers the lookups the engine needs: one label plus a
//! conjunction of predicates. It renders as a Cypher-like statement so queries
//! can be logged in a familiar shape.

use std::fmt;

use serde_json::Value;

use crate::graph::record::NodeRecord;
use crate::graph::types::Label;

/// A condition on a candidate node.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// property equals a value
    Equals { key: String, value: Value },
    /// property equals one of the values
    In { key: String, values: Vec<Value> },
    /// no relationship starts at the node
    NoOutgoing,
    /// no relationship starts or ends at the node
    NoRelationships,
}

/// Degree of a candidate node, supplied by the store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Degree {
    pub outgoing: usize,
    pub incoming: usize,
}

impl Predicate {
    pub fn matches(&self, node: &NodeRecord, degree: Degree) -> bool {
        match self {
            Predicate::Equals { key, value } => node.property(key) == Some(value),
            Predicate::In { key, values } => node
                .property(key)
                .map_or(false, |actual| values.contains(actual)),
            Predicate::NoOutgoing => degree.outgoing == 0,
            Predicate::NoRelationships => degree.outgoing == 0 && degree.incoming == 0,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::Equals { key, value } => write!(f, "n.{} = {}", key, value),
            Predicate::In { key, values } => {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                write!(f, "n.{} IN [{}]", key, rendered.join(", "))
            }
            Predicate::NoOutgoing => write!(f, "NOT (n)-->()"),
            Predicate::NoRelationships => write!(f, "NOT (n)--()"),
        }
    }
}

/// Nodes carrying a label and satisfying every predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeQuery {
    label: Label,
    predicates: Vec<Predicate>,
}

impl NodeQuery {
    pub fn label(label: Label) -> Self {
        Self {
            label,
            predicates: Vec::new(),
        }
    }

    pub fn where_eq(mut self, key: impl Into<String>, value: Value) -> Self {
        self.predicates.push(Predicate::Equals {
            key: key.into(),
            value,
        });
        self
    }

    pub fn where_in(mut self, key: impl Into<String>, values: Vec<Value>) -> Self {
        self.predicates.push(Predicate::In {
            key: key.into(),
            values,
        });
        self
    }

    pub fn without_outgoing(mut self) -> Self {
        self.predicates.push(Predicate::NoOutgoing);
        self
    }

    pub fn without_relationships(mut self) -> Self {
        self.predicates.push(Predicate::NoRelationships);
        self
    }

    pub fn target_label(&self) -> &Label {
        &self.label
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Check a node against the label and every predicate.
    pub fn matches(&self, node: &NodeRecord, degree: Degree) -> bool {
        node.has_label(&self.label) && self.predicates.iter().all(|p| p.matches(node, degree))
    }
}

impl fmt::Display for NodeQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MATCH (n:{})", self.label)?;
        if !self.predicates.is_empty() {
            let rendered: Vec<String> = self.predicates.iter().map(|p| p.to_string()).collect();
            write!(f, " WHERE {}", rendered.join(" AND "))?;
        }
        write!(f, " RETURN n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::NodeId;
    use serde_json::json;

    fn commit(identifier: &str) -> NodeRecord {
        let mut node = NodeRecord::new(NodeId(1));
        node.labels.insert(Label::new("COMMIT"));
        node.properties
            .insert("identifier".to_string(), json!(identifier));
        node
    }

    #[test]
    fn test_display() {
        let query = NodeQuery::label(Label::new("COMMIT"))
            .where_in("identifier", vec![json!("a"), json!("b")])
            .without_outgoing();
        assert_eq!(
            query.to_string(),
            "MATCH (n:COMMIT) WHERE n.identifier IN [\"a\", \"b\"] AND NOT (n)-->() RETURN n"
        );
        assert_eq!(
            NodeQuery::label(Label::new("PROJECT")).to_string(),
            "MATCH (n:PROJECT) RETURN n"
        );
    }

    #[test]
    fn test_matches() {
        let node = commit("0xcafebabe");
        let isolated = Degree::default();
        let pointing = Degree {
            outgoing: 1,
            incoming: 0,
        };

        let by_id = NodeQuery::label(Label::new("COMMIT")).where_eq("identifier", json!("0xcafebabe"));
        assert!(by_id.matches(&node, isolated));

        let wrong_label = NodeQuery::label(Label::new("PROJECT"));
        assert!(!wrong_label.matches(&node, isolated));

        let orphan = NodeQuery::label(Label::new("COMMIT")).without_outgoing();
        assert!(orphan.matches(&node, isolated));
        assert!(!orphan.matches(&node, pointing));
    }

    #[test]
    fn test_no_relationships() {
        let node = commit("x");
        let incoming_only = Degree {
            outgoing: 0,
            incoming: 2,
        };
        assert!(Predicate::NoOutgoing.matches(&node, incoming_only));
        assert!(!Predicate::NoRelationships.matches(&node, incoming_only));
        assert!(!Predicate::In {
            key: "missing".to_string(),
            values: vec![json!("x")],
        }
        .matches(&node, incoming_only));
    }
}
