//! Static mapping metadata for domain types.
//!
//! Each mapped type publishes one `TypeDescriptor`, usually as a `static`
//! built with the const builders below:
//!
//! ```
//! use birggit::schema::{FieldDescriptor, TypeDescriptor};
//!
//! static TAG: TypeDescriptor = TypeDescriptor::node("ReleaseTag")
//!     .fields(&[FieldDescriptor::new("name").property().identity()]);
//! ```

use std::fmt;

use serde_json::Value;

/// Where a graph name (label, relationship type, index, property key) comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSource {
    /// derived from the type name or the attribute name
    Inferred,
    /// spelled out in the descriptor
    Explicit(&'static str),
}

impl NameSource {
    /// the explicit name, if any (empty explicit names count as inferred)
    pub fn explicit(&self) -> Option<&'static str> {
        match self {
            NameSource::Explicit(name) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// Whether a type maps to a node or to a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Node {
        /// explicit labels; empty means "infer from the type name"
        labels: &'static [&'static str],
    },
    Relationship {
        type_name: NameSource,
        directed: bool,
    },
}

impl EntityKind {
    pub fn is_node(&self) -> bool {
        matches!(self, EntityKind::Node { .. })
    }

    pub fn is_relationship(&self) -> bool {
        matches!(self, EntityKind::Relationship { .. })
    }
}

/// Role of an attribute holding one end of a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Start,
    End,
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::End => write!(f, "end"),
        }
    }
}

/// Markers carried by one attribute of a domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// attribute name, used as the default property key
    pub name: &'static str,
    /// persisted as a property, under the given or inferred key
    pub property: Option<NameSource>,
    /// unique identity of the instance within its index
    pub identity: Option<NameSource>,
    /// one end of a relationship
    pub endpoint: Option<Endpoint>,
}

impl FieldDescriptor {
    /// A bare attribute with no markers.
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            property: None,
            identity: None,
            endpoint: None,
        }
    }

    /// Persist under the attribute's own name.
    pub const fn property(mut self) -> Self {
        self.property = Some(NameSource::Inferred);
        self
    }

    /// Persist under an explicit property key.
    pub const fn property_named(mut self, key: &'static str) -> Self {
        self.property = Some(NameSource::Explicit(key));
        self
    }

    /// Mark as identity, keyed by the attribute's own name.
    pub const fn identity(mut self) -> Self {
        self.identity = Some(NameSource::Inferred);
        self
    }

    /// Mark as identity under an explicit index key.
    pub const fn identity_named(mut self, key: &'static str) -> Self {
        self.identity = Some(NameSource::Explicit(key));
        self
    }

    /// Mark as the start node of a relationship.
    pub const fn start(mut self) -> Self {
        self.endpoint = Some(Endpoint::Start);
        self
    }

    /// Mark as the end node of a relationship.
    pub const fn end(mut self) -> Self {
        self.endpoint = Some(Endpoint::End);
        self
    }
}

/// Mapping metadata of one domain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeDescriptor {
    /// the Rust type name, in upper camel case
    pub type_name: &'static str,
    pub kind: EntityKind,
    /// name of the index that guards identity values
    pub index: NameSource,
    /// attributes in declaration order
    pub fields: &'static [FieldDescriptor],
}

impl TypeDescriptor {
    /// Describe a node type with inferred labels.
    pub const fn node(type_name: &'static str) -> Self {
        Self {
            type_name,
            kind: EntityKind::Node { labels: &[] },
            index: NameSource::Inferred,
            fields: &[],
        }
    }

    /// Describe a relationship type with an inferred relationship type name.
    pub const fn relationship(type_name: &'static str, directed: bool) -> Self {
        Self {
            type_name,
            kind: EntityKind::Relationship {
                type_name: NameSource::Inferred,
                directed,
            },
            index: NameSource::Inferred,
            fields: &[],
        }
    }

    /// Set explicit labels. Has no effect on relationship descriptors.
    pub const fn labels(mut self, labels: &'static [&'static str]) -> Self {
        if let EntityKind::Node { .. } = self.kind {
            self.kind = EntityKind::Node { labels };
        }
        self
    }

    /// Set an explicit relationship type. Has no effect on node descriptors.
    pub const fn relationship_type(mut self, name: &'static str) -> Self {
        if let EntityKind::Relationship { directed, .. } = self.kind {
            self.kind = EntityKind::Relationship {
                type_name: NameSource::Explicit(name),
                directed,
            };
        }
        self
    }

    /// Set an explicit index name.
    pub const fn index(mut self, name: &'static str) -> Self {
        self.index = NameSource::Explicit(name);
        self
    }

    /// Set the attribute table.
    pub const fn fields(mut self, fields: &'static [FieldDescriptor]) -> Self {
        self.fields = fields;
        self
    }

    /// Get an attribute by name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Value held by one attribute of a domain instance.
#[derive(Debug, Clone, Copy)]
pub enum AttributeValue<'a> {
    /// a plain value, stored as-is
    Scalar(&'a Value),
    /// another domain instance
    Entity(&'a dyn Domain),
}

impl<'a> AttributeValue<'a> {
    /// the scalar value, if this is not a domain instance
    pub fn as_scalar(&self) -> Option<&'a Value> {
        match self {
            AttributeValue::Scalar(v) => Some(v),
            AttributeValue::Entity(_) => None,
        }
    }

    /// the domain instance, if this is one
    pub fn as_entity(&self) -> Option<&'a dyn Domain> {
        match self {
            AttributeValue::Entity(e) => Some(*e),
            AttributeValue::Scalar(_) => None,
        }
    }
}

/// A plain value type mapped to the graph through its descriptor.
pub trait Domain: fmt::Debug {
    /// static mapping metadata of the concrete type
    fn descriptor(&self) -> &'static TypeDescriptor;

    /// value of the attribute called `field`, if the type exposes it
    fn attribute(&self, field: &str) -> Option<AttributeValue<'_>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    static EDGE: TypeDescriptor = TypeDescriptor::relationship("Edge", false)
        .relationship_type("LINKS")
        .labels(&["IGNORED"])
        .index("edges")
        .fields(&[
            FieldDescriptor::new("from").start(),
            FieldDescriptor::new("to").end(),
            FieldDescriptor::new("weight").property_named("w").identity(),
        ]);

    #[test]
    fn test_const_builders() {
        assert_eq!(
            EDGE.kind,
            EntityKind::Relationship {
                type_name: NameSource::Explicit("LINKS"),
                directed: false,
            }
        );
        assert_eq!(EDGE.index.explicit(), Some("edges"));
        assert_eq!(EDGE.fields.len(), 3);

        let weight = EDGE.field("weight").unwrap();
        assert_eq!(weight.property, Some(NameSource::Explicit("w")));
        assert_eq!(weight.identity, Some(NameSource::Inferred));
        assert_eq!(EDGE.field("from").unwrap().endpoint, Some(Endpoint::Start));
        assert!(EDGE.field("missing").is_none());
    }

    #[test]
    fn test_empty_explicit_name_is_inferred() {
        assert_eq!(NameSource::Explicit("").explicit(), None);
        assert_eq!(NameSource::Inferred.explicit(), None);
    }

    #[test]
    fn test_kind_predicates() {
        let node = TypeDescriptor::node("Thing");
        assert!(node.kind.is_node());
        assert!(!node.kind.is_relationship());
        assert!(EDGE.kind.is_relationship());
    }
}
