//! Mapping metadata for domain types.
//!
//! Domain types describe how they map to the graph with a static
//! `TypeDescriptor`: node or relationship, labels or relationship type,
//! persisted properties, identity attribute, relationship endpoints, index
//! name. The resolvers turn a descriptor into the effective graph schema,
//! inferring names from the type name when none is given.

mod descriptor;
mod error;
mod naming;
mod resolve;

pub use descriptor::{
    AttributeValue, Domain, Endpoint, EntityKind, FieldDescriptor, NameSource, TypeDescriptor,
};
pub use error::{SchemaError, SchemaResult};
pub use naming::infer_name;
pub use resolve::{
    resolve_endpoints, resolve_identity, resolve_identity_key, resolve_identity_property,
    resolve_index_name, resolve_labels, resolve_properties, resolve_property_keys,
    resolve_relationship_type, validate, Identity, Property, RelationshipMapping,
};
