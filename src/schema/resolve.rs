//! Metadata resolvers.
//!
//! Pure functions over a `TypeDescriptor` (type-level questions) or a
//! `&dyn Domain` (instance-level questions). They hold no state and never
//! touch the graph.

use std::collections::HashSet;

use serde_json::Value;

use crate::graph::{Label, RelationshipType};
use crate::schema::descriptor::{
    AttributeValue, Domain, Endpoint, EntityKind, FieldDescriptor, TypeDescriptor,
};
use crate::schema::error::{SchemaError, SchemaResult};
use crate::schema::naming::infer_name;

/// One resolved property of an instance.
#[derive(Debug, Clone, Copy)]
pub struct Property<'a> {
    pub key: &'a str,
    pub value: AttributeValue<'a>,
}

/// Resolved identity of an instance.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity<'a> {
    /// index key
    pub key: String,
    pub value: &'a Value,
}

/// Resolved relationship type and direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipMapping {
    pub rel_type: RelationshipType,
    pub directed: bool,
}

/// Labels of a node type: the explicit ones, or a single inferred label.
pub fn resolve_labels(descriptor: &TypeDescriptor) -> SchemaResult<Vec<Label>> {
    let EntityKind::Node { labels } = descriptor.kind else {
        return Err(SchemaError::NotANodeType {
            type_name: descriptor.type_name.to_string(),
        });
    };

    let mut resolved: Vec<Label> = Vec::with_capacity(labels.len().max(1));
    for label in labels.iter().filter(|l| !l.is_empty()) {
        let label = Label::new(*label);
        if !resolved.contains(&label) {
            resolved.push(label);
        }
    }

    if resolved.is_empty() {
        resolved.push(Label::new(infer_name(descriptor.type_name)));
    }
    Ok(resolved)
}

/// Relationship type of a relationship type: explicit or inferred.
pub fn resolve_relationship_type(descriptor: &TypeDescriptor) -> SchemaResult<RelationshipMapping> {
    let EntityKind::Relationship { type_name, directed } = descriptor.kind else {
        return Err(SchemaError::NotARelationshipType {
            type_name: descriptor.type_name.to_string(),
        });
    };

    let name = match type_name.explicit() {
        Some(explicit) => explicit.to_string(),
        None => infer_name(descriptor.type_name),
    };
    Ok(RelationshipMapping {
        rel_type: RelationshipType::new(name),
        directed,
    })
}

/// Index name guarding identity values of the type.
pub fn resolve_index_name(descriptor: &TypeDescriptor) -> String {
    match descriptor.index.explicit() {
        Some(explicit) => explicit.to_string(),
        None => infer_name(descriptor.type_name),
    }
}

/// Property key of a property-marked attribute.
fn property_key(field: &FieldDescriptor) -> Option<&'static str> {
    field
        .property
        .map(|source| source.explicit().unwrap_or(field.name))
}

/// Property keys of a type in declaration order.
pub fn resolve_property_keys(descriptor: &TypeDescriptor) -> SchemaResult<Vec<&'static str>> {
    let mut keys = Vec::new();
    let mut seen = HashSet::new();
    for key in descriptor.fields.iter().filter_map(property_key) {
        if !seen.insert(key) {
            return Err(SchemaError::DuplicatePropertyName {
                type_name: descriptor.type_name.to_string(),
                key: key.to_string(),
            });
        }
        keys.push(key);
    }
    Ok(keys)
}

/// Properties of an instance in declaration order.
pub fn resolve_properties(entity: &dyn Domain) -> SchemaResult<Vec<Property<'_>>> {
    let descriptor = entity.descriptor();
    // duplicate keys are rejected before any attribute is read
    resolve_property_keys(descriptor)?;

    let mut properties = Vec::new();
    for field in descriptor.fields {
        if let Some(key) = property_key(field) {
            let value = attribute(entity, field.name)?;
            properties.push(Property { key, value });
        }
    }
    Ok(properties)
}

fn identity_field(descriptor: &TypeDescriptor) -> SchemaResult<&'static FieldDescriptor> {
    let fields: Vec<&'static FieldDescriptor> = descriptor
        .fields
        .iter()
        .filter(|f| f.identity.is_some())
        .collect();

    match fields.as_slice() {
        [] => Err(SchemaError::MissingIdentity {
            type_name: descriptor.type_name.to_string(),
        }),
        [single] => Ok(*single),
        many => Err(SchemaError::AmbiguousIdentity {
            type_name: descriptor.type_name.to_string(),
            fields: many.iter().map(|f| f.name.to_string()).collect(),
        }),
    }
}

/// Index key of the identity attribute.
pub fn resolve_identity_key(descriptor: &TypeDescriptor) -> SchemaResult<String> {
    let field = identity_field(descriptor)?;
    let key = field.identity.and_then(|s| s.explicit()).unwrap_or(field.name);
    Ok(key.to_string())
}

/// Property key under which the identity attribute is stored on the element.
///
/// Falls back to the attribute name when the identity attribute is not
/// itself a persisted property.
pub fn resolve_identity_property(descriptor: &TypeDescriptor) -> SchemaResult<&'static str> {
    let field = identity_field(descriptor)?;
    Ok(property_key(field).unwrap_or(field.name))
}

/// Index key and value of an instance's identity.
pub fn resolve_identity(entity: &dyn Domain) -> SchemaResult<Identity<'_>> {
    let descriptor = entity.descriptor();
    let key = resolve_identity_key(descriptor)?;
    let field = identity_field(descriptor)?;

    match attribute(entity, field.name)? {
        AttributeValue::Scalar(value) => Ok(Identity { key, value }),
        AttributeValue::Entity(_) => Err(SchemaError::NonScalarProperty {
            type_name: descriptor.type_name.to_string(),
            key,
        }),
    }
}

fn endpoint_field(
    descriptor: &TypeDescriptor,
    endpoint: Endpoint,
) -> SchemaResult<&'static FieldDescriptor> {
    let fields: Vec<&'static FieldDescriptor> = descriptor
        .fields
        .iter()
        .filter(|f| f.endpoint == Some(endpoint))
        .collect();

    match fields.as_slice() {
        [] => Err(SchemaError::MissingEndpoint {
            type_name: descriptor.type_name.to_string(),
            endpoint,
        }),
        [single] => Ok(*single),
        many => Err(SchemaError::AmbiguousEndpoint {
            type_name: descriptor.type_name.to_string(),
            endpoint,
            fields: many.iter().map(|f| f.name.to_string()).collect(),
        }),
    }
}

fn resolve_endpoint<'a>(entity: &'a dyn Domain, endpoint: Endpoint) -> SchemaResult<&'a dyn Domain> {
    let descriptor = entity.descriptor();
    let field = endpoint_field(descriptor, endpoint)?;
    attribute(entity, field.name)?
        .as_entity()
        .ok_or_else(|| SchemaError::NotAnEntity {
            type_name: descriptor.type_name.to_string(),
            field: field.name.to_string(),
        })
}

/// Start and end instances of a relationship instance.
pub fn resolve_endpoints(entity: &dyn Domain) -> SchemaResult<(&dyn Domain, &dyn Domain)> {
    let descriptor = entity.descriptor();
    if !descriptor.kind.is_relationship() {
        return Err(SchemaError::NotARelationshipType {
            type_name: descriptor.type_name.to_string(),
        });
    }
    let start = resolve_endpoint(entity, Endpoint::Start)?;
    let end = resolve_endpoint(entity, Endpoint::End)?;
    Ok((start, end))
}

/// Check a descriptor is usable for graph writes.
///
/// A valid descriptor has distinct property keys and a single identity, and a
/// relationship descriptor also has a single start and a single end.
pub fn validate(descriptor: &TypeDescriptor) -> SchemaResult<()> {
    resolve_property_keys(descriptor)?;
    identity_field(descriptor)?;
    match descriptor.kind {
        EntityKind::Node { .. } => {
            resolve_labels(descriptor)?;
        }
        EntityKind::Relationship { .. } => {
            endpoint_field(descriptor, Endpoint::Start)?;
            endpoint_field(descriptor, Endpoint::End)?;
        }
    }
    Ok(())
}

fn attribute<'a>(entity: &'a dyn Domain, field: &str) -> SchemaResult<AttributeValue<'a>> {
    entity
        .attribute(field)
        .ok_or_else(|| SchemaError::MissingAttribute {
            type_name: entity.descriptor().type_name.to_string(),
            field: field.to_string(),
        })
}
