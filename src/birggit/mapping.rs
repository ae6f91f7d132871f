//! Writing domain values into a graph transaction.
//!
//! Nodes and indexed relationships are created at most once per identity:
//! a second write with the same identity returns the stored element and
//! leaves it untouched.

use serde_json::Value;

use crate::birggit::error::BirggitResult;
use crate::graph::{ElementId, GraphTransaction, NodeId, RelationshipId};
use crate::schema::{
    resolve_endpoints, resolve_identity, resolve_index_name, resolve_labels, resolve_properties,
    resolve_relationship_type, AttributeValue, Domain, SchemaError, SchemaResult,
};

/// Properties of `entity` as stored values. Null values are left out.
pub(crate) fn stored_properties(entity: &dyn Domain) -> SchemaResult<Vec<(&str, Value)>> {
    let mut stored = Vec::new();
    for property in resolve_properties(entity)? {
        match property.value {
            AttributeValue::Scalar(Value::Null) => {}
            AttributeValue::Scalar(value) => stored.push((property.key, value.clone())),
            AttributeValue::Entity(_) => {
                return Err(SchemaError::NonScalarProperty {
                    type_name: entity.descriptor().type_name.to_string(),
                    key: property.key.to_string(),
                })
            }
        }
    }
    Ok(stored)
}

fn set_properties<T: GraphTransaction>(
    tx: &mut T,
    element: ElementId,
    properties: Vec<(&str, Value)>,
) -> BirggitResult<()> {
    for (key, value) in properties {
        tx.set_property(element, key, value)?;
    }
    Ok(())
}

/// Get or create the node of a node value, by identity.
pub(crate) fn merge_node<T: GraphTransaction>(
    tx: &mut T,
    entity: &dyn Domain,
) -> BirggitResult<NodeId> {
    let descriptor = entity.descriptor();
    let labels = resolve_labels(descriptor)?;
    let identity = resolve_identity(entity)?;
    let index = resolve_index_name(descriptor);
    let properties = stored_properties(entity)?;

    tx.get_or_create_node(&index, &identity.key, identity.value, |tx, node| {
        for label in labels {
            tx.add_label(node, label)?;
        }
        set_properties(tx, node.into(), properties)
    })
}

/// Create a relationship value between already stored nodes. Not indexed.
fn link<T: GraphTransaction>(
    tx: &mut T,
    entity: &dyn Domain,
    start: NodeId,
    end: NodeId,
) -> BirggitResult<RelationshipId> {
    let mapping = resolve_relationship_type(entity.descriptor())?;
    let properties = stored_properties(entity)?;
    let relationship = tx.create_relationship(start, end, mapping.rel_type)?;
    set_properties(tx, relationship.into(), properties)?;
    Ok(relationship)
}

/// Create a relationship value, getting or creating both endpoint nodes.
/// Not indexed.
pub(crate) fn create_relationship<T: GraphTransaction>(
    tx: &mut T,
    entity: &dyn Domain,
) -> BirggitResult<RelationshipId> {
    let (start, end) = resolve_endpoints(entity)?;
    let start = merge_node(tx, start)?;
    let end = merge_node(tx, end)?;
    link(tx, entity, start, end)
}

/// Get or create the relationship of a relationship value, by identity.
pub(crate) fn merge_relationship<T: GraphTransaction>(
    tx: &mut T,
    entity: &dyn Domain,
) -> BirggitResult<RelationshipId> {
    let identity = resolve_identity(entity)?;
    let index = resolve_index_name(entity.descriptor());

    tx.get_or_create_relationship(&index, &identity.key, identity.value, |tx| {
        create_relationship(tx, entity)
    })
}
