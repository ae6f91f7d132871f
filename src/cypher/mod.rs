//! Cypher pattern rendering of domain values.
//!
//! Output is deterministic and meant for display, logging and tests:
//!
//! ```text
//! (n:PROJECT {name:'BIRGGIT'})-[:HAS_BRANCH {name:'munster'}]->(n:COMMIT {identifier:'0xbwahahaha',message:'Breaks!'})
//! ```
//!
//! Every property value is wrapped in single quotes. Strings are written as
//! is, other scalars as JSON text, and a property holding a domain value is
//! rendered as that value's own property block.

use serde_json::Value;

use crate::schema::{
    resolve_endpoints, resolve_labels, resolve_properties, resolve_relationship_type,
    AttributeValue, Domain, EntityKind, SchemaResult,
};

/// Render a node or relationship value as a Cypher pattern.
pub fn serialize(entity: &dyn Domain) -> SchemaResult<String> {
    match entity.descriptor().kind {
        EntityKind::Node { .. } => node_pattern(entity),
        EntityKind::Relationship { .. } => relationship_pattern(entity),
    }
}

/// `(n:LABEL1:LABEL2 {props})`
pub fn node_pattern(entity: &dyn Domain) -> SchemaResult<String> {
    let labels: Vec<String> = resolve_labels(entity.descriptor())?
        .iter()
        .map(|l| l.to_string())
        .collect();
    Ok(format!("(n:{} {})", labels.join(":"), property_block(entity)?))
}

/// `<start>-[:TYPE {props}]-><end>`, with `-` instead of `->` when undirected.
pub fn relationship_pattern(entity: &dyn Domain) -> SchemaResult<String> {
    let mapping = resolve_relationship_type(entity.descriptor())?;
    let (start, end) = resolve_endpoints(entity)?;
    Ok(format!(
        "{}-[:{} {}]{}{}",
        node_pattern(start)?,
        mapping.rel_type,
        property_block(entity)?,
        if mapping.directed { "->" } else { "-" },
        node_pattern(end)?
    ))
}

/// `{k1:'v1',k2:'v2'}` in declaration order. Null values are left out.
pub fn property_block(entity: &dyn Domain) -> SchemaResult<String> {
    let mut entries = Vec::new();
    for property in resolve_properties(entity)? {
        let rendered = match property.value {
            AttributeValue::Scalar(Value::Null) => continue,
            AttributeValue::Scalar(Value::String(s)) => s.clone(),
            AttributeValue::Scalar(other) => other.to_string(),
            AttributeValue::Entity(nested) => property_block(nested)?,
        };
        entries.push(format!("{}:'{}'", property.key, rendered));
    }
    Ok(format!("{{{}}}", entries.join(",")))
}
