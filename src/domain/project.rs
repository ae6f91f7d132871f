use std::fmt;

use serde_json::Value;

use crate::domain::error::{non_empty, DomainResult};
use crate::domain::text;
use crate::schema::{AttributeValue, Domain, FieldDescriptor, TypeDescriptor};

static PROJECT: TypeDescriptor = TypeDescriptor::node("Project").fields(&[FieldDescriptor::new(
    "name",
)
.property_named(Project::NAME)
.identity_named("projectName")]);

/// A named project, the root of its branches.
#[derive(Debug, Clone)]
pub struct Project {
    name: Value,
}

impl Project {
    /// property holding the project name
    pub const NAME: &'static str = "name";

    /// create a project, rejecting empty names
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = non_empty("project name", name.into())?;
        Ok(Self {
            name: Value::String(name),
        })
    }

    pub fn name(&self) -> &str {
        text(&self.name)
    }

    pub fn descriptor() -> &'static TypeDescriptor {
        &PROJECT
    }
}

impl Domain for Project {
    fn descriptor(&self) -> &'static TypeDescriptor {
        &PROJECT
    }

    fn attribute(&self, field: &str) -> Option<AttributeValue<'_>> {
        match field {
            "name" => Some(AttributeValue::Scalar(&self.name)),
            _ => None,
        }
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Project {}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(:PROJECT {{name: {}}})", self.name())
    }
}
