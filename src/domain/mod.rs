//! The BIRGGIT domain: projects, commits, branches and parent links.
//!
//! Every type is an immutable value carrying a static mapping descriptor.
//! Text attributes are held as JSON values so they can be handed to the
//! mapping layer by reference.

mod branch;
mod commit;
mod error;
mod project;

pub use branch::{Branch, ParentCommit, DEFAULT_BRANCH_NAME};
pub use commit::Commit;
pub use error::{DomainError, DomainResult};
pub use project::Project;

use serde_json::Value;

/// Text of a value built by a domain constructor.
///
/// Constructors only ever store `Value::String` in text attributes.
fn text(value: &Value) -> &str {
    debug_assert!(value.is_string(), "domain text attribute holds {}", value);
    value.as_str().unwrap_or_default()
}
