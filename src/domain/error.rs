//! Domain validation errors.

use thiserror::Error;

/// Result type for domain constructors.
pub type DomainResult<T> = Result<T, DomainError>;

/// Errors raised while building domain values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// a required text attribute is empty
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    /// a graph element lacks a property needed to rebuild a domain value
    #[error("{label} element has no text property {property}")]
    MissingProperty {
        label: &'static str,
        property: &'static str,
    },
}

/// Reject empty text for a required attribute.
pub(crate) fn non_empty(field: &'static str, text: String) -> DomainResult<String> {
    if text.is_empty() {
        return Err(DomainError::Empty { field });
    }
    Ok(text)
}
