//! Error types for the component registry.
//!
//! Classification failures are kept as two distinct variants so callers can
//! tell a component that is not wired into the taxonomy at all apart from one
//! that inherits several unrelated base classes.

use thiserror::Error;

/// Result alias used across the registry API
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Errors surfaced by registration and lookup operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(
        "Component '{component}' has no base class carrying a classification tag (ancestry: [{}])",
        .ancestry.join(", ")
    )]
    NoClassification {
        component: String,
        ancestry: Vec<String>,
    },

    #[error(
        "Component '{component}' is ambiguously classified as [{}] (ancestry: [{}])",
        .candidates.join(", "),
        .ancestry.join(", ")
    )]
    AmbiguousClassification {
        component: String,
        candidates: Vec<String>,
        ancestry: Vec<String>,
    },

    #[error("Component '{component}' is configurable but exposes no schema provider")]
    MissingSchemaProvider { component: String },

    #[error("Component '{component}' produced an invalid schema: {reason}")]
    InvalidSchema { component: String, reason: String },

    #[error("Invalid component declaration: {0}")]
    InvalidComponent(String),

    #[error("Component '{0}' not found in the registry")]
    ComponentNotFound(String),

    #[error("'select' and 'ignore' are mutually exclusive and cannot be used together")]
    ConflictingFilters,

    #[error("'{option}' must name at least one classification tag")]
    EmptyFilter { option: &'static str },

    #[error("'{option}' element {position} ('{tag}') does not exist as a classification tag in the registry")]
    UnknownType {
        option: &'static str,
        position: usize,
        tag: String,
    },
}

impl RegistryError {
    /// True for failures raised by the base-type resolver
    pub fn is_classification_error(&self) -> bool {
        matches!(
            self,
            RegistryError::NoClassification { .. } | RegistryError::AmbiguousClassification { .. }
        )
    }

    /// True for caller mistakes (conflicting or malformed query options)
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            RegistryError::ConflictingFilters
                | RegistryError::EmptyFilter { .. }
                | RegistryError::UnknownType { .. }
        )
    }
}
