//! Error types for the relationship system
//!
//! Missing lifecycle hooks are never errors; only the writer and the
//! single-relationship destroy can fail on their own.

use thiserror::Error;

/// Result type alias for relationship operations
pub type RelateResult<T> = Result<T, RelationshipError>;

#[derive(Debug, Error)]
pub enum RelationshipError {
    /// The relationship's associated type has no `set` hook
    #[error("Relationship '{relationship}' on '{model}' cannot be set directly")]
    NonSettableRelationship { model: String, relationship: String },

    /// The relationship name is not declared on the model type
    #[error("Relationship '{relationship}' is not declared on '{model}'")]
    RelationshipNotFound { model: String, relationship: String },

    /// Error raised from inside a hook, passed through untouched
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

impl RelationshipError {
    pub fn non_settable(model: &str, relationship: &str) -> Self {
        Self::NonSettableRelationship {
            model: model.to_string(),
            relationship: relationship.to_string(),
        }
    }

    pub fn not_found(model: &str, relationship: &str) -> Self {
        Self::RelationshipNotFound {
            model: model.to_string(),
            relationship: relationship.to_string(),
        }
    }

    /// Returns true if this is a `NonSettableRelationship` error
    pub fn is_non_settable(&self) -> bool {
        matches!(self, Self::NonSettableRelationship { .. })
    }

    /// Returns true if this is a `RelationshipNotFound` error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::RelationshipNotFound { .. })
    }
}
