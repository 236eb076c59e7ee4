//! Error types for the Arbor directory.

use thiserror::Error;

/// Why a mutation was refused even though every id resolved.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("a node named '{name}' already exists in this tenant")]
    DuplicateName { name: String },

    #[error("a node cannot be its own parent")]
    SelfParent,

    #[error("circular reference: target parent is a descendant of the node")]
    CircularReference,

    #[error("node has {count} child node(s)")]
    HasChildren { count: u64 },

    #[error("node has {count} attached member(s)")]
    HasMembers { count: u64 },
}

#[derive(Debug, Error)]
pub enum ArborError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(ConflictReason),

    /// Malformed input. Raised by the calling layer, never by the directory core.
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl ArborError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// HTTP-equivalent status for the calling layer.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Conflict(_) => 409,
            Self::Validation { .. } => 422,
            Self::Database(_) => 500,
        }
    }

    pub fn conflict_reason(&self) -> Option<&ConflictReason> {
        match self {
            Self::Conflict(reason) => Some(reason),
            _ => None,
        }
    }
}

impl From<ConflictReason> for ArborError {
    fn from(reason: ConflictReason) -> Self {
        Self::Conflict(reason)
    }
}

pub type ArborResult<T> = Result<T, ArborError>;
