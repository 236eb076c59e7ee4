//! Database-specific error types and conversions.

use arbor_core::error::{ArborError, ConflictReason};

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Malformed record: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Unique index violated for name '{name}'")]
    DuplicateName { name: String },
}

impl DbError {
    /// Classify a failed statement, recognising unique-index violations
    /// on the node name so they surface as conflicts.
    pub(crate) fn from_statement(err: surrealdb::Error, name: Option<&str>) -> Self {
        let message = err.to_string();
        match name {
            Some(name) if message.contains("already contains") => Self::DuplicateName {
                name: name.to_string(),
            },
            _ => Self::Query(message),
        }
    }
}

impl From<DbError> for ArborError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ArborError::NotFound { entity, id },
            DbError::DuplicateName { name } => {
                ArborError::Conflict(ConflictReason::DuplicateName { name })
            }
            other => ArborError::Database(other.to_string()),
        }
    }
}
