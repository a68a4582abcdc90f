//! Database-specific error types and conversions.

use sciff_core::error::SciffError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Malformed record: {0}")]
    Decode(String),
}

impl From<DbError> for SciffError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => SciffError::NotFound { entity, id },
            other => SciffError::Database(other.to_string()),
        }
    }
}
