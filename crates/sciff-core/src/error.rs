//! Error types for the SCIFF access core.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SciffError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },

    #[error("Entity already exists: {entity}")]
    AlreadyExists { entity: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Database error: {0}")]
    Database(String),

    #[error("Store call timed out after {millis} ms")]
    Timeout { millis: u64 },

    #[error("Geolocation lookup failed: {0}")]
    Geolocation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SciffError {
    /// Whether the error reflects an unreachable or misbehaving
    /// collaborator rather than a definitive answer from the store.
    ///
    /// `NotFound` and `Validation` are definitive; everything that
    /// could succeed on a retry is transient.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SciffError::Database(_)
                | SciffError::Timeout { .. }
                | SciffError::Geolocation(_)
                | SciffError::Internal(_)
        )
    }
}

pub type SciffResult<T> = Result<T, SciffError>;
