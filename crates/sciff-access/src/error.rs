//! Access-layer error types.

use sciff_core::error::SciffError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccessError {
    #[error("geolocation lookup failed: {0}")]
    Geolocation(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<AccessError> for SciffError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::Geolocation(msg) => SciffError::Geolocation(msg),
            AccessError::InvalidConfig(message) => SciffError::Validation { message },
        }
    }
}

impl From<reqwest::Error> for AccessError {
    fn from(err: reqwest::Error) -> Self {
        AccessError::Geolocation(err.to_string())
    }
}
