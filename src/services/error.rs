use thiserror::Error;

use crate::auth::CredentialError;
use crate::database::{DatabaseError, ObjectIdError};

/// Failure kinds surfaced by the record service and auth gate.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{message}")]
    Validation { message: String, fields: Vec<String> },

    #[error("{0}")]
    Conflict(String),

    #[error("Invalid id: {0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Invalid credentials")]
    Unauthorized,

    #[error("Storage error: {0}")]
    Storage(#[from] DatabaseError),

    #[error(transparent)]
    Credential(#[from] CredentialError),
}

impl ServiceError {
    /// Validation failure naming the missing required fields.
    pub fn missing_fields(message: impl Into<String>, fields: &[&str]) -> Self {
        ServiceError::Validation {
            message: message.into(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl From<ObjectIdError> for ServiceError {
    fn from(err: ObjectIdError) -> Self {
        ServiceError::InvalidId(err.0)
    }
}
