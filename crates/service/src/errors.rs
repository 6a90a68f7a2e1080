use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("decode error: {0}")]
    Decode(String),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }

    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            ServiceError::Validation(_) => 2001,
            ServiceError::NotFound(_) => 2004,
            ServiceError::Store(_) => 2100,
            ServiceError::Decode(_) => 2101,
        }
    }
}

impl From<StoreError> for ServiceError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound(entity) => ServiceError::not_found(&entity),
            other => ServiceError::Store(other.to_string()),
        }
    }
}
