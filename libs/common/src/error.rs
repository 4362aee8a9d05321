//! Custom error types for the common library
//!
//! This module defines the errors raised by the key-value backends.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Error type for key-value store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error occurred while connecting to the backend
    #[error("Store connection error: {0}")]
    Connection(String),

    /// Postgres query failed
    #[error("Postgres query error: {0}")]
    Postgres(#[source] SqlxError),

    /// Redis command failed
    #[error("Redis command error: {0}")]
    Redis(#[source] redis::RedisError),

    /// A stored value could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Store configuration error: {0}")]
    Configuration(String),
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        StoreError::Redis(err)
    }
}

/// Type alias for Result with StoreError
pub type StoreResult<T> = Result<T, StoreError>;
