use model::entities::user::Role;
use thiserror::Error;

use crate::auth::Operation;

/// Error types for the business operations.
///
/// Validation and authorization failures are detected before any mutation;
/// storage failures during a write roll the whole transaction back, so a
/// caller never observes partial state behind one of these.
#[derive(Error, Debug)]
pub enum OpsError {
    /// Malformed or out-of-range input.
    #[error("validation failed: {0}")]
    Validation(String),

    /// A referenced row does not exist.
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i32 },

    /// The product does not hold enough stock for the requested quantity.
    #[error(
        "insufficient stock for product {product_id}: requested {requested}, available {available}"
    )]
    InsufficientStock {
        product_id: i32,
        requested: i32,
        available: i32,
    },

    /// The acting role is not allowed to perform the operation.
    #[error("role {role} is not allowed to {operation}")]
    Unauthorized { role: Role, operation: Operation },

    /// A concurrent write won the race; the caller may retry.
    #[error("conflicting concurrent update: {0}")]
    Conflict(String),

    /// Underlying persistence failure, not recoverable here.
    #[error("storage error: {0}")]
    Storage(#[from] sea_orm::DbErr),
}

impl OpsError {
    pub fn validation(message: impl Into<String>) -> Self {
        OpsError::Validation(message.into())
    }

    pub fn not_found(entity: &'static str, id: i32) -> Self {
        OpsError::NotFound { entity, id }
    }

    /// Classifies a storage error raised during a write. Lock and
    /// serialization failures become [`OpsError::Conflict`] so callers
    /// know a retry can succeed; everything else stays a storage error.
    pub fn from_write_err(err: sea_orm::DbErr) -> Self {
        let message = err.to_string().to_lowercase();
        if message.contains("serialization")
            || message.contains("deadlock")
            || message.contains("database is locked")
            || message.contains("could not serialize")
        {
            OpsError::Conflict(err.to_string())
        } else {
            OpsError::Storage(err)
        }
    }
}

/// Type alias for Result with OpsError
pub type Result<T> = std::result::Result<T, OpsError>;
