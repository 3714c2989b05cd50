//! Order state machine errors

use thiserror::Error;

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// Errors raised while processing order mutations
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    OrderNotFound(i64),

    #[error("Order {0} is already canceled")]
    AlreadyCanceled(i64),

    #[error("Order {0} is canceled and may not be edited")]
    Immutable(i64),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),

    #[error("Invalid payment transition: {0}")]
    InvalidPaymentTransition(String),

    #[error("Transfer error: {0}")]
    Transfer(String),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

/// Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;

impl From<OrderError> for AppError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::OrderNotFound(id) => AppError::not_found(format!("Order {} not found", id)),
            OrderError::AlreadyCanceled(id) => {
                AppError::conflict(format!("Order {} is already canceled", id))
            }
            OrderError::Immutable(id) => {
                AppError::business_rule(format!("Order {} is canceled and may not be edited", id))
            }
            OrderError::Validation(msg) => AppError::validation(msg),
            OrderError::InvalidTransition(msg)
            | OrderError::InvalidPaymentTransition(msg)
            | OrderError::Transfer(msg) => AppError::business_rule(msg),
            OrderError::Repo(RepoError::NotFound(msg)) => AppError::not_found(msg),
            OrderError::Repo(RepoError::Duplicate(msg)) => AppError::conflict(msg),
            OrderError::Repo(RepoError::Validation(msg)) => AppError::validation(msg),
            OrderError::Repo(RepoError::Database(msg)) => AppError::database(msg),
        }
    }
}
