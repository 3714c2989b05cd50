//! Unified error codes for the branch order ledger
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 4xxx: Order errors
//! - 5xxx: Payment / settlement errors
//! - 6xxx: Loyalty point errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,

    // ==================== 4xxx: Order ====================
    /// Order not found
    OrderNotFound = 4001,
    /// Order is already canceled
    OrderAlreadyCanceled = 4002,
    /// Order is canceled and may not be edited
    OrderImmutable = 4003,
    /// Branch reference is missing
    BranchRequired = 4004,
    /// Order has no line items
    EmptyItems = 4005,
    /// Invalid status transition
    InvalidTransition = 4006,
    /// Fulfillment record missing for receipt type
    FulfillmentMismatch = 4007,

    // ==================== 5xxx: Payment / Settlement ====================
    /// Invalid payment status transition
    InvalidPaymentTransition = 5001,
    /// Split payment record missing
    SplitPaymentMissing = 5002,

    // ==================== 6xxx: Loyalty ====================
    /// Requested points exceed usable amount
    InvalidPointsRequest = 6001,
    /// Customer not found
    CustomerNotFound = 6002,

    // ==================== 9xxx: System ====================
    /// Database / persistence failure
    StorageFailure = 9001,
    /// Internal error
    InternalError = 9002,
}

/// Error category classification based on error code ranges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General errors (0xxx)
    General,
    /// Order errors (4xxx)
    Order,
    /// Payment / settlement errors (5xxx)
    Payment,
    /// Loyalty point errors (6xxx)
    Loyalty,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            4000..5000 => Self::Order,
            5000..6000 => Self::Payment,
            6000..7000 => Self::Loyalty,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    /// Category of this code
    pub fn category(self) -> ErrorCategory {
        ErrorCategory::from_code(self as u16)
    }

    /// Whether the code represents a caller mistake (4xx-class)
    /// rather than a server fault
    pub fn is_client_error(self) -> bool {
        !matches!(self.category(), ErrorCategory::System)
            && self != ErrorCode::Success
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code as u16
    }
}

/// Raised when deserializing a numeric code with no known variant
#[derive(Debug, Clone, Copy, thiserror::Error)]
#[error("Unknown error code: {0}")]
pub struct UnknownErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = UnknownErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => Self::Success,
            1 => Self::Unknown,
            2 => Self::ValidationFailed,
            3 => Self::NotFound,
            4 => Self::AlreadyExists,
            5 => Self::InvalidRequest,
            4001 => Self::OrderNotFound,
            4002 => Self::OrderAlreadyCanceled,
            4003 => Self::OrderImmutable,
            4004 => Self::BranchRequired,
            4005 => Self::EmptyItems,
            4006 => Self::InvalidTransition,
            4007 => Self::FulfillmentMismatch,
            5001 => Self::InvalidPaymentTransition,
            5002 => Self::SplitPaymentMissing,
            6001 => Self::InvalidPointsRequest,
            6002 => Self::CustomerNotFound,
            9001 => Self::StorageFailure,
            9002 => Self::InternalError,
            other => return Err(UnknownErrorCode(other)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", *self as u16)
    }
}
