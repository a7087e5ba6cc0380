//! # API Error Type
//!
//! Unified error type for terminal commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Till POS                               │
//! │                                                                         │
//! │  Console                     Commands                                   │
//! │  ───────                     ────────                                   │
//! │                                                                         │
//! │  > qty P003 1                                                           │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Store Error? ─── StoreError::QueryFailed("...") ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Rule Error? ─── CoreError::StockExceeded ─────── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄────────────────────────────────────────────────────────────────────  │
//! │                                                                         │
//! │  error [INSUFFICIENT_STOCK]: Only 10 units of P003 in stock             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Rule violations are shown as-is. Storage failures are logged in full and
//! shown with a generic message.

use serde::Serialize;
use till_core::CoreError;
use till_store::StoreError;

/// Error returned from terminal commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "SESSION_ERROR",
///   "message": "No cash register session is open"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Product, sale or line not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Business logic error
    BusinessLogic,

    /// Internal error
    Internal,

    /// Cart operation failed
    CartError,

    /// Insufficient stock
    InsufficientStock,

    /// Payment method missing or unknown
    PaymentError,

    /// Cash register session is in the wrong state
    SessionError,
}

impl ErrorCode {
    /// The wire form, e.g. `INSUFFICIENT_STOCK`.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::ValidationError => "VALIDATION_ERROR",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::BusinessLogic => "BUSINESS_LOGIC",
            ErrorCode::Internal => "INTERNAL",
            ErrorCode::CartError => "CART_ERROR",
            ErrorCode::InsufficientStock => "INSUFFICIENT_STOCK",
            ErrorCode::PaymentError => "PAYMENT_ERROR",
            ErrorCode::SessionError => "SESSION_ERROR",
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Creates a payment error.
    pub fn payment(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::PaymentError, message)
    }
}

/// Converts store errors to API errors.
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ConnectionFailed(e) => {
                tracing::error!("Database connection failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            StoreError::MigrationFailed(e) => {
                tracing::error!("Database migration failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            StoreError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            StoreError::TransactionFailed(e) => {
                tracing::error!("Transaction failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database transaction failed")
            }
            StoreError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            StoreError::Serialization { key, message } => {
                tracing::error!(key = %key, "Stored state is unreadable: {}", message);
                ApiError::new(
                    ErrorCode::DatabaseError,
                    format!("Stored data under '{}' is unreadable", key),
                )
            }
            StoreError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// Converts engine errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = match &err {
            CoreError::OutOfStock { .. } | CoreError::StockExceeded { .. } => {
                ErrorCode::InsufficientStock
            }
            CoreError::MissingPaymentMethod => ErrorCode::PaymentError,
            CoreError::SessionAlreadyOpen(_) | CoreError::SessionNotOpen => {
                ErrorCode::SessionError
            }
            CoreError::EmptyCart | CoreError::CartTooLarge { .. } => ErrorCode::CartError,
            CoreError::ProductNotFound(_) | CoreError::LineNotFound(_) => ErrorCode::NotFound,
            CoreError::Validation(_) => ErrorCode::ValidationError,
        };

        let message = match err {
            CoreError::StockExceeded {
                code, available, ..
            } => format!("Only {} units of {} in stock", available, code),
            CoreError::Validation(e) => e.to_string(),
            other => other.to_string(),
        };

        ApiError::new(code, message)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for terminal commands.
pub type ApiResult<T> = Result<T, ApiError>;
