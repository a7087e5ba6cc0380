//! # Error Types
//!
//! Domain-specific error types for till-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── CoreError        - Business rule violations (cart, checkout,      │
//! │  │                      register session)                              │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  till-store errors (separate crate)                                    │
//! │  └── StoreError       - Persistence failures                           │
//! │                                                                         │
//! │  Terminal app errors                                                   │
//! │  └── ApiError         - What the operator sees                         │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → Operator               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every variant is a recoverable decision for the operator (pick another
//! quantity, open the register, choose a payment method). Nothing in the
//! engine retries.

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations returned by the transaction engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Attempted to add a product that has no stock left.
    #[error("Out of stock: {name} ({code}) has no units left")]
    OutOfStock { code: String, name: String },

    /// Attempted to raise a line's quantity beyond live stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Line P003 × 10, stock = 10
    ///      │
    ///      ▼
    /// change_quantity(+1)
    ///      │
    ///      ▼
    /// StockExceeded { code: "P003", available: 10, requested: 11 }
    ///      │
    ///      ▼
    /// Operator sees: "Only 10 units of P003 in stock"
    /// ```
    #[error("Stock exceeded for {code}: available {available}, requested {requested}")]
    StockExceeded {
        code: String,
        available: i64,
        requested: i64,
    },

    /// Checkout attempted without a payment method.
    #[error("A payment method must be selected")]
    MissingPaymentMethod,

    /// `open` called while a session is already open.
    #[error("Cash register session {0} is already open")]
    SessionAlreadyOpen(String),

    /// Operation requires an open cash register session.
    #[error("No cash register session is open")]
    SessionNotOpen,

    /// Checkout attempted with no lines.
    #[error("Cart is empty")]
    EmptyCart,

    /// Product id or code is not in the catalog.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Line id is not in the cart.
    #[error("Product {0} is not in the cart")]
    LineNotFound(String),

    /// Cart has reached the maximum number of distinct lines.
    #[error("Cart cannot have more than {max} lines")]
    CartTooLarge { max: usize },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when data entering the engine (catalog entries, amounts,
/// labels) doesn't meet requirements.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// Duplicate value (e.g., duplicate product code).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::StockExceeded {
            code: "P003".to_string(),
            available: 10,
            requested: 11,
        };
        assert_eq!(
            err.to_string(),
            "Stock exceeded for P003: available 10, requested 11"
        );
        assert_eq!(CoreError::EmptyCart.to_string(), "Cart is empty");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "code".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert_eq!(core_err.to_string(), "Validation error: code is required");
    }
}
