//! # Validation Module
//!
//! Input validation for data entering the engine: catalog entries, cash
//! amounts, search terms and tax settings.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Operator input (console / UI)                                │
//! │  ├── Parsing (numbers, tier names)                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Product entry: code, name, non-negative prices and stock          │
//! │  └── Register amounts: non-negative floats and counts                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Engine invariants (cart, checkout, session)                  │
//! │  └── OutOfStock, StockExceeded, SessionNotOpen, ...                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A zero tier price passes validation (free items are allowed); a missing
//! tier price is not representable because every product carries all three.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::Product;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product code (SKU / barcode).
///
/// ## Rules
/// - Must not be empty
/// - At most 50 characters
/// - Only letters, digits, hyphens and underscores (scanners type these)
///
/// ```rust
/// use till_core::validation::validate_code;
///
/// assert!(validate_code("P001").is_ok());
/// assert!(validate_code("7750243001234").is_ok());
/// assert!(validate_code("").is_err());
/// assert!(validate_code("has space").is_err());
/// ```
pub fn validate_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name (1-200 characters after trimming).
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a search query and returns it trimmed.
///
/// Empty is allowed and matches everything.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

/// Validates a payment method label (at most 100 characters).
///
/// Emptiness is not checked here: an empty label is a
/// `CoreError::MissingPaymentMethod` at checkout.
pub fn validate_payment_label(label: &str) -> ValidationResult<()> {
    if label.trim().len() > 100 {
        return Err(ValidationError::TooLong {
            field: "payment method".to_string(),
            max: 100,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates that a monetary amount is not negative.
///
/// ```rust
/// use till_core::money::Money;
/// use till_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::zero()).is_ok());
/// assert!(validate_amount("price", Money::from_cents(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a stock count (must not be negative).
pub fn validate_stock(field: &str, units: i64) -> ValidationResult<()> {
    if units < 0 {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Entity Validators
// =============================================================================

/// Validates a product before it enters the catalog.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }
    validate_code(&product.code)?;
    validate_product_name(&product.name)?;
    validate_amount("buy price", product.buy_price)?;
    validate_amount("retail price", product.price_retail)?;
    validate_amount("wholesale price", product.price_wholesale)?;
    validate_amount("special price", product.price_special)?;
    validate_stock("stock", product.stock)?;
    validate_stock("minimum stock", product.min_stock)?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> Product {
        Product {
            id: "1".to_string(),
            code: "P001".to_string(),
            name: "Runner".to_string(),
            category_id: "1".to_string(),
            brand_id: "1".to_string(),
            buy_price: Money::from_major(80),
            price_retail: Money::from_major(150),
            price_wholesale: Money::from_major(130),
            price_special: Money::from_major(110),
            stock: 50,
            min_stock: 10,
            is_active: true,
        }
    }

    #[test]
    fn test_validate_code() {
        assert!(validate_code("P001").is_ok());
        assert!(validate_code("ABC_12-3").is_ok());

        assert!(validate_code("").is_err());
        assert!(validate_code("   ").is_err());
        assert!(validate_code("has space").is_err());
        assert!(validate_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Runner 42").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_search_query_trims() {
        assert_eq!(validate_search_query("  nike ").unwrap(), "nike");
        assert!(validate_search_query(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1800).is_ok());
        assert!(validate_tax_rate_bps(10000).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }

    #[test]
    fn test_validate_product() {
        assert!(validate_product(&product()).is_ok());

        let mut negative_price = product();
        negative_price.price_special = Money::from_cents(-1);
        assert_eq!(
            validate_product(&negative_price),
            Err(ValidationError::Negative {
                field: "special price".to_string()
            })
        );

        let mut negative_stock = product();
        negative_stock.stock = -2;
        assert!(validate_product(&negative_stock).is_err());

        let mut zero_price = product();
        zero_price.price_wholesale = Money::zero();
        assert!(validate_product(&zero_price).is_ok());
    }
}
