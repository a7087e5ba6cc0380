//! # Domain Types
//!
//! Core domain types used throughout Till POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────────┐   │
//! │  │    Product      │   │    CartLine     │   │        Sale         │   │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────────  │   │
//! │  │  id, code       │──►│  product (snap) │──►│  lines (copies)     │   │
//! │  │  3 sale prices  │   │  quantity       │   │  subtotal/tax/total │   │
//! │  │  stock          │   │  final_price    │   │  payment label      │   │
//! │  └─────────────────┘   └─────────────────┘   └──────────┬──────────┘   │
//! │                                                          │ total        │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌──────────▼──────────┐   │
//! │  │   PriceTier     │   │    TaxRate      │   │ CashRegisterSession │   │
//! │  │  Retail         │   │  bps (u32)      │   │  initial_amount     │   │
//! │  │  Wholesale      │   │  1800 = 18%     │   │  sales_total        │   │
//! │  │  Special        │   └─────────────────┘   │  final_amount       │   │
//! │  └─────────────────┘                         └─────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity
//! Products carry an `id` used for relations and a human `code` (the
//! scannable SKU). Sales carry a UUID `id` and a sequential `number`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// 1 basis point = 0.01%, so 1800 bps = 18%.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Creates a tax rate from a percentage, e.g. `18.0` for 18%.
    pub fn from_percentage(pct: f64) -> Self {
        TaxRate((pct * 100.0).round() as u32)
    }

    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::zero()
    }
}

// =============================================================================
// Price Tier
// =============================================================================

/// The pricing level selected for a cart.
///
/// Not a stored entity: a selector handed to the pricing resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum PriceTier {
    /// Walk-in customer price.
    #[default]
    Retail,
    /// Bulk buyer price.
    Wholesale,
    /// Distributor / negotiated price.
    Special,
}

impl PriceTier {
    pub const ALL: [PriceTier; 3] = [PriceTier::Retail, PriceTier::Wholesale, PriceTier::Special];
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceTier::Retail => write!(f, "retail"),
            PriceTier::Wholesale => write!(f, "wholesale"),
            PriceTier::Special => write!(f, "special"),
        }
    }
}

impl FromStr for PriceTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "retail" | "menudeo" => Ok(PriceTier::Retail),
            "wholesale" | "mayoreo" => Ok(PriceTier::Wholesale),
            "special" | "especial" | "distributor" => Ok(PriceTier::Special),
            _ => Err(ValidationError::NotAllowed {
                field: "price tier".to_string(),
                allowed: PriceTier::ALL.iter().map(|t| t.to_string()).collect(),
            }),
        }
    }
}

// =============================================================================
// Product
// =============================================================================

/// A product available for sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier.
    pub id: String,

    /// Scannable code (SKU / barcode), unique within the catalog.
    pub code: String,

    /// Display name shown to cashier and on receipt.
    pub name: String,

    pub category_id: String,

    pub brand_id: String,

    /// Cost price, used for inventory valuation.
    pub buy_price: Money,

    pub price_retail: Money,

    pub price_wholesale: Money,

    pub price_special: Money,

    /// Units on hand. Never negative.
    pub stock: i64,

    /// Reorder threshold (informational).
    pub min_stock: i64,

    pub is_active: bool,
}

impl Product {
    /// Checks if `quantity` units can be taken from current stock.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity <= self.stock
    }

    /// True when stock is at or below the reorder threshold.
    #[inline]
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }

    /// Stock valued at cost price.
    #[inline]
    pub fn stock_value(&self) -> Money {
        self.buy_price.multiply_quantity(self.stock)
    }
}

// =============================================================================
// Catalog Reference Data
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub color: String,
    pub is_active: bool,
}

/// A customer a sale can be attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub tax_id: String,
    pub address: String,
    pub is_active: bool,
}

/// A payment method offered at checkout.
///
/// Sales store the method's *name*, not a reference to this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub is_active: bool,
}

// =============================================================================
// Company Settings
// =============================================================================

/// Store-wide settings. The engine only reads `tax_rate` from here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CompanySettings {
    pub name: String,
    pub address: String,
    pub phone: String,
    pub logo_url: String,
    pub currency_symbol: String,
    /// Label printed next to the tax line, e.g. "IGV", "IVA", "VAT".
    pub tax_name: String,
    pub tax_rate: TaxRate,
}

impl Default for CompanySettings {
    fn default() -> Self {
        CompanySettings {
            name: "Till Store".to_string(),
            address: "Av. Principal 123".to_string(),
            phone: "555-0000".to_string(),
            logo_url: String::new(),
            currency_symbol: "S/".to_string(),
            tax_name: "IGV".to_string(),
            tax_rate: TaxRate::from_bps(1800),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    Seller,
    SalesManager,
    StockManager,
}

/// The operator logged in at the register.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub is_active: bool,
}

// =============================================================================
// Cart Line
// =============================================================================

/// One product + quantity + locked-in unit price within a cart or a sale.
///
/// The product is a snapshot taken when the line was created; live stock is
/// always re-read from the catalog by `product.id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub product: Product,

    /// Always >= 1.
    pub quantity: i64,

    /// Unit price resolved at the cart's tier.
    pub final_price: Money,
}

impl CartLine {
    /// The line id is the product id: a product appears at most once.
    #[inline]
    pub fn id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    #[inline]
    pub fn line_total(&self) -> Money {
        self.final_price.multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Sale
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    #[default]
    Completed,
    Canceled,
}

/// An immutable record of a committed checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,

    /// Sequential ticket number assigned by the ledger.
    pub number: u64,

    #[ts(as = "String")]
    pub date: DateTime<Utc>,

    /// `None` means the default walk-in customer.
    pub client_id: Option<String>,

    /// Payment method *name* at time of sale.
    pub payment_method: String,

    /// Point-in-time copies of the cart lines, in cart order.
    pub lines: Vec<CartLine>,

    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
    pub status: SaleStatus,
}

impl Sale {
    #[inline]
    pub fn is_completed(&self) -> bool {
        self.status == SaleStatus::Completed
    }

    pub fn item_count(&self) -> usize {
        self.lines.len()
    }

    pub fn total_quantity(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }
}

// =============================================================================
// Cash Register Session
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Open,
    Closed,
}

/// A work shift during which sales accumulate against an opening float.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CashRegisterSession {
    pub id: String,

    #[ts(as = "String")]
    pub opened_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub closed_at: Option<DateTime<Utc>>,

    /// Opening float.
    pub initial_amount: Money,

    /// Physically counted cash, set at close.
    pub final_amount: Option<Money>,

    /// Running sum of completed sale totals since opening.
    pub sales_total: Money,

    pub status: SessionStatus,

    pub notes: Option<String>,
}

impl CashRegisterSession {
    #[inline]
    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Cash that should be in the drawer: float plus recorded sales.
    #[inline]
    pub fn expected_amount(&self) -> Money {
        self.initial_amount + self.sales_total
    }

    /// Counted minus expected; `None` until the session is closed.
    pub fn variance(&self) -> Option<Money> {
        self.final_amount.map(|counted| counted - self.expected_amount())
    }

    /// True when `at` falls inside the session window.
    pub fn covers(&self, at: DateTime<Utc>) -> bool {
        at >= self.opened_at && self.closed_at.map_or(true, |closed| at <= closed)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
