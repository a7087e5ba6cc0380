//! # Cart Engine
//!
//! Maintains the lines of the sale in progress, enforces stock availability
//! on every increase, and computes subtotal, tax and total.
//!
//! ## Cart Operations
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operator action         Engine call              Cart change           │
//! │  ───────────────         ───────────              ───────────           │
//! │                                                                         │
//! │  Click product ────────► add_item() ────────────► push / qty + 1        │
//! │  Scan barcode ─────────► scan() ────────────────► add_item() on exact   │
//! │  +/- buttons ──────────► change_quantity() ─────► qty ± n (floor 1)     │
//! │  Trash icon ───────────► remove_item() ─────────► line removed          │
//! │  Tier selector ────────► set_price_tier() ──────► every line repriced   │
//! │  New sale / cancel ────► clear() ───────────────► empty                 │
//! │                                                                         │
//! │  Invariant: line.quantity <= live catalog stock after every increase.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A cart is short-lived: one per checkout flow, never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::pricing::{price_for, reprice};
use crate::types::{CartLine, PriceTier, Product, TaxRate};
use crate::MAX_CART_LINES;

// =============================================================================
// Outcomes
// =============================================================================

/// What `add_item` did, so a frontend can give feedback.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AddOutcome {
    /// A new line was created with quantity 1.
    Added { product_id: String },
    /// An existing line's quantity went up by one.
    Incremented { product_id: String, quantity: i64 },
}

/// Result of a barcode scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The code matched a product exactly and it was added; the caller
    /// should clear its scan buffer.
    Added(AddOutcome),
    /// No exact match. The caller keeps the buffer, typically to filter a
    /// product list with it.
    NoExactMatch,
}

// =============================================================================
// Totals
// =============================================================================

/// Cart totals at full precision (cents). Formatting is the caller's job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartTotals {
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

// =============================================================================
// Cart
// =============================================================================

/// The cart of the sale in progress.
///
/// ## Invariants
/// - A product appears on at most one line (the line id is the product id)
/// - Every line has quantity >= 1
/// - After any increase, quantity <= the product's live stock
/// - Every `final_price` is the price of the line's product at `tier`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    lines: Vec<CartLine>,
    tier: PriceTier,
    tax_rate: TaxRate,
    created_at: DateTime<Utc>,
}

impl Cart {
    /// Creates an empty retail-tier cart taxed at `tax_rate`.
    pub fn new(tax_rate: TaxRate) -> Self {
        Cart {
            lines: Vec::new(),
            tier: PriceTier::default(),
            tax_rate,
            created_at: Utc::now(),
        }
    }

    /// Adds one unit of `product` at the cart's current tier.
    ///
    /// ## Behavior
    /// - `stock <= 0` → `OutOfStock`, cart unchanged
    /// - already a line and `quantity + 1 > stock` → `StockExceeded`
    /// - already a line → quantity + 1, price refreshed from the resolver
    /// - new → line with quantity 1
    pub fn add_item(&mut self, product: &Product) -> CoreResult<AddOutcome> {
        if product.stock <= 0 {
            return Err(CoreError::OutOfStock {
                code: product.code.clone(),
                name: product.name.clone(),
            });
        }

        let price = price_for(product, self.tier);

        if let Some(line) = self.lines.iter_mut().find(|l| l.product.id == product.id) {
            let requested = line.quantity + 1;
            if requested > product.stock {
                return Err(CoreError::StockExceeded {
                    code: product.code.clone(),
                    available: product.stock,
                    requested,
                });
            }
            line.quantity = requested;
            line.final_price = price;
            return Ok(AddOutcome::Incremented {
                product_id: product.id.clone(),
                quantity: requested,
            });
        }

        if self.lines.len() >= MAX_CART_LINES {
            return Err(CoreError::CartTooLarge {
                max: MAX_CART_LINES,
            });
        }

        self.lines.push(CartLine {
            product: product.clone(),
            quantity: 1,
            final_price: price,
        });

        Ok(AddOutcome::Added {
            product_id: product.id.clone(),
        })
    }

    /// Barcode fast path: adds the product whose code equals `code` exactly.
    ///
    /// Partial matches never add anything.
    pub fn scan(&mut self, catalog: &Catalog, code: &str) -> CoreResult<ScanOutcome> {
        match catalog.find_by_code(code.trim()) {
            Some(product) => self.add_item(product).map(ScanOutcome::Added),
            None => Ok(ScanOutcome::NoExactMatch),
        }
    }

    /// Changes a line's quantity by `delta`, checking increases against the
    /// product's live stock in `catalog`.
    ///
    /// Decreases clamp at 1; removing a line takes an explicit
    /// [`Cart::remove_item`]. Returns the new quantity.
    pub fn change_quantity(
        &mut self,
        catalog: &Catalog,
        line_id: &str,
        delta: i64,
    ) -> CoreResult<i64> {
        let line = self
            .lines
            .iter_mut()
            .find(|l| l.product.id == line_id)
            .ok_or_else(|| CoreError::LineNotFound(line_id.to_string()))?;

        let live = catalog.require(line_id)?;

        let exceeded = |requested| CoreError::StockExceeded {
            code: live.code.clone(),
            available: live.stock,
            requested,
        };

        // Quantities are at least 1, so only an increase can overflow.
        let requested = line
            .quantity
            .checked_add(delta)
            .ok_or_else(|| exceeded(i64::MAX))?;
        if delta > 0 && requested > live.stock {
            return Err(exceeded(requested));
        }

        line.quantity = requested.max(1);
        Ok(line.quantity)
    }

    /// Removes a line. Removing an absent line is not an error.
    pub fn remove_item(&mut self, line_id: &str) -> Option<CartLine> {
        let index = self.lines.iter().position(|l| l.product.id == line_id)?;
        Some(self.lines.remove(index))
    }

    /// Switches the price tier and reprices every line.
    pub fn set_price_tier(&mut self, tier: PriceTier) {
        self.tier = tier;
        reprice(&mut self.lines, tier);
    }

    /// Updates the tax rate used by [`Cart::totals`].
    pub fn set_tax_rate(&mut self, tax_rate: TaxRate) {
        self.tax_rate = tax_rate;
    }

    /// Empties the cart (after checkout or on cancel). Tier and tax rate stay.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.created_at = Utc::now();
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn line(&self, line_id: &str) -> Option<&CartLine> {
        self.lines.iter().find(|l| l.product.id == line_id)
    }

    pub fn tier(&self) -> PriceTier {
        self.tier
    }

    pub fn tax_rate(&self) -> TaxRate {
        self.tax_rate
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Σ(final_price × quantity).
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    /// Subtotal, tax on the exact subtotal, and their sum.
    pub fn totals(&self) -> CartTotals {
        let subtotal = self.subtotal();
        let tax = subtotal.calculate_tax(self.tax_rate);
        CartTotals {
            line_count: self.lines.len(),
            total_quantity: self.lines.iter().map(|l| l.quantity).sum(),
            subtotal,
            tax,
            total: subtotal + tax,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(id: &str, stock: i64, retail: i64) -> Product {
        Product {
            id: id.to_string(),
            code: format!("P00{}", id),
            name: format!("Product {}", id),
            category_id: "1".to_string(),
            brand_id: "1".to_string(),
            buy_price: Money::from_major(retail / 2),
            price_retail: Money::from_major(retail),
            price_wholesale: Money::from_major(retail - 20),
            price_special: Money::from_major(retail - 40),
            stock,
            min_stock: 1,
            is_active: true,
        }
    }

    fn catalog() -> Catalog {
        Catalog::with_products(vec![
            product("1", 50, 150),
            product("3", 10, 900),
            product("5", 1, 60),
            product("7", 0, 45),
        ])
        .unwrap()
    }

    fn cart() -> Cart {
        Cart::new(TaxRate::from_bps(1800))
    }

    #[test]
    fn test_add_new_then_increment() {
        let catalog = catalog();
        let mut cart = cart();
        let p1 = catalog.get("1").unwrap();

        assert_eq!(
            cart.add_item(p1).unwrap(),
            AddOutcome::Added {
                product_id: "1".to_string()
            }
        );
        assert_eq!(
            cart.add_item(p1).unwrap(),
            AddOutcome::Incremented {
                product_id: "1".to_string(),
                quantity: 2
            }
        );
        assert_eq!(cart.lines().len(), 1);
        assert_eq!(cart.line("1").unwrap().quantity, 2);
    }

    #[test]
    fn test_add_out_of_stock_leaves_cart_unchanged() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("1").unwrap()).unwrap();
        let before = cart.lines().to_vec();

        let err = cart.add_item(catalog.get("7").unwrap()).unwrap_err();
        assert!(matches!(err, CoreError::OutOfStock { .. }));
        assert_eq!(cart.lines(), before.as_slice());
    }

    #[test]
    fn test_add_beyond_stock_of_one() {
        let catalog = catalog();
        let mut cart = cart();
        let p5 = catalog.get("5").unwrap();

        cart.add_item(p5).unwrap();
        let err = cart.add_item(p5).unwrap_err();

        assert_eq!(
            err,
            CoreError::StockExceeded {
                code: "P005".to_string(),
                available: 1,
                requested: 2
            }
        );
        assert_eq!(cart.line("5").unwrap().quantity, 1);
    }

    #[test]
    fn test_increment_refreshes_price_at_current_tier() {
        let catalog = catalog();
        let mut cart = cart();
        let p1 = catalog.get("1").unwrap();
        cart.add_item(p1).unwrap();

        // Tier switched without repricing the existing line.
        cart.tier = PriceTier::Wholesale;
        cart.add_item(p1).unwrap();

        assert_eq!(cart.line("1").unwrap().final_price, Money::from_major(130));
    }

    #[test]
    fn test_change_quantity_checks_live_stock() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("3").unwrap()).unwrap();

        assert_eq!(cart.change_quantity(&catalog, "3", 8).unwrap(), 9);

        let err = cart.change_quantity(&catalog, "3", 2).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StockExceeded {
                available: 10,
                requested: 11,
                ..
            }
        ));
        assert_eq!(cart.line("3").unwrap().quantity, 9);
    }

    #[test]
    fn test_change_quantity_uses_live_not_snapshot_stock() {
        let mut catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("3").unwrap()).unwrap();

        catalog.apply_stock_decrements(&[("3", 9)]).unwrap();

        let err = cart.change_quantity(&catalog, "3", 1).unwrap_err();
        assert!(matches!(err, CoreError::StockExceeded { available: 1, .. }));
    }

    #[test]
    fn test_decrement_floors_at_one() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("1").unwrap()).unwrap();
        cart.change_quantity(&catalog, "1", 2).unwrap();

        assert_eq!(cart.change_quantity(&catalog, "1", -10).unwrap(), 1);
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_change_quantity_huge_delta() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("1").unwrap()).unwrap();

        let err = cart.change_quantity(&catalog, "1", i64::MAX).unwrap_err();
        assert!(matches!(
            err,
            CoreError::StockExceeded {
                available: 50,
                requested: i64::MAX,
                ..
            }
        ));
        assert_eq!(cart.line("1").unwrap().quantity, 1);

        assert_eq!(cart.change_quantity(&catalog, "1", i64::MIN).unwrap(), 1);
    }

    #[test]
    fn test_change_quantity_unknown_line() {
        let catalog = catalog();
        let mut cart = cart();
        assert_eq!(
            cart.change_quantity(&catalog, "1", 1),
            Err(CoreError::LineNotFound("1".to_string()))
        );
    }

    #[test]
    fn test_remove_item_is_unconditional() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("1").unwrap()).unwrap();

        assert!(cart.remove_item("1").is_some());
        assert!(cart.remove_item("1").is_none());
        assert!(cart.is_empty());
    }

    #[test]
    fn test_set_price_tier_idempotent() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("1").unwrap()).unwrap();
        cart.add_item(catalog.get("3").unwrap()).unwrap();

        cart.set_price_tier(PriceTier::Special);
        let once = cart.lines().to_vec();
        cart.set_price_tier(PriceTier::Special);

        assert_eq!(cart.lines(), once.as_slice());
        assert_eq!(cart.line("3").unwrap().final_price, Money::from_major(860));
    }

    #[test]
    fn test_totals_at_eighteen_percent() {
        let catalog = catalog();
        let mut cart = cart();
        cart.add_item(catalog.get("1").unwrap()).unwrap();
        cart.add_item(catalog.get("3").unwrap()).unwrap();

        let totals = cart.totals();
        assert_eq!(totals.subtotal, Money::from_major(1050));
        assert_eq!(totals.tax, Money::from_major(189));
        assert_eq!(totals.total, Money::from_major(1239));
        assert_eq!(totals.line_count, 2);
        assert_eq!(totals.total_quantity, 2);
    }

    #[test]
    fn test_scan_exact_match_only() {
        let catalog = catalog();
        let mut cart = cart();

        assert_eq!(cart.scan(&catalog, "P00").unwrap(), ScanOutcome::NoExactMatch);
        assert!(cart.is_empty());

        let outcome = cart.scan(&catalog, "P001").unwrap();
        assert!(matches!(outcome, ScanOutcome::Added(AddOutcome::Added { .. })));
        assert_eq!(cart.lines().len(), 1);
    }

    #[test]
    fn test_clear_keeps_tier() {
        let catalog = catalog();
        let mut cart = cart();
        cart.set_price_tier(PriceTier::Wholesale);
        cart.add_item(catalog.get("1").unwrap()).unwrap();

        cart.clear();

        assert!(cart.is_empty());
        assert_eq!(cart.tier(), PriceTier::Wholesale);
        assert_eq!(cart.totals().total, Money::zero());
    }

    #[test]
    fn test_cart_line_limit() {
        let mut cart = cart();
        for i in 0..MAX_CART_LINES {
            cart.add_item(&product(&format!("x{}", i), 5, 10)).unwrap();
        }
        let err = cart.add_item(&product("overflow", 5, 10)).unwrap_err();
        assert_eq!(
            err,
            CoreError::CartTooLarge {
                max: MAX_CART_LINES
            }
        );
    }
}
