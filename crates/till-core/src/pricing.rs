//! # Pricing Resolver
//!
//! Maps a product and a price tier to a unit price, and re-prices cart
//! lines when the cart's tier changes.
//!
//! ```text
//! ┌───────────────┬──────────────────────┐
//! │ PriceTier     │ Product field        │
//! ├───────────────┼──────────────────────┤
//! │ Retail        │ price_retail         │
//! │ Wholesale     │ price_wholesale      │
//! │ Special       │ price_special        │
//! └───────────────┴──────────────────────┘
//! ```

use crate::money::Money;
use crate::types::{CartLine, PriceTier, Product};

/// Returns the unit price of `product` at `tier`.
///
/// Total over all tiers; there are no error cases.
///
/// ```rust
/// # use till_core::{Money, PriceTier, Product};
/// # use till_core::pricing::price_for;
/// # let product = Product {
/// #     id: "1".into(), code: "P001".into(), name: "Runner".into(),
/// #     category_id: "1".into(), brand_id: "1".into(),
/// #     buy_price: Money::from_major(80), price_retail: Money::from_major(150),
/// #     price_wholesale: Money::from_major(130), price_special: Money::from_major(110),
/// #     stock: 50, min_stock: 10, is_active: true,
/// # };
/// assert_eq!(price_for(&product, PriceTier::Wholesale), Money::from_major(130));
/// ```
#[inline]
pub fn price_for(product: &Product, tier: PriceTier) -> Money {
    match tier {
        PriceTier::Retail => product.price_retail,
        PriceTier::Wholesale => product.price_wholesale,
        PriceTier::Special => product.price_special,
    }
}

/// Re-resolves every line's `final_price` at `tier` from the line's product
/// snapshot. Quantities are untouched; applying the same tier twice is a
/// no-op on values.
pub fn reprice(lines: &mut [CartLine], tier: PriceTier) {
    for line in lines.iter_mut() {
        line.final_price = price_for(&line.product, tier);
    }
}
