//! # Cart Commands
//!
//! Cart manipulation for the sale in progress.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Checkout │────►│ Recorded │       │
//! │  │  Cart    │     │          │     │ (pay)    │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 │              │
//! │                   add_to_cart                       clear_cart         │
//! │                   scan_code                        (back to empty)     │
//! │                   change_quantity                                       │
//! │                   remove_from_cart                                      │
//! │                   set_price_tier                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The operator names lines by product code; the engine keys them by
//! product id. Commands translate between the two.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{lookup_product, rejected};
use crate::error::{ApiError, ApiResult};
use crate::state::RegisterState;
use till_core::{AddOutcome, Cart, CartLine, CoreError, PriceTier, ScanOutcome};

/// One cart line as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineDto {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&CartLine> for CartLineDto {
    fn from(line: &CartLine) -> Self {
        CartLineDto {
            product_id: line.product.id.clone(),
            code: line.product.code.clone(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.final_price.cents(),
            line_total_cents: line.line_total().cents(),
        }
    }
}

/// Cart response including lines and totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    pub lines: Vec<CartLineDto>,
    pub tier: PriceTier,
    pub tax_rate_bps: u32,
    pub line_count: usize,
    pub total_quantity: i64,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
}

impl From<&Cart> for CartResponse {
    fn from(cart: &Cart) -> Self {
        let totals = cart.totals();
        CartResponse {
            lines: cart.lines().iter().map(CartLineDto::from).collect(),
            tier: cart.tier(),
            tax_rate_bps: cart.tax_rate().bps(),
            line_count: totals.line_count,
            total_quantity: totals.total_quantity,
            subtotal_cents: totals.subtotal.cents(),
            tax_cents: totals.tax.cents(),
            total_cents: totals.total.cents(),
        }
    }
}

/// Result of adding a product: what happened, and the cart after.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddResponse {
    pub outcome: AddOutcome,
    pub cart: CartResponse,
}

/// Result of a scan. `outcome` is `None` when no product code matched
/// exactly; the cart is then unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResponse {
    pub outcome: Option<AddOutcome>,
    pub cart: CartResponse,
}

/// Line id for a code or product id the operator typed.
fn line_id_for(cart: &Cart, code_or_id: &str) -> Option<String> {
    let key = code_or_id.trim();
    cart.lines()
        .iter()
        .find(|l| l.product.code == key || l.product.id == key)
        .map(|l| l.id().to_string())
}

/// Gets the current cart contents.
pub fn get_cart(register: &RegisterState) -> CartResponse {
    debug!("get_cart command");
    register.with_register(|r| CartResponse::from(&r.cart))
}

/// Adds one unit of a product picked from the catalog.
///
/// ## Behavior
/// - Exact code or id selects the product
/// - Otherwise a search that finds exactly one product selects it
/// - Already in cart: quantity + 1, checked against live stock
///
/// ## Arguments
/// * `term` - Product code, id, or a search term naming one product
pub fn add_to_cart(register: &RegisterState, term: &str) -> ApiResult<AddResponse> {
    debug!(term = %term, "add_to_cart command");

    register.with_register_mut(|r| {
        let product = match lookup_product(&r.catalog, term) {
            Some(product) => product.clone(),
            None => {
                let found = r.catalog.search(term, None).map_err(rejected)?;
                match found.as_slice() {
                    [only] => (*only).clone(),
                    [] => return Err(ApiError::not_found("Product", term)),
                    many => {
                        let codes: Vec<&str> = many.iter().map(|p| p.code.as_str()).collect();
                        return Err(ApiError::validation(format!(
                            "'{}' matches several products: {}",
                            term,
                            codes.join(", ")
                        )));
                    }
                }
            }
        };

        let outcome = r.cart.add_item(&product).map_err(rejected)?;
        Ok(AddResponse {
            outcome,
            cart: CartResponse::from(&r.cart),
        })
    })
}

/// Barcode fast path: adds the product whose code matches exactly.
pub fn scan_code(register: &RegisterState, code: &str) -> ApiResult<ScanResponse> {
    debug!(code = %code, "scan_code command");

    register.with_register_mut(|r| {
        let outcome = match r.cart.scan(&r.catalog, code).map_err(rejected)? {
            ScanOutcome::Added(outcome) => Some(outcome),
            ScanOutcome::NoExactMatch => None,
        };
        Ok(ScanResponse {
            outcome,
            cart: CartResponse::from(&r.cart),
        })
    })
}

/// Changes a line's quantity by `delta`.
///
/// ## Behavior
/// - Increases are checked against live stock
/// - Decreases stop at 1; use `remove_from_cart` to drop a line
pub fn change_quantity(register: &RegisterState, code: &str, delta: i64) -> ApiResult<CartResponse> {
    debug!(code = %code, delta = delta, "change_quantity command");

    register.with_register_mut(|r| {
        let line_id = line_id_for(&r.cart, code)
            .ok_or_else(|| rejected(CoreError::LineNotFound(code.to_string())))?;
        r.cart
            .change_quantity(&r.catalog, &line_id, delta)
            .map_err(rejected)?;
        Ok(CartResponse::from(&r.cart))
    })
}

/// Removes a line. Removing a product that is not in the cart changes
/// nothing.
pub fn remove_from_cart(register: &RegisterState, code: &str) -> CartResponse {
    debug!(code = %code, "remove_from_cart command");

    register.with_register_mut(|r| {
        if let Some(line_id) = line_id_for(&r.cart, code) {
            r.cart.remove_item(&line_id);
        }
        CartResponse::from(&r.cart)
    })
}

/// Switches the price tier and reprices every line.
///
/// ## Arguments
/// * `tier` - "retail", "wholesale" or "special"
pub fn set_price_tier(register: &RegisterState, tier: &str) -> ApiResult<CartResponse> {
    debug!(tier = %tier, "set_price_tier command");

    let tier: PriceTier = tier
        .parse()
        .map_err(|e| rejected(CoreError::Validation(e)))?;

    Ok(register.with_register_mut(|r| {
        r.cart.set_price_tier(tier);
        CartResponse::from(&r.cart)
    }))
}

/// Clears all items from the cart.
pub fn clear_cart(register: &RegisterState) -> CartResponse {
    debug!("clear_cart command");
    register.with_register_mut(|r| {
        r.cart.clear();
        CartResponse::from(&r.cart)
    })
}
