//! # Sale Commands
//!
//! Checkout and the sales history.
//!
//! ## Checkout Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  > pay efectivo                                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Resolve label against active payment methods ("efectivo" → Efectivo)  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Register::checkout ── EmptyCart / MissingPaymentMethod /              │
//! │       │                SessionNotOpen / StockExceeded ──► nothing moved │
//! │       ▼                                                                 │
//! │  stock decremented, sale appended, session total updated               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cart cleared, receipt returned                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rejected;
use crate::error::{ApiError, ApiResult};
use crate::state::{Register, RegisterState};
use till_core::{Catalog, CartLine, Sale, SaleFilter, SaleStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptItem {
    pub code: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
}

impl From<&CartLine> for ReceiptItem {
    fn from(line: &CartLine) -> Self {
        ReceiptItem {
            code: line.product.code.clone(),
            name: line.product.name.clone(),
            quantity: line.quantity,
            unit_price_cents: line.final_price.cents(),
            line_total_cents: line.line_total().cents(),
        }
    }
}

/// Everything printed on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptResponse {
    pub sale_id: String,
    pub number: u64,
    pub store_name: String,
    pub timestamp: String,
    pub client: String,
    pub payment_method: String,
    pub items: Vec<ReceiptItem>,
    pub subtotal_cents: i64,
    pub tax_name: String,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
}

impl ReceiptResponse {
    fn build(sale: &Sale, register: &Register) -> Self {
        ReceiptResponse {
            sale_id: sale.id.clone(),
            number: sale.number,
            store_name: register.settings.name.clone(),
            timestamp: sale.date.to_rfc3339(),
            client: register
                .catalog
                .client_name(sale.client_id.as_deref())
                .to_string(),
            payment_method: sale.payment_method.clone(),
            items: sale.lines.iter().map(ReceiptItem::from).collect(),
            subtotal_cents: sale.subtotal.cents(),
            tax_name: register.settings.tax_name.clone(),
            tax_cents: sale.tax.cents(),
            total_cents: sale.total.cents(),
            status: sale.status,
        }
    }
}

/// One row of the sales history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleSummaryDto {
    pub id: String,
    pub number: u64,
    pub timestamp: String,
    pub client: String,
    pub payment_method: String,
    pub item_count: usize,
    pub total_quantity: i64,
    pub total_cents: i64,
    pub status: SaleStatus,
}

impl SaleSummaryDto {
    pub(crate) fn build(sale: &Sale, catalog: &Catalog) -> Self {
        SaleSummaryDto {
            id: sale.id.clone(),
            number: sale.number,
            timestamp: sale.date.to_rfc3339(),
            client: catalog.client_name(sale.client_id.as_deref()).to_string(),
            payment_method: sale.payment_method.clone(),
            item_count: sale.item_count(),
            total_quantity: sale.total_quantity(),
            total_cents: sale.total.cents(),
            status: sale.status,
        }
    }
}

/// Maps what the operator typed to an active payment method name.
///
/// Matches by id, by name ignoring case, then by a unique name prefix.
/// With no payment methods configured the label is taken as typed.
fn resolve_payment_method(catalog: &Catalog, input: &str) -> ApiResult<String> {
    let input = input.trim();
    if input.is_empty() || catalog.payment_methods().is_empty() {
        return Ok(input.to_string());
    }

    let lowered = input.to_lowercase();
    let active: Vec<_> = catalog.active_payment_methods().collect();

    if let Some(method) = active
        .iter()
        .find(|m| m.id == input || m.name.to_lowercase() == lowered)
    {
        return Ok(method.name.clone());
    }

    let prefixed: Vec<_> = active
        .iter()
        .filter(|m| m.name.to_lowercase().starts_with(&lowered))
        .collect();
    match prefixed.as_slice() {
        [only] => Ok(only.name.clone()),
        _ => Err(ApiError::payment(format!(
            "Unknown payment method: {}",
            input
        ))),
    }
}

/// Commits the cart as a sale and clears it.
///
/// ## Arguments
/// * `payment_method` - Payment method id, name, or unique name prefix
/// * `client_id` - Client id; `None` sells to the walk-in customer
///
/// ## Returns
/// The receipt of the recorded sale
pub fn checkout(
    register: &RegisterState,
    payment_method: &str,
    client_id: Option<&str>,
) -> ApiResult<ReceiptResponse> {
    debug!(payment_method = %payment_method, client = ?client_id, "checkout command");

    register.with_register_mut(|r| {
        // An empty cart is reported before anything about payment or client.
        let label = if r.cart.is_empty() {
            payment_method.to_string()
        } else {
            let label = resolve_payment_method(&r.catalog, payment_method)?;
            if let Some(id) = client_id {
                if r.catalog.client(id).is_none() {
                    return Err(ApiError::not_found("Client", id));
                }
            }
            label
        };

        let sale = r.checkout(&label, client_id).map_err(rejected)?;
        r.cart.clear();

        info!(
            sale_id = %sale.id,
            number = sale.number,
            total = %sale.total,
            items = sale.item_count(),
            "Sale completed"
        );

        Ok(ReceiptResponse::build(&sale, r))
    })
}

/// Lists sales newest first, optionally filtered by date range and status.
pub fn list_sales(
    register: &RegisterState,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    status: Option<SaleStatus>,
) -> Vec<SaleSummaryDto> {
    debug!(from = ?from, to = ?to, status = ?status, "list_sales command");

    let filter = SaleFilter { from, to, status };
    register.with_register(|r| {
        r.ledger
            .newest_first()
            .filter(|s| filter.matches(s))
            .map(|s| SaleSummaryDto::build(s, &r.catalog))
            .collect()
    })
}

/// Gets a sale's receipt by id or ticket number (`7` or `#7`).
pub fn get_sale(register: &RegisterState, id_or_number: &str) -> ApiResult<ReceiptResponse> {
    debug!(sale = %id_or_number, "get_sale command");

    let key = id_or_number.trim();
    let number = key.trim_start_matches('#').parse::<u64>().ok();

    register.with_register(|r| {
        let sale = r.ledger.get(key).or_else(|| {
            number.and_then(|n| r.ledger.list().iter().find(|s| s.number == n))
        });
        sale.map(|s| ReceiptResponse::build(s, r))
            .ok_or_else(|| ApiError::not_found("Sale", key))
    })
}
