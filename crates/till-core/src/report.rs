//! # Sales Aggregation
//!
//! Read-only rollups over the sales ledger and catalog.
//!
//! ```text
//! ┌──────────────┐     product_rollup()      ┌──────────────────────┐
//! │              │ ────────────────────────► │ per-product revenue  │
//! │ SalesLedger  │     session_sales()       ├──────────────────────┤
//! │ (completed   │ ────────────────────────► │ sales in a session   │
//! │  sales only) │     session_summary()     ├──────────────────────┤
//! │              │ ────────────────────────► │ closure report       │
//! └──────────────┘                           └──────────────────────┘
//! ┌──────────────┐     inventory_summary()   ┌──────────────────────┐
//! │   Catalog    │ ────────────────────────► │ units, value, low    │
//! └──────────────┘                           └──────────────────────┘
//! ```
//!
//! Revenue is line-level: `final_price × quantity`, tax excluded. Nothing
//! here depends on ledger order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::CoreResult;
use crate::ledger::SalesLedger;
use crate::money::Money;
use crate::types::{CashRegisterSession, Sale};
use crate::validation::validate_search_query;

// =============================================================================
// Per-product rollup
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_id: String,
    pub code: String,
    pub name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
    /// Share of total revenue, 0-100.
    pub share_percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductRollup {
    /// Highest revenue first, ties by code.
    pub rows: Vec<ProductSales>,
    pub total_quantity: i64,
    pub total_revenue: Money,
}

/// Groups completed sale lines by product id.
///
/// `search` filters rows by case-insensitive substring on name or code; the
/// share is computed against the filtered total.
pub fn product_rollup(ledger: &SalesLedger, search: Option<&str>) -> CoreResult<ProductRollup> {
    let term = match search {
        Some(term) => validate_search_query(term)?.to_lowercase(),
        None => String::new(),
    };

    let mut rows: Vec<ProductSales> = Vec::new();
    for line in ledger
        .list()
        .iter()
        .filter(|s| s.is_completed())
        .flat_map(|s| s.lines.iter())
    {
        match rows.iter_mut().find(|r| r.product_id == line.product.id) {
            Some(row) => {
                row.quantity_sold += line.quantity;
                row.revenue += line.line_total();
            }
            None => rows.push(ProductSales {
                product_id: line.product.id.clone(),
                code: line.product.code.clone(),
                name: line.product.name.clone(),
                quantity_sold: line.quantity,
                revenue: line.line_total(),
                share_percent: 0.0,
            }),
        }
    }

    if !term.is_empty() {
        rows.retain(|r| {
            r.name.to_lowercase().contains(&term) || r.code.to_lowercase().contains(&term)
        });
    }

    let total_revenue: Money = rows.iter().map(|r| r.revenue).sum();
    let total_quantity = rows.iter().map(|r| r.quantity_sold).sum();

    for row in rows.iter_mut() {
        row.share_percent = share_of(row.revenue, total_revenue);
    }
    rows.sort_by(|a, b| b.revenue.cmp(&a.revenue).then_with(|| a.code.cmp(&b.code)));

    Ok(ProductRollup {
        rows,
        total_quantity,
        total_revenue,
    })
}

fn share_of(part: Money, whole: Money) -> f64 {
    if whole.is_zero() {
        return 0.0;
    }
    part.cents() as f64 * 100.0 / whole.cents() as f64
}

// =============================================================================
// Per-session rollup
// =============================================================================

/// Completed sales dated inside the session window, oldest first.
pub fn session_sales<'a>(ledger: &'a SalesLedger, session: &CashRegisterSession) -> Vec<&'a Sale> {
    let mut sales: Vec<&Sale> = ledger
        .list()
        .iter()
        .filter(|s| s.is_completed() && session.covers(s.date))
        .collect();
    sales.sort_by_key(|s| s.date);
    sales
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBreakdown {
    pub payment_method: String,
    pub sale_count: usize,
    pub total: Money,
}

/// Closure report for a session: the reconciliation figures plus the
/// sales that produced them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub session_id: String,
    pub initial_amount: Money,
    pub sales_total: Money,
    pub expected: Money,
    /// `None` while the session is still open.
    pub counted: Option<Money>,
    pub variance: Option<Money>,
    pub sale_count: usize,
    /// Σ total over the listed sales. Equals `sales_total` when every
    /// recorded sale is still in the ledger.
    pub ledger_total: Money,
    pub by_payment_method: Vec<PaymentBreakdown>,
    pub sales: Vec<Sale>,
}

pub fn session_summary(ledger: &SalesLedger, session: &CashRegisterSession) -> SessionSummary {
    let sales = session_sales(ledger, session);

    let mut by_payment_method: Vec<PaymentBreakdown> = Vec::new();
    for sale in &sales {
        match by_payment_method
            .iter_mut()
            .find(|b| b.payment_method == sale.payment_method)
        {
            Some(entry) => {
                entry.sale_count += 1;
                entry.total += sale.total;
            }
            None => by_payment_method.push(PaymentBreakdown {
                payment_method: sale.payment_method.clone(),
                sale_count: 1,
                total: sale.total,
            }),
        }
    }

    SessionSummary {
        session_id: session.id.clone(),
        initial_amount: session.initial_amount,
        sales_total: session.sales_total,
        expected: session.expected_amount(),
        counted: session.final_amount,
        variance: session.variance(),
        sale_count: sales.len(),
        ledger_total: sales.iter().map(|s| s.total).sum(),
        by_payment_method,
        sales: sales.into_iter().cloned().collect(),
    }
}

// =============================================================================
// Inventory
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InventorySummary {
    pub product_count: usize,
    pub total_units: i64,
    /// Stock valued at cost.
    pub stock_value: Money,
    pub low_stock_count: usize,
}

pub fn inventory_summary(catalog: &Catalog) -> InventorySummary {
    let products = catalog.products();
    InventorySummary {
        product_count: products.len(),
        total_units: products.iter().map(|p| p.stock).sum(),
        stock_value: products.iter().map(|p| p.stock_value()).sum(),
        low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::Cart;
    use crate::checkout::Checkout;
    use crate::session::CashRegister;
    use crate::types::{Product, SaleStatus, TaxRate};
    use chrono::Duration;

    fn product(id: &str, code: &str, name: &str, stock: i64, buy: i64, retail: i64) -> Product {
        Product {
            id: id.to_string(),
            code: code.to_string(),
            name: name.to_string(),
            category_id: "1".to_string(),
            brand_id: "1".to_string(),
            buy_price: Money::from_major(buy),
            price_retail: Money::from_major(retail),
            price_wholesale: Money::from_major(retail - 20),
            price_special: Money::from_major(retail - 40),
            stock,
            min_stock: 10,
            is_active: true,
        }
    }

    fn catalog() -> Catalog {
        Catalog::with_products(vec![
            product("1", "P001", "Nike Air Max", 50, 80, 150),
            product("3", "P003", "Samsung Galaxy S23", 10, 600, 900),
        ])
        .unwrap()
    }

    fn sell(
        catalog: &mut Catalog,
        ledger: &mut SalesLedger,
        register: &mut CashRegister,
        items: &[(&str, i64)],
        payment: &str,
    ) -> Sale {
        let mut cart = Cart::new(TaxRate::from_bps(1800));
        for (id, qty) in items {
            cart.add_item(catalog.get(id).unwrap()).unwrap();
            if *qty > 1 {
                cart.change_quantity(catalog, id, qty - 1).unwrap();
            }
        }
        Checkout::new(catalog, ledger, register)
            .process(&cart, payment, None)
            .unwrap()
    }

    #[test]
    fn test_register_day_end_to_end() {
        let mut catalog = catalog();
        let mut ledger = SalesLedger::new();
        let mut register = CashRegister::new();
        register.open(Money::from_major(100), None).unwrap();

        let sale = sell(
            &mut catalog,
            &mut ledger,
            &mut register,
            &[("1", 1), ("3", 1)],
            "Efectivo",
        );
        assert_eq!(sale.subtotal, Money::from_major(1050));
        assert_eq!(sale.tax, Money::from_major(189));
        assert_eq!(sale.total, Money::from_major(1239));
        assert_eq!(catalog.get("1").unwrap().stock, 49);
        assert_eq!(catalog.get("3").unwrap().stock, 9);

        let closure = register.close(Money::from_major(1339), None).unwrap();
        assert_eq!(closure.expected, Money::from_major(1339));
        assert_eq!(closure.variance, Money::zero());

        let summary = session_summary(&ledger, &closure.session);
        assert_eq!(summary.sale_count, 1);
        assert_eq!(summary.ledger_total, closure.session.sales_total);
        assert_eq!(summary.variance, Some(Money::zero()));
        assert_eq!(
            summary.by_payment_method,
            vec![PaymentBreakdown {
                payment_method: "Efectivo".to_string(),
                sale_count: 1,
                total: Money::from_major(1239),
            }]
        );
    }

    #[test]
    fn test_rollup_matches_line_subtotals() {
        let mut catalog = catalog();
        let mut ledger = SalesLedger::new();
        let mut register = CashRegister::new();
        register.open(Money::zero(), None).unwrap();

        sell(&mut catalog, &mut ledger, &mut register, &[("1", 2)], "Efectivo");
        sell(
            &mut catalog,
            &mut ledger,
            &mut register,
            &[("1", 1), ("3", 2)],
            "Tarjeta",
        );

        let rollup = product_rollup(&ledger, None).unwrap();
        let subtotal_sum: Money = ledger.list().iter().map(|s| s.subtotal).sum();

        assert_eq!(rollup.total_revenue, subtotal_sum);
        assert_eq!(rollup.total_revenue, Money::from_major(2250));
        assert_eq!(rollup.total_quantity, 5);

        assert_eq!(rollup.rows[0].code, "P003");
        assert_eq!(rollup.rows[0].revenue, Money::from_major(1800));
        assert!((rollup.rows[0].share_percent - 80.0).abs() < 1e-9);
        assert_eq!(rollup.rows[1].quantity_sold, 3);
        assert!((rollup.rows[1].share_percent - 20.0).abs() < 1e-9);

        let summary = session_summary(&ledger, register.current().unwrap());
        assert_eq!(summary.by_payment_method.len(), 2);
        assert_eq!(summary.ledger_total, register.current().unwrap().sales_total);
    }

    #[test]
    fn test_rollup_empty_ledger_has_zero_share() {
        let rollup = product_rollup(&SalesLedger::new(), None).unwrap();
        assert!(rollup.rows.is_empty());
        assert_eq!(rollup.total_revenue, Money::zero());
        assert_eq!(share_of(Money::zero(), Money::zero()), 0.0);
    }

    #[test]
    fn test_rollup_search_and_canceled_excluded() {
        let mut catalog = catalog();
        let mut register = CashRegister::new();
        register.open(Money::zero(), None).unwrap();
        let mut ledger = SalesLedger::new();
        let sale = sell(&mut catalog, &mut ledger, &mut register, &[("1", 1)], "Efectivo");
        let mut canceled = sell(&mut catalog, &mut ledger, &mut register, &[("3", 1)], "Efectivo");

        canceled.status = SaleStatus::Canceled;
        let ledger = SalesLedger::from_sales(vec![sale, canceled]);

        let rollup = product_rollup(&ledger, None).unwrap();
        assert_eq!(rollup.rows.len(), 1);
        assert_eq!(rollup.rows[0].code, "P001");

        let rollup = product_rollup(&ledger, Some("galaxy")).unwrap();
        assert!(rollup.rows.is_empty());
    }

    #[test]
    fn test_session_sales_window() {
        let mut catalog = catalog();
        let mut ledger = SalesLedger::new();
        let mut register = CashRegister::new();
        register.open(Money::zero(), None).unwrap();
        sell(&mut catalog, &mut ledger, &mut register, &[("1", 1)], "Efectivo");

        let mut later = register.current().cloned().unwrap();
        later.opened_at = later.opened_at + Duration::hours(1);
        assert!(session_sales(&ledger, &later).is_empty());
        assert_eq!(session_sales(&ledger, register.current().unwrap()).len(), 1);
    }

    #[test]
    fn test_inventory_summary() {
        let summary = inventory_summary(&catalog());
        assert_eq!(summary.product_count, 2);
        assert_eq!(summary.total_units, 60);
        assert_eq!(summary.stock_value, Money::from_major(50 * 80 + 10 * 600));
        assert_eq!(summary.low_stock_count, 1);
    }
}
