//! # Report Commands
//!
//! Read-only views over the ledger, the cash register and the catalog.
//! Nothing here mutates state.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rejected;
use super::sale::SaleSummaryDto;
use crate::error::{ApiError, ApiResult};
use crate::state::{Register, RegisterState};
use till_core::report::{
    inventory_summary, product_rollup, session_summary, InventorySummary, PaymentBreakdown,
    ProductRollup,
};
use till_core::{CashRegisterSession, CoreError, SessionStatus};

/// Reconciliation view of one cash register session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub status: SessionStatus,
    pub opened_at: String,
    pub closed_at: Option<String>,
    pub notes: Option<String>,
    pub initial_cents: i64,
    pub sales_total_cents: i64,
    pub expected_cents: i64,
    pub counted_cents: Option<i64>,
    pub variance_cents: Option<i64>,
    pub sale_count: usize,
    pub ledger_total_cents: i64,
    pub by_payment_method: Vec<PaymentBreakdown>,
    pub sales: Vec<SaleSummaryDto>,
}

impl SessionReport {
    pub(crate) fn build(session: &CashRegisterSession, register: &Register) -> Self {
        let summary = session_summary(&register.ledger, session);
        SessionReport {
            session_id: summary.session_id,
            status: session.status,
            opened_at: session.opened_at.to_rfc3339(),
            closed_at: session.closed_at.map(|at| at.to_rfc3339()),
            notes: session.notes.clone(),
            initial_cents: summary.initial_amount.cents(),
            sales_total_cents: summary.sales_total.cents(),
            expected_cents: summary.expected.cents(),
            counted_cents: summary.counted.map(|m| m.cents()),
            variance_cents: summary.variance.map(|m| m.cents()),
            sale_count: summary.sale_count,
            ledger_total_cents: summary.ledger_total.cents(),
            by_payment_method: summary.by_payment_method,
            sales: summary
                .sales
                .iter()
                .map(|s| SaleSummaryDto::build(s, &register.catalog))
                .collect(),
        }
    }
}

/// Totals for the dashboard header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardTotals {
    pub completed_sales: usize,
    pub revenue_cents: i64,
    pub product_count: usize,
    pub low_stock_count: usize,
    pub session_open: bool,
    /// Sales recorded in the open session, if any.
    pub session_sales_cents: Option<i64>,
}

/// Units and revenue per product over completed sales.
///
/// ## Arguments
/// * `search` - Optional name/code filter; shares are against the filtered total
pub fn product_sales_report(
    register: &RegisterState,
    search: Option<&str>,
) -> ApiResult<ProductRollup> {
    debug!(search = ?search, "product_sales_report command");
    register.with_register(|r| product_rollup(&r.ledger, search).map_err(rejected))
}

/// Report for a session: the open one when `session_id` is `None`,
/// otherwise the named one from the open session or history.
pub fn session_report(
    register: &RegisterState,
    session_id: Option<&str>,
) -> ApiResult<SessionReport> {
    debug!(session = ?session_id, "session_report command");

    register.with_register(|r| {
        let session = match session_id {
            None => r.cash.current(),
            Some(id) => r
                .cash
                .current()
                .filter(|s| s.id == id)
                .or_else(|| r.cash.history().iter().find(|s| s.id == id)),
        };

        match (session, session_id) {
            (Some(session), _) => Ok(SessionReport::build(session, r)),
            (None, Some(id)) => Err(ApiError::not_found("Session", id)),
            (None, None) => Err(rejected(CoreError::SessionNotOpen)),
        }
    })
}

/// Closed sessions, most recent first.
pub fn session_history(register: &RegisterState) -> Vec<SessionReport> {
    debug!("session_history command");
    register.with_register(|r| {
        r.cash
            .history()
            .iter()
            .rev()
            .map(|s| SessionReport::build(s, r))
            .collect()
    })
}

/// Product count, units on hand, stock value at cost, low-stock count.
pub fn inventory_report(register: &RegisterState) -> InventorySummary {
    debug!("inventory_report command");
    register.with_register(|r| inventory_summary(&r.catalog))
}

pub fn dashboard(register: &RegisterState) -> DashboardTotals {
    debug!("dashboard command");
    register.with_register(|r| DashboardTotals {
        completed_sales: r.ledger.completed_count(),
        revenue_cents: r.ledger.completed_revenue().cents(),
        product_count: r.catalog.products().len(),
        low_stock_count: r.catalog.low_stock().len(),
        session_open: r.cash.is_open(),
        session_sales_cents: r.cash.current().map(|s| s.sales_total.cents()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::cart::add_to_cart;
    use crate::commands::sale::checkout;
    use crate::error::ErrorCode;
    use crate::state::ConfigState;
    use till_core::Money;
    use till_store::demo::demo_state;

    fn register_with_sales() -> RegisterState {
        let mut register = Register::from_persisted(demo_state(), &ConfigState::default()).unwrap();
        register.cash.open(Money::from_major(100), None).unwrap();
        let state = RegisterState::new(register);

        add_to_cart(&state, "P001").unwrap();
        add_to_cart(&state, "P001").unwrap();
        checkout(&state, "Efectivo", None).unwrap();

        add_to_cart(&state, "P002").unwrap();
        checkout(&state, "Yape", None).unwrap();
        state
    }

    #[test]
    fn test_product_rollup() {
        let state = register_with_sales();
        let rollup = product_sales_report(&state, None).unwrap();

        assert_eq!(rollup.rows[0].code, "P001");
        assert_eq!(rollup.rows[0].quantity_sold, 2);
        assert_eq!(rollup.total_revenue, Money::from_major(410));
        assert_eq!(rollup.total_quantity, 3);

        let shares: f64 = rollup.rows.iter().map(|r| r.share_percent).sum();
        assert!((shares - 100.0).abs() < 1e-9);

        let filtered = product_sales_report(&state, Some("adidas")).unwrap();
        assert_eq!(filtered.rows.len(), 1);
        assert!((filtered.rows[0].share_percent - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_open_session_report() {
        let state = register_with_sales();
        let report = session_report(&state, None).unwrap();

        assert_eq!(report.status, SessionStatus::Open);
        assert_eq!(report.sale_count, 2);
        // (300 + 110) * 1.18
        assert_eq!(report.sales_total_cents, 48_380);
        assert_eq!(report.ledger_total_cents, report.sales_total_cents);
        assert_eq!(report.expected_cents, 58_380);
        assert_eq!(report.counted_cents, None);
        assert_eq!(report.by_payment_method.len(), 2);
    }

    #[test]
    fn test_session_report_without_session() {
        let state = RegisterState::new(
            Register::from_persisted(demo_state(), &ConfigState::default()).unwrap(),
        );
        let err = session_report(&state, None).unwrap_err();
        assert_eq!(err.code, ErrorCode::SessionError);
        assert!(session_history(&state).is_empty());
    }

    #[test]
    fn test_dashboard_and_inventory() {
        let state = register_with_sales();

        let totals = dashboard(&state);
        assert_eq!(totals.completed_sales, 2);
        assert_eq!(totals.revenue_cents, 48_380);
        assert!(totals.session_open);
        assert_eq!(totals.session_sales_cents, Some(48_380));

        let inventory = inventory_report(&state);
        assert_eq!(inventory.product_count, 4);
        // 50 + 35 + 10 + 8, less the three units sold
        assert_eq!(inventory.total_units, 100);
        assert_eq!(inventory.low_stock_count, 1);
    }
}
