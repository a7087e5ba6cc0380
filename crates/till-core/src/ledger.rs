//! # Sales Ledger
//!
//! Append-only record of committed sales. Sales are never mutated or
//! deleted once appended; only the checkout processor appends.
//!
//! Storage order is append order (oldest first). Presentation order is
//! newest first, see [`SalesLedger::newest_first`].

use chrono::{DateTime, Utc};

use crate::money::Money;
use crate::types::{Sale, SaleStatus};

/// Date/status filter for the sales history view.
///
/// Bounds are inclusive; `None` leaves that side open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaleFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub status: Option<SaleStatus>,
}

impl SaleFilter {
    pub fn matches(&self, sale: &Sale) -> bool {
        self.from.map_or(true, |from| sale.date >= from)
            && self.to.map_or(true, |to| sale.date <= to)
            && self.status.map_or(true, |status| sale.status == status)
    }
}

#[derive(Debug, Clone)]
pub struct SalesLedger {
    sales: Vec<Sale>,
    next_number: u64,
}

impl Default for SalesLedger {
    fn default() -> Self {
        SalesLedger {
            sales: Vec::new(),
            next_number: 1,
        }
    }
}

impl SalesLedger {
    pub fn new() -> Self {
        SalesLedger::default()
    }

    /// Rebuilds a ledger from persisted sales.
    ///
    /// Accepts either storage order; sales are sorted by date ascending so
    /// that a newest-first list (the browser layout) restores correctly.
    pub fn from_sales(mut sales: Vec<Sale>) -> Self {
        sales.sort_by(|a, b| a.date.cmp(&b.date).then(a.number.cmp(&b.number)));
        let next_number = sales.iter().map(|s| s.number).max().unwrap_or(0) + 1;
        SalesLedger { sales, next_number }
    }

    /// Appends a sale, assigning the next ticket number. Returns the stored
    /// copy.
    pub(crate) fn append(&mut self, mut sale: Sale) -> &Sale {
        sale.number = self.next_number;
        self.next_number += 1;
        self.sales.push(sale);
        &self.sales[self.sales.len() - 1]
    }

    /// Sales in append order.
    pub fn list(&self) -> &[Sale] {
        &self.sales
    }

    /// Sales with the most recent first.
    pub fn newest_first(&self) -> impl Iterator<Item = &Sale> {
        self.sales.iter().rev()
    }

    pub fn get(&self, id: &str) -> Option<&Sale> {
        self.sales.iter().find(|s| s.id == id)
    }

    /// Newest-first sales matching `filter`.
    pub fn filter<'a>(&'a self, filter: &'a SaleFilter) -> impl Iterator<Item = &'a Sale> + 'a {
        self.newest_first().filter(move |s| filter.matches(s))
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }

    /// Number the next appended sale will get.
    pub fn next_number(&self) -> u64 {
        self.next_number
    }

    /// Revenue over completed sales only.
    pub fn completed_revenue(&self) -> Money {
        self.sales
            .iter()
            .filter(|s| s.is_completed())
            .map(|s| s.total)
            .sum()
    }

    pub fn completed_count(&self) -> usize {
        self.sales.iter().filter(|s| s.is_completed()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sale(id: &str, date: DateTime<Utc>, total: i64, status: SaleStatus) -> Sale {
        Sale {
            id: id.to_string(),
            number: 0,
            date,
            client_id: None,
            payment_method: "Efectivo".to_string(),
            lines: Vec::new(),
            subtotal: Money::from_major(total),
            tax: Money::zero(),
            total: Money::from_major(total),
            status,
        }
    }

    #[test]
    fn test_append_assigns_sequential_numbers() {
        let now = Utc::now();
        let mut ledger = SalesLedger::new();

        assert_eq!(ledger.append(sale("a", now, 10, SaleStatus::Completed)).number, 1);
        assert_eq!(ledger.append(sale("b", now, 20, SaleStatus::Completed)).number, 2);

        let ids: Vec<_> = ledger.newest_first().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(ledger.get("a").unwrap().number, 1);
    }

    #[test]
    fn test_from_sales_restores_order_and_numbering() {
        let now = Utc::now();
        let mut newer = sale("new", now, 10, SaleStatus::Completed);
        newer.number = 7;
        let mut older = sale("old", now - Duration::hours(1), 10, SaleStatus::Completed);
        older.number = 6;

        let mut ledger = SalesLedger::from_sales(vec![newer, older]);

        assert_eq!(ledger.list()[0].id, "old");
        assert_eq!(ledger.next_number(), 8);
        assert_eq!(ledger.append(sale("c", now, 1, SaleStatus::Completed)).number, 8);
    }

    #[test]
    fn test_filter_and_completed_revenue() {
        let now = Utc::now();
        let ledger = SalesLedger::from_sales(vec![
            sale("a", now - Duration::days(2), 100, SaleStatus::Completed),
            sale("b", now - Duration::hours(1), 50, SaleStatus::Canceled),
            sale("c", now, 25, SaleStatus::Completed),
        ]);

        let recent = SaleFilter {
            from: Some(now - Duration::days(1)),
            ..SaleFilter::default()
        };
        let ids: Vec<_> = ledger.filter(&recent).map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);

        let completed = SaleFilter {
            status: Some(SaleStatus::Completed),
            ..SaleFilter::default()
        };
        assert_eq!(ledger.filter(&completed).count(), 2);

        assert_eq!(ledger.completed_revenue(), Money::from_major(125));
        assert_eq!(ledger.completed_count(), 2);
    }
}
