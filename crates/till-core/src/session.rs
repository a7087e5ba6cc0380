//! # Cash-Register Session Manager
//!
//! A two-state machine around the cash drawer.
//!
//! ```text
//!            open(initial, notes)
//!   ┌────────┐ ────────────────────► ┌────────┐
//!   │ Closed │                       │  Open  │ ◄── record_sale(total)
//!   └────────┘ ◄──────────────────── └────────┘
//!            close(counted, notes)
//!
//!   expected = initial_amount + sales_total
//!   variance = counted - expected
//! ```
//!
//! At most one session is open at a time. The gate is the `current` slot
//! itself; callers cannot set it directly.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CashRegisterSession, SessionStatus};
use crate::validation::validate_amount;

/// Separator placed between opening and closing notes.
const CLOSING_NOTES_PREFIX: &str = "\nCierre: ";

/// Result of closing a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SessionClosure {
    pub session: CashRegisterSession,
    pub expected: Money,
    pub counted: Money,
    /// Positive: drawer over. Negative: drawer short.
    pub variance: Money,
}

#[derive(Debug, Clone, Default)]
pub struct CashRegister {
    current: Option<CashRegisterSession>,
    history: Vec<CashRegisterSession>,
}

impl CashRegister {
    pub fn new() -> Self {
        CashRegister::default()
    }

    /// Rebuilds the register from persisted state.
    ///
    /// A persisted session that is already closed goes to history instead
    /// of the open slot.
    pub fn restore(
        current: Option<CashRegisterSession>,
        history: Vec<CashRegisterSession>,
    ) -> Self {
        let mut register = CashRegister {
            current: None,
            history,
        };
        match current {
            Some(session) if session.is_open() => register.current = Some(session),
            Some(session) => {
                if !register.history.iter().any(|s| s.id == session.id) {
                    register.history.push(session);
                }
            }
            None => {}
        }
        register
    }

    pub fn is_open(&self) -> bool {
        self.current.is_some()
    }

    /// The open session, if any.
    pub fn current(&self) -> Option<&CashRegisterSession> {
        self.current.as_ref()
    }

    /// Closed sessions, oldest first.
    pub fn history(&self) -> &[CashRegisterSession] {
        &self.history
    }

    /// Opens a new session with `initial_amount` in the drawer.
    pub fn open(
        &mut self,
        initial_amount: Money,
        notes: Option<String>,
    ) -> CoreResult<&CashRegisterSession> {
        if let Some(session) = &self.current {
            return Err(CoreError::SessionAlreadyOpen(session.id.clone()));
        }
        validate_amount("initial amount", initial_amount)?;

        let session = self.current.insert(CashRegisterSession {
            id: Uuid::new_v4().to_string(),
            opened_at: Utc::now(),
            closed_at: None,
            initial_amount,
            final_amount: None,
            sales_total: Money::zero(),
            status: SessionStatus::Open,
            notes: notes.filter(|n| !n.trim().is_empty()),
        });
        Ok(session)
    }

    /// Adds a completed sale's total to the open session.
    ///
    /// Checkout gates on [`CashRegister::is_open`] first, so reaching the
    /// error here means a caller skipped that gate.
    pub fn record_sale(&mut self, total: Money) -> CoreResult<Money> {
        let session = self.current.as_mut().ok_or(CoreError::SessionNotOpen)?;
        session.sales_total += total;
        Ok(session.sales_total)
    }

    /// Closes the open session against the physically counted cash.
    pub fn close(&mut self, counted: Money, notes: Option<String>) -> CoreResult<SessionClosure> {
        if self.current.is_none() {
            return Err(CoreError::SessionNotOpen);
        }
        validate_amount("counted amount", counted)?;
        let mut session = self.current.take().ok_or(CoreError::SessionNotOpen)?;

        let expected = session.expected_amount();
        session.closed_at = Some(Utc::now());
        session.final_amount = Some(counted);
        session.status = SessionStatus::Closed;

        if let Some(closing) = notes.filter(|n| !n.trim().is_empty()) {
            session.notes = Some(match session.notes.take() {
                Some(opening) => format!("{}{}{}", opening, CLOSING_NOTES_PREFIX, closing),
                None => closing,
            });
        }

        self.history.push(session.clone());

        Ok(SessionClosure {
            session,
            expected,
            counted,
            variance: counted - expected,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_close_with_zero_variance() {
        let mut register = CashRegister::new();
        register.open(Money::from_major(100), None).unwrap();
        register.record_sale(Money::from_major(1239)).unwrap();

        let closure = register.close(Money::from_major(1339), None).unwrap();

        assert_eq!(closure.expected, Money::from_major(1339));
        assert_eq!(closure.variance, Money::zero());
        assert_eq!(closure.session.status, SessionStatus::Closed);
        assert_eq!(closure.session.final_amount, Some(Money::from_major(1339)));
        assert!(closure.session.closed_at.is_some());
        assert!(!register.is_open());
        assert_eq!(register.history().len(), 1);
    }

    #[test]
    fn test_short_drawer_is_negative_variance() {
        let mut register = CashRegister::new();
        register.open(Money::from_major(50), None).unwrap();
        register.record_sale(Money::from_cents(2550)).unwrap();

        let closure = register.close(Money::from_major(70), None).unwrap();
        assert_eq!(closure.variance, Money::from_cents(-550));
    }

    #[test]
    fn test_state_machine_gates() {
        let mut register = CashRegister::new();

        assert_eq!(
            register.close(Money::zero(), None),
            Err(CoreError::SessionNotOpen)
        );
        assert_eq!(
            register.close(Money::from_cents(-1), None),
            Err(CoreError::SessionNotOpen)
        );
        assert_eq!(
            register.record_sale(Money::from_major(1)),
            Err(CoreError::SessionNotOpen)
        );

        let id = register.open(Money::zero(), None).unwrap().id.clone();
        assert_eq!(
            register.open(Money::from_major(10), None).unwrap_err(),
            CoreError::SessionAlreadyOpen(id)
        );
    }

    #[test]
    fn test_negative_float_rejected() {
        let mut register = CashRegister::new();
        let err = register.open(Money::from_cents(-1), None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(!register.is_open());
    }

    #[test]
    fn test_negative_count_keeps_session_open() {
        let mut register = CashRegister::new();
        register.open(Money::from_major(100), None).unwrap();

        let err = register.close(Money::from_cents(-1), None).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(register.is_open());
    }

    #[test]
    fn test_closing_notes_appended() {
        let mut register = CashRegister::new();
        register
            .open(Money::zero(), Some("morning shift".to_string()))
            .unwrap();

        let closure = register
            .close(Money::zero(), Some("all good".to_string()))
            .unwrap();

        assert_eq!(
            closure.session.notes.as_deref(),
            Some("morning shift\nCierre: all good")
        );
    }

    #[test]
    fn test_restore() {
        let mut register = CashRegister::new();
        register.open(Money::from_major(20), None).unwrap();
        let open = register.current().cloned();

        let restored = CashRegister::restore(open, Vec::new());
        assert!(restored.is_open());

        let mut closed = register.current().cloned().unwrap();
        closed.status = SessionStatus::Closed;
        let restored = CashRegister::restore(Some(closed), Vec::new());
        assert!(!restored.is_open());
        assert_eq!(restored.history().len(), 1);
    }
}
