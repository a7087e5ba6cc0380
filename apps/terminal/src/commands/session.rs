//! # Session Commands
//!
//! Opening and closing the cash register.
//!
//! ```text
//!   Closed ──open(float, notes)──► Open ──close(counted, notes)──► Closed
//!                                   │
//!                                   └── every checkout adds its total
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::rejected;
use super::report::SessionReport;
use crate::error::ApiResult;
use crate::state::RegisterState;
use till_core::{CashRegisterSession, Money, SessionStatus};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDto {
    pub id: String,
    pub status: SessionStatus,
    pub opened_at: String,
    pub initial_cents: i64,
    pub sales_total_cents: i64,
    pub expected_cents: i64,
    pub notes: Option<String>,
}

impl From<&CashRegisterSession> for SessionDto {
    fn from(session: &CashRegisterSession) -> Self {
        SessionDto {
            id: session.id.clone(),
            status: session.status,
            opened_at: session.opened_at.to_rfc3339(),
            initial_cents: session.initial_amount.cents(),
            sales_total_cents: session.sales_total.cents(),
            expected_cents: session.expected_amount().cents(),
            notes: session.notes.clone(),
        }
    }
}

/// Closing figures plus the full report of the session just closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseResponse {
    pub expected_cents: i64,
    pub counted_cents: i64,
    pub variance_cents: i64,
    pub report: SessionReport,
}

/// Opens the register with `initial` in the drawer.
pub fn open_session(
    register: &RegisterState,
    initial: Money,
    notes: Option<String>,
) -> ApiResult<SessionDto> {
    debug!(initial = %initial, "open_session command");

    register.with_register_mut(|r| {
        let session = r.cash.open(initial, notes).map_err(rejected)?;
        info!(session_id = %session.id, initial = %initial, "Cash register opened");
        Ok(SessionDto::from(session))
    })
}

/// Closes the register against the counted cash.
///
/// ## Returns
/// Expected, counted and variance, and the session's sales report
pub fn close_session(
    register: &RegisterState,
    counted: Money,
    notes: Option<String>,
) -> ApiResult<CloseResponse> {
    debug!(counted = %counted, "close_session command");

    register.with_register_mut(|r| {
        let closure = r.cash.close(counted, notes).map_err(rejected)?;
        info!(
            session_id = %closure.session.id,
            expected = %closure.expected,
            counted = %closure.counted,
            variance = %closure.variance,
            "Cash register closed"
        );

        Ok(CloseResponse {
            expected_cents: closure.expected.cents(),
            counted_cents: closure.counted.cents(),
            variance_cents: closure.variance.cents(),
            report: SessionReport::build(&closure.session, r),
        })
    })
}

/// The open session, if any.
pub fn current_session(register: &RegisterState) -> Option<SessionDto> {
    debug!("current_session command");
    register.with_register(|r| r.cash.current().map(SessionDto::from))
}
