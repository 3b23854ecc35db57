//! Cash Calls
//!
//! A cash call asks partners to advance funds ahead of or during an
//! operation. `funded_amount` on the call is always the live sum of its
//! responses' funded amounts, recomputed alongside every response write.

use super::common::{AfeId, CashCallId, ContractId, PartyId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cash call status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CashCallStatus {
    Draft,
    Sent,
    PartiallyFunded,
    Funded,
}

impl CashCallStatus {
    /// Check if a status transition is valid
    pub fn is_valid_transition(&self, new_status: &CashCallStatus) -> bool {
        match (self, new_status) {
            (CashCallStatus::Draft, CashCallStatus::Sent) => true,
            (CashCallStatus::Sent, CashCallStatus::PartiallyFunded) => true,
            (CashCallStatus::Sent, CashCallStatus::Funded) => true,
            (CashCallStatus::PartiallyFunded, CashCallStatus::Funded) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for CashCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::PartiallyFunded => write!(f, "partially_funded"),
            Self::Funded => write!(f, "funded"),
        }
    }
}

/// Funding request across working-interest partners
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashCall {
    pub call_id: CashCallId,
    pub code: String,
    pub contract_ref: ContractId,
    pub purpose: String,
    /// Provenance only
    pub afe_ref: Option<AfeId>,
    pub total_amount: Decimal,
    /// Derived: sum of response funded amounts
    pub funded_amount: Decimal,
    pub currency: String,
    pub call_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub status: CashCallStatus,
    pub created_at: DateTime<Utc>,
}

impl CashCall {
    /// Due-date overrun is a read-time computation, never a stored state
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match (self.status, self.due_date) {
            (CashCallStatus::Funded, _) | (_, None) => false,
            (_, Some(due)) => today > due,
        }
    }
}

/// Response status for one party's funding obligation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseStatus {
    Pending,
    /// Funded below the requested amount; terminal (shortfalls get a new call)
    Partial,
    Funded,
}

impl std::fmt::Display for ResponseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Partial => write!(f, "partial"),
            Self::Funded => write!(f, "funded"),
        }
    }
}

/// One party's funding response to a cash call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashCallResponse {
    pub response_id: String,
    pub party_id: PartyId,
    /// Working-interest snapshot at allocation time; never updated
    pub working_interest: Decimal,
    pub requested_amount: Decimal,
    pub funded_amount: Decimal,
    pub funded_date: Option<NaiveDate>,
    pub payment_reference: Option<String>,
    pub bank_reference: Option<String>,
    pub status: ResponseStatus,
}
