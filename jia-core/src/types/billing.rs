//! Joint Interest Billing (JIB)
//!
//! Core invariants:
//! - operator_share + partners_share = total_costs
//! - The partner shares of a cycle sum to total_costs exactly
//! - Cycle status is set explicitly but must satisfy share-derived
//!   preconditions; violations are rejected, never coerced

use super::common::{BillingPeriod, ContractId, JibId, PartyId};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Billing cycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingStatus {
    Draft,
    Sent,
    PartiallyPaid,
    Paid,
    Disputed,
}

impl BillingStatus {
    /// Check if a status transition is valid
    pub fn is_valid_transition(&self, new_status: &BillingStatus) -> bool {
        match (self, new_status) {
            (BillingStatus::Draft, BillingStatus::Sent) => true,
            (BillingStatus::Sent, BillingStatus::PartiallyPaid) => true,
            (BillingStatus::Sent, BillingStatus::Paid) => true,
            (BillingStatus::Sent, BillingStatus::Disputed) => true,
            (BillingStatus::PartiallyPaid, BillingStatus::Paid) => true,
            (BillingStatus::PartiallyPaid, BillingStatus::Disputed) => true,
            (BillingStatus::Disputed, BillingStatus::PartiallyPaid) => true,
            (BillingStatus::Disputed, BillingStatus::Paid) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for BillingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Sent => write!(f, "sent"),
            Self::PartiallyPaid => write!(f, "partially_paid"),
            Self::Paid => write!(f, "paid"),
            Self::Disputed => write!(f, "disputed"),
        }
    }
}

/// Periodic cost bill allocating shared operating costs across partners
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingCycle {
    pub jib_id: JibId,
    pub code: String,
    pub contract_ref: ContractId,
    pub billing_period: BillingPeriod,
    pub total_costs: Decimal,
    pub operator_share: Decimal,
    pub partners_share: Decimal,
    pub currency: String,
    pub status: BillingStatus,
    pub due_date: Option<NaiveDate>,
    pub sent_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl BillingCycle {
    /// Due-date overrun is a read-time computation, never a stored state
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        match (self.status, self.due_date) {
            (BillingStatus::Paid, _) | (_, None) => false,
            (_, Some(due)) => today > due,
        }
    }
}

/// Line item within a billing cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct JibLineItem {
    pub line_item_id: String,
    pub cost_category: String,
    pub description: String,
    pub amount: Decimal,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    /// Provenance only; never dereferenced by the billing engine
    pub afe_ref: Option<super::common::AfeId>,
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
}

/// Partner share status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShareStatus {
    Pending,
    Invoiced,
    Paid,
    Disputed,
}

impl ShareStatus {
    /// Check if a status transition is valid
    pub fn is_valid_transition(&self, new_status: &ShareStatus) -> bool {
        match (self, new_status) {
            (ShareStatus::Pending, ShareStatus::Invoiced) => true,
            (ShareStatus::Pending, ShareStatus::Paid) => true,
            (ShareStatus::Pending, ShareStatus::Disputed) => true,
            (ShareStatus::Invoiced, ShareStatus::Paid) => true,
            (ShareStatus::Invoiced, ShareStatus::Disputed) => true,
            // Dispute resolution re-enters the lifecycle or settles
            (ShareStatus::Disputed, ShareStatus::Pending) => true,
            (ShareStatus::Disputed, ShareStatus::Paid) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for ShareStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Invoiced => write!(f, "invoiced"),
            Self::Paid => write!(f, "paid"),
            Self::Disputed => write!(f, "disputed"),
        }
    }
}

/// One partner's share of a billing cycle
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PartnerShare {
    pub share_id: String,
    pub party_id: PartyId,
    /// Working-interest snapshot at allocation time; never updated
    pub working_interest: Decimal,
    pub share_amount: Decimal,
    pub status: ShareStatus,
    pub invoice_ref: Option<String>,
    pub payment_amount: Option<Decimal>,
    pub payment_reference: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub dispute_reason: Option<String>,
    pub dispute_date: Option<DateTime<Utc>>,
}
