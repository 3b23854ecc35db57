//! JIA Core Type Definitions
//!
//! All types follow these naming conventions:
//! - snake_case for field names
//! - *_id suffix for primary keys
//! - *_ref suffix for references to other aggregates (provenance only)

pub mod afe;
pub mod billing;
pub mod common;
pub mod funding;
pub mod party;

// Re-export common types
pub use common::{
    AfeId, ApprovalDecision, BillingPeriod, CashCallId, ContractId, JibId, PartyId, UserId,
    row_id,
};

// Re-export party types
pub use party::WorkingParty;

// Re-export AFE types
pub use afe::{
    Afe, AfeApproval, AfeCategory, AfeExpense, AfePriority, AfeStatus, AfeType, AfeVariance,
    ExpenseStatus, VarianceType,
};

// Re-export billing types
pub use billing::{BillingCycle, BillingStatus, JibLineItem, PartnerShare, ShareStatus};

// Re-export funding types
pub use funding::{CashCall, CashCallResponse, CashCallStatus, ResponseStatus};
