//! JIA Error Codes Registry
//!
//! Error code format: JIA-{module}-{sequence}
//! - JIA-ALLOC: Allocation errors
//! - JIA-APPR: Approval workflow errors
//! - JIA-AFE: Expenditure authorization errors
//! - JIA-JIB: Billing cycle errors
//! - JIA-CALL: Cash call errors
//!
//! Every state-mutating operation validates its precondition before
//! writing; an error therefore always means the entity is unchanged.

use thiserror::Error;

/// JIA Result type
pub type JiaResult<T> = Result<T, JiaError>;

/// JIA Error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JiaError {
    // ============================================================
    // Allocation Errors (JIA-ALLOC-*)
    // ============================================================
    /// [JIA-ALLOC-001] No parties to allocate across
    #[error("[JIA-ALLOC-001] Cannot allocate {total} across an empty party list")]
    NoParties { total: String },

    /// [JIA-ALLOC-002] Shares do not sum to total after remainder assignment
    ///
    /// Always a calculator defect, never expected on valid input.
    #[error("[JIA-ALLOC-002] Allocation rounding failure: shares sum to {actual}, expected {expected}")]
    AllocationRounding { expected: String, actual: String },

    /// [JIA-ALLOC-003] Working interest outside 0..=100
    #[error("[JIA-ALLOC-003] Party {party_id} has invalid working interest {interest}")]
    InvalidWorkingInterest { party_id: String, interest: String },

    // ============================================================
    // Approval Workflow Errors (JIA-APPR-*)
    // ============================================================
    /// [JIA-APPR-001] Operation not valid from the current status
    #[error("[JIA-APPR-001] Invalid state: cannot {operation} while {current}")]
    InvalidState { operation: String, current: String },

    /// [JIA-APPR-002] Approval attempted out of sequence
    #[error("[JIA-APPR-002] Out-of-order approval: expected level {expected}, got {got}")]
    OutOfOrderApproval { expected: u32, got: u32 },

    /// [JIA-APPR-003] Level already carries a terminal decision
    #[error("[JIA-APPR-003] Level {level} is already approved")]
    AlreadyApproved { level: u32 },

    /// [JIA-APPR-004] No approval record exists for the level
    #[error("[JIA-APPR-004] No approval record for level {level}")]
    MissingApprovalRecord { level: u32 },

    // ============================================================
    // AFE Errors (JIA-AFE-*)
    // ============================================================
    /// [JIA-AFE-001] Category estimates disagree with the AFE estimate
    #[error("[JIA-AFE-001] Category estimates sum to {categories}, AFE estimate is {estimate}")]
    CategoryEstimateMismatch { estimate: String, categories: String },

    /// [JIA-AFE-002] Variance percentage computed against a zero base
    #[error("[JIA-AFE-002] Cannot compute variance against zero estimated cost for AFE {afe_id}")]
    ZeroEstimate { afe_id: String },

    /// [JIA-AFE-003] Expense references a category outside its AFE
    #[error("[JIA-AFE-003] Category {category_id} does not belong to AFE {afe_id}")]
    CategoryNotInAfe { afe_id: String, category_id: String },

    /// [JIA-AFE-004] Amount must be positive
    #[error("[JIA-AFE-004] Invalid amount: {reason}")]
    InvalidAmount { reason: String },

    // ============================================================
    // Billing Errors (JIA-JIB-*)
    // ============================================================
    /// [JIA-JIB-001] Explicit cycle status violates share-derived preconditions
    #[error("[JIA-JIB-001] Inconsistent billing state: cannot set {requested}: {reason}")]
    InconsistentBillingState { requested: String, reason: String },

    /// [JIA-JIB-002] Payment does not settle the share exactly
    #[error("[JIA-JIB-002] Payment {paid} does not match share amount {share}")]
    PaymentMismatch { share: String, paid: String },

    /// [JIA-JIB-003] Cycle has no line items
    #[error("[JIA-JIB-003] Billing cycle requires at least one line item")]
    EmptyCycle,

    // ============================================================
    // Cash Call Errors (JIA-CALL-*)
    // ============================================================
    /// [JIA-CALL-001] Funding exceeds the requested amount
    #[error("[JIA-CALL-001] Overfunding: {funded} exceeds requested {requested}")]
    Overfunding { requested: String, funded: String },

    /// [JIA-CALL-002] Call total must be positive
    #[error("[JIA-CALL-002] Cash call total must be positive, got {total}")]
    NonPositiveCallTotal { total: String },

    // ============================================================
    // General
    // ============================================================
    /// Entity not found
    #[error("{entity} {id} not found")]
    NotFound { entity: String, id: String },
}

impl JiaError {
    /// Create an invalid state error
    pub fn invalid_state(operation: impl Into<String>, current: impl std::fmt::Display) -> Self {
        Self::InvalidState {
            operation: operation.into(),
            current: current.to_string(),
        }
    }

    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Stable error code extracted from the message, if the variant carries one
    pub fn code(&self) -> Option<&'static str> {
        match self {
            Self::NoParties { .. } => Some("JIA-ALLOC-001"),
            Self::AllocationRounding { .. } => Some("JIA-ALLOC-002"),
            Self::InvalidWorkingInterest { .. } => Some("JIA-ALLOC-003"),
            Self::InvalidState { .. } => Some("JIA-APPR-001"),
            Self::OutOfOrderApproval { .. } => Some("JIA-APPR-002"),
            Self::AlreadyApproved { .. } => Some("JIA-APPR-003"),
            Self::MissingApprovalRecord { .. } => Some("JIA-APPR-004"),
            Self::CategoryEstimateMismatch { .. } => Some("JIA-AFE-001"),
            Self::ZeroEstimate { .. } => Some("JIA-AFE-002"),
            Self::CategoryNotInAfe { .. } => Some("JIA-AFE-003"),
            Self::InvalidAmount { .. } => Some("JIA-AFE-004"),
            Self::InconsistentBillingState { .. } => Some("JIA-JIB-001"),
            Self::PaymentMismatch { .. } => Some("JIA-JIB-002"),
            Self::EmptyCycle => Some("JIA-JIB-003"),
            Self::Overfunding { .. } => Some("JIA-CALL-001"),
            Self::NonPositiveCallTotal { .. } => Some("JIA-CALL-002"),
            Self::NotFound { .. } => None,
        }
    }
}
