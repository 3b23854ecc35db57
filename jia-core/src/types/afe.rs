//! Expenditure Authorization (AFE)
//!
//! Core invariants:
//! - Approval is strictly sequential; levels cannot be skipped or reordered
//! - Rejection is terminal; a rejected AFE is retained for audit, never reused
//! - Category `actual_amount` is the sum of approved expenses, recomputed on
//!   every expense approval
//! - Approving a cost variance never rewrites `estimated_cost`

use super::common::{AfeId, ApprovalDecision, ContractId, UserId};
use crate::approval::ApprovalRecord;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Approval row for one AFE level
pub type AfeApproval = ApprovalRecord;

/// AFE operation type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfeType {
    Workover,
    Drilling,
    Facilities,
    Maintenance,
    Exploration,
    Abandonment,
    Seismic,
}

impl std::fmt::Display for AfeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Workover => write!(f, "workover"),
            Self::Drilling => write!(f, "drilling"),
            Self::Facilities => write!(f, "facilities"),
            Self::Maintenance => write!(f, "maintenance"),
            Self::Exploration => write!(f, "exploration"),
            Self::Abandonment => write!(f, "abandonment"),
            Self::Seismic => write!(f, "seismic"),
        }
    }
}

/// AFE priority
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfePriority {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for AfePriority {
    fn default() -> Self {
        Self::Medium
    }
}

/// AFE lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AfeStatus {
    /// Being drafted, not yet in the approval chain
    Draft,
    /// Submitted, working through approval levels
    Pending,
    /// All required levels approved
    Approved,
    /// Spending has started (first approved expense)
    InProgress,
    /// Closed out with a final cost
    Closed,
    /// Rejected at some level; terminal
    Rejected,
}

impl AfeStatus {
    /// Check if a status transition is valid
    pub fn is_valid_transition(&self, new_status: &AfeStatus) -> bool {
        match (self, new_status) {
            (AfeStatus::Draft, AfeStatus::Pending) => true,
            (AfeStatus::Pending, AfeStatus::Approved) => true,
            (AfeStatus::Pending, AfeStatus::Rejected) => true,
            (AfeStatus::Approved, AfeStatus::InProgress) => true,
            (AfeStatus::Approved, AfeStatus::Closed) => true,
            (AfeStatus::InProgress, AfeStatus::Closed) => true,
            _ => false,
        }
    }

    /// Terminal statuses are retained for audit and accept no operation
    pub fn is_terminal(&self) -> bool {
        matches!(self, AfeStatus::Closed | AfeStatus::Rejected)
    }
}

impl std::fmt::Display for AfeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Closed => write!(f, "closed"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Expenditure authorization
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Afe {
    pub afe_id: AfeId,
    pub code: String,
    pub title: String,
    pub afe_type: AfeType,
    pub contract_ref: ContractId,
    pub estimated_cost: Decimal,
    pub currency: String,
    /// Approval threshold, fixed by cost-tier policy at creation
    pub required_approval_level: u32,
    /// Highest level approved so far; 0 until the first approval lands
    pub current_approval_level: u32,
    pub status: AfeStatus,
    pub justification: String,
    pub priority: AfePriority,
    pub created_by: UserId,
    pub created_at: DateTime<Utc>,
    pub submitted_at: Option<DateTime<Utc>>,
    pub approved_at: Option<DateTime<Utc>>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<UserId>,
    pub final_cost: Option<Decimal>,
    pub variance: Option<Decimal>,
    pub variance_percentage: Option<Decimal>,
}

impl Afe {
    /// Create a new draft AFE
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        afe_id: AfeId,
        code: impl Into<String>,
        title: impl Into<String>,
        afe_type: AfeType,
        contract_ref: ContractId,
        estimated_cost: Decimal,
        currency: impl Into<String>,
        required_approval_level: u32,
        created_by: UserId,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            afe_id,
            code: code.into(),
            title: title.into(),
            afe_type,
            contract_ref,
            estimated_cost,
            currency: currency.into(),
            required_approval_level,
            current_approval_level: 0,
            status: AfeStatus::Draft,
            justification: String::new(),
            priority: AfePriority::default(),
            created_by,
            created_at: now,
            submitted_at: None,
            approved_at: None,
            closed_at: None,
            closed_by: None,
            final_cost: None,
            variance: None,
            variance_percentage: None,
        }
    }

    /// Set justification
    pub fn with_justification(mut self, justification: impl Into<String>) -> Self {
        self.justification = justification.into();
        self
    }

    /// Set priority
    pub fn with_priority(mut self, priority: AfePriority) -> Self {
        self.priority = priority;
        self
    }
}

impl crate::approval::Approvable for Afe {
    fn workflow_status(&self) -> crate::approval::WorkflowStatus {
        use crate::approval::WorkflowStatus;
        match self.status {
            AfeStatus::Draft => WorkflowStatus::Draft,
            AfeStatus::Pending => WorkflowStatus::Pending,
            AfeStatus::Approved | AfeStatus::InProgress | AfeStatus::Closed => {
                WorkflowStatus::Approved
            }
            AfeStatus::Rejected => WorkflowStatus::Rejected,
        }
    }

    fn set_workflow_status(&mut self, status: crate::approval::WorkflowStatus) {
        use crate::approval::WorkflowStatus;
        self.status = match status {
            WorkflowStatus::Draft => AfeStatus::Draft,
            WorkflowStatus::Pending => AfeStatus::Pending,
            WorkflowStatus::Approved => AfeStatus::Approved,
            WorkflowStatus::Rejected => AfeStatus::Rejected,
        };
    }

    fn current_level(&self) -> u32 {
        self.current_approval_level
    }

    fn set_current_level(&mut self, level: u32) {
        self.current_approval_level = level;
    }

    fn required_level(&self) -> u32 {
        self.required_approval_level
    }

    fn mark_submitted(&mut self, now: DateTime<Utc>) {
        self.submitted_at = Some(now);
    }

    fn mark_approved(&mut self, now: DateTime<Utc>) {
        self.approved_at = Some(now);
    }
}

/// Cost category within an AFE
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AfeCategory {
    pub category_id: String,
    pub code: String,
    pub description: String,
    pub estimated_amount: Decimal,
    /// Sum of approved expenses; recomputed whenever an expense is approved
    pub actual_amount: Decimal,
}

impl AfeCategory {
    pub fn new(
        category_id: impl Into<String>,
        code: impl Into<String>,
        description: impl Into<String>,
        estimated_amount: Decimal,
    ) -> Self {
        Self {
            category_id: category_id.into(),
            code: code.into(),
            description: description.into(),
            estimated_amount,
            actual_amount: Decimal::ZERO,
        }
    }
}

/// Expense status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseStatus {
    Pending,
    Approved,
}

impl std::fmt::Display for ExpenseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
        }
    }
}

/// Expense recorded against an AFE category
///
/// Only approved expenses count toward actual spend.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AfeExpense {
    pub expense_id: String,
    pub category_id: String,
    pub description: String,
    /// Amount in the original invoice currency
    pub amount: Decimal,
    pub currency: String,
    /// Recorded exchange rate, not computed (no FX engine in scope)
    pub exchange_rate: Decimal,
    /// Amount converted into the AFE's authorization currency
    pub amount_in_afe_currency: Decimal,
    pub vendor_ref: Option<String>,
    pub status: ExpenseStatus,
    pub recorded_by: UserId,
    pub recorded_at: DateTime<Utc>,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
}

/// Variance type
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceType {
    Cost,
    Schedule,
}

impl std::fmt::Display for VarianceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cost => write!(f, "cost"),
            Self::Schedule => write!(f, "schedule"),
        }
    }
}

/// Recorded deviation from an AFE's approved values
///
/// Runs its own one-level approval, independent of the parent AFE.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AfeVariance {
    pub variance_id: String,
    pub variance_type: VarianceType,
    pub original_value: Decimal,
    pub new_value: Decimal,
    /// new_value - original_value
    pub amount: Decimal,
    /// amount / original_value * 100, to 2 dp
    pub percentage: Decimal,
    pub justification: String,
    pub status: ApprovalDecision,
    pub requested_by: UserId,
    pub requested_at: DateTime<Utc>,
    pub decided_by: Option<UserId>,
    pub decided_at: Option<DateTime<Utc>>,
}
