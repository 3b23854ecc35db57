//! AFE Engine
//!
//! Pure state logic over an AFE and its child rows. Callers load the
//! aggregate, apply one operation, and persist the result in the same
//! transaction; every operation validates before mutating, so a returned
//! error always means nothing changed.

use crate::approval::{self, ApprovalRecord};
use crate::error::{JiaError, JiaResult};
use crate::types::{
    row_id, Afe, AfeCategory, AfeExpense, AfeStatus, ExpenseStatus, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

/// Tolerance for the category-estimate soft invariant (one cent)
fn estimate_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

/// AFE engine
#[derive(Clone, Debug, Default)]
pub struct AfeEngine;

impl AfeEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self
    }

    /// Validate and attach category estimates to a draft AFE
    ///
    /// Soft invariant: category estimates must sum to the AFE estimate
    /// within one minor unit.
    pub fn build_categories(
        &self,
        afe: &Afe,
        estimates: Vec<(String, String, Decimal)>,
    ) -> JiaResult<Vec<AfeCategory>> {
        let total: Decimal = estimates.iter().map(|(_, _, amount)| *amount).sum();
        let drift = (total - afe.estimated_cost).abs();
        if drift > estimate_tolerance() {
            return Err(JiaError::CategoryEstimateMismatch {
                estimate: afe.estimated_cost.to_string(),
                categories: total.to_string(),
            });
        }

        Ok(estimates
            .into_iter()
            .map(|(code, description, amount)| {
                AfeCategory::new(row_id(), code, description, amount)
            })
            .collect())
    }

    /// Submit a draft AFE into its approval chain
    ///
    /// Requires at least one populated category.
    pub fn submit(
        &self,
        afe: &mut Afe,
        categories: &[AfeCategory],
        now: DateTime<Utc>,
    ) -> JiaResult<Vec<ApprovalRecord>> {
        if categories.is_empty() {
            return Err(JiaError::invalid_state(
                "submit an AFE without categories",
                afe.status,
            ));
        }
        approval::submit(afe, now)
    }

    /// Approve one level of the chain, strictly in sequence
    pub fn approve_level(
        &self,
        afe: &mut Afe,
        approvals: &mut [ApprovalRecord],
        level: u32,
        approver: &UserId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        approval::approve_level(afe, approvals, level, approver, comments, now)
    }

    /// Reject one level; terminal for the AFE
    pub fn reject_level(
        &self,
        afe: &mut Afe,
        approvals: &mut [ApprovalRecord],
        level: u32,
        approver: &UserId,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        approval::reject_level(afe, approvals, level, approver, reason, now)
    }

    /// Record a pending expense against a category
    ///
    /// Pending expenses never count toward actual spend.
    #[allow(clippy::too_many_arguments)]
    pub fn record_expense(
        &self,
        afe: &Afe,
        categories: &[AfeCategory],
        category_id: &str,
        description: impl Into<String>,
        amount: Decimal,
        currency: impl Into<String>,
        exchange_rate: Decimal,
        vendor_ref: Option<String>,
        recorded_by: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<AfeExpense> {
        if !matches!(afe.status, AfeStatus::Approved | AfeStatus::InProgress) {
            return Err(JiaError::invalid_state("record expense", afe.status));
        }
        if amount <= Decimal::ZERO {
            return Err(JiaError::InvalidAmount {
                reason: format!("expense amount must be positive, got {amount}"),
            });
        }
        if exchange_rate <= Decimal::ZERO {
            return Err(JiaError::InvalidAmount {
                reason: format!("exchange rate must be positive, got {exchange_rate}"),
            });
        }
        if !categories.iter().any(|c| c.category_id == category_id) {
            return Err(JiaError::CategoryNotInAfe {
                afe_id: afe.afe_id.to_string(),
                category_id: category_id.to_string(),
            });
        }

        Ok(AfeExpense {
            expense_id: row_id(),
            category_id: category_id.to_string(),
            description: description.into(),
            amount,
            currency: currency.into(),
            exchange_rate,
            amount_in_afe_currency: (amount * exchange_rate).round_dp(2),
            vendor_ref,
            status: ExpenseStatus::Pending,
            recorded_by: recorded_by.clone(),
            recorded_at: now,
            approved_by: None,
            approved_at: None,
        })
    }

    /// Approve a pending expense
    ///
    /// Recomputes the category's `actual_amount` from its approved expenses
    /// in the same mutation, and moves an Approved AFE to InProgress on the
    /// first approved expense (implicit transition).
    pub fn approve_expense(
        &self,
        afe: &mut Afe,
        categories: &mut [AfeCategory],
        expenses: &mut [AfeExpense],
        expense_id: &str,
        approver: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        if afe.status.is_terminal() {
            return Err(JiaError::invalid_state("approve expense", afe.status));
        }

        let idx = expenses
            .iter()
            .position(|e| e.expense_id == expense_id)
            .ok_or_else(|| JiaError::not_found("Expense", expense_id))?;
        if expenses[idx].status != ExpenseStatus::Pending {
            return Err(JiaError::invalid_state(
                "approve expense",
                expenses[idx].status,
            ));
        }

        expenses[idx].status = ExpenseStatus::Approved;
        expenses[idx].approved_by = Some(approver.clone());
        expenses[idx].approved_at = Some(now);

        let category_id = expenses[idx].category_id.clone();
        let actual: Decimal = expenses
            .iter()
            .filter(|e| e.category_id == category_id && e.status == ExpenseStatus::Approved)
            .map(|e| e.amount_in_afe_currency)
            .sum();
        if let Some(category) = categories.iter_mut().find(|c| c.category_id == category_id) {
            category.actual_amount = actual;
        }

        if afe.status == AfeStatus::Approved {
            afe.status = AfeStatus::InProgress;
        }

        Ok(())
    }

    /// Close out an AFE against its final cost
    ///
    /// A zero estimated cost is a configuration error: the variance
    /// percentage has no defined base, so the closeout is refused rather
    /// than silently reported as zero.
    pub fn close(
        &self,
        afe: &mut Afe,
        final_cost: Decimal,
        closed_by: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        if !matches!(afe.status, AfeStatus::Approved | AfeStatus::InProgress) {
            return Err(JiaError::invalid_state("close", afe.status));
        }
        if afe.estimated_cost.is_zero() {
            return Err(JiaError::ZeroEstimate {
                afe_id: afe.afe_id.to_string(),
            });
        }

        let variance = final_cost - afe.estimated_cost;
        afe.final_cost = Some(final_cost);
        afe.variance = Some(variance);
        afe.variance_percentage =
            Some((variance / afe.estimated_cost * Decimal::ONE_HUNDRED).round_dp(2));
        afe.closed_by = Some(closed_by.clone());
        afe.closed_at = Some(now);
        afe.status = AfeStatus::Closed;

        Ok(())
    }
}
