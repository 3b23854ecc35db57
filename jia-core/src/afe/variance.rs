//! AFE Variances
//!
//! A variance is a negotiated record of deviation from an AFE's approved
//! values, with its own one-level approval lifecycle. Approving a cost
//! variance deliberately does not rewrite `estimated_cost`: a retroactive
//! change would invalidate the variance-percentage history.

use super::AfeEngine;
use crate::error::{JiaError, JiaResult};
use crate::types::{row_id, Afe, AfeStatus, AfeVariance, ApprovalDecision, UserId, VarianceType};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

impl AfeEngine {
    /// Request a variance against an active AFE
    ///
    /// The percentage base is `original_value`; a zero base has no defined
    /// percentage and is refused as a configuration error.
    #[allow(clippy::too_many_arguments)]
    pub fn request_variance(
        &self,
        afe: &Afe,
        variance_type: VarianceType,
        original_value: Decimal,
        new_value: Decimal,
        justification: impl Into<String>,
        requested_by: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<AfeVariance> {
        if !matches!(afe.status, AfeStatus::Approved | AfeStatus::InProgress) {
            return Err(JiaError::invalid_state("request variance", afe.status));
        }
        if original_value.is_zero() {
            return Err(JiaError::ZeroEstimate {
                afe_id: afe.afe_id.to_string(),
            });
        }

        let amount = new_value - original_value;
        Ok(AfeVariance {
            variance_id: row_id(),
            variance_type,
            original_value,
            new_value,
            amount,
            percentage: (amount / original_value * Decimal::ONE_HUNDRED).round_dp(2),
            justification: justification.into(),
            status: ApprovalDecision::Pending,
            requested_by: requested_by.clone(),
            requested_at: now,
            decided_by: None,
            decided_at: None,
        })
    }

    /// Approve a pending variance
    pub fn approve_variance(
        &self,
        variance: &mut AfeVariance,
        approver: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        self.decide_variance(variance, ApprovalDecision::Approved, approver, now)
    }

    /// Reject a pending variance
    pub fn reject_variance(
        &self,
        variance: &mut AfeVariance,
        approver: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        self.decide_variance(variance, ApprovalDecision::Rejected, approver, now)
    }

    fn decide_variance(
        &self,
        variance: &mut AfeVariance,
        decision: ApprovalDecision,
        approver: &UserId,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        if variance.status != ApprovalDecision::Pending {
            return Err(JiaError::invalid_state("decide variance", variance.status));
        }
        variance.status = decision;
        variance.decided_by = Some(approver.clone());
        variance.decided_at = Some(now);
        Ok(())
    }
}
