//! JIB Engine
//!
//! Cycle construction allocates every amount through the
//! AllocationCalculator, so the partner shares of a cycle always sum to
//! its total costs exactly. Cycle status is an explicit operator action
//! gated by share-derived preconditions, never a free write.

use crate::allocation::AllocationCalculator;
use crate::error::{JiaError, JiaResult};
use crate::types::{
    row_id, AfeId, BillingCycle, BillingPeriod, BillingStatus, ContractId, JibId, JibLineItem,
    PartnerShare, ShareStatus, WorkingParty,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Line item parameters for cycle construction
#[derive(Clone, Debug)]
pub struct LineItemInput {
    pub cost_category: String,
    pub description: String,
    pub amount: Decimal,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub afe_ref: Option<AfeId>,
    pub vendor: Option<String>,
    pub invoice_number: Option<String>,
    pub invoice_date: Option<NaiveDate>,
}

/// Billing cycle engine
#[derive(Clone, Debug, Default)]
pub struct JibEngine {
    calculator: AllocationCalculator,
}

impl JibEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self {
            calculator: AllocationCalculator::new(),
        }
    }

    /// Build a draft billing cycle with its line items and partner shares
    ///
    /// total_costs = Σ line amounts; the operator/partner split and the
    /// per-party shares both come from the calculator's exact-sum policy.
    #[allow(clippy::too_many_arguments)]
    pub fn build_cycle(
        &self,
        jib_id: JibId,
        code: impl Into<String>,
        contract_ref: ContractId,
        billing_period: BillingPeriod,
        currency: impl Into<String>,
        due_date: Option<NaiveDate>,
        line_inputs: Vec<LineItemInput>,
        parties: &[WorkingParty],
        now: DateTime<Utc>,
    ) -> JiaResult<(BillingCycle, Vec<JibLineItem>, Vec<PartnerShare>)> {
        if line_inputs.is_empty() {
            return Err(JiaError::EmptyCycle);
        }
        for input in &line_inputs {
            if input.amount <= Decimal::ZERO {
                return Err(JiaError::InvalidAmount {
                    reason: format!(
                        "line item amount must be positive, got {} for {}",
                        input.amount, input.cost_category
                    ),
                });
            }
        }

        let total_costs: Decimal = line_inputs.iter().map(|i| i.amount).sum();
        let split = self.calculator.operator_split(total_costs, parties)?;
        let allocations = self.calculator.allocate(total_costs, parties)?;

        let line_items: Vec<JibLineItem> = line_inputs
            .into_iter()
            .map(|input| JibLineItem {
                line_item_id: row_id(),
                cost_category: input.cost_category,
                description: input.description,
                amount: input.amount,
                quantity: input.quantity,
                unit_price: input.unit_price,
                afe_ref: input.afe_ref,
                vendor: input.vendor,
                invoice_number: input.invoice_number,
                invoice_date: input.invoice_date,
            })
            .collect();

        let shares: Vec<PartnerShare> = allocations
            .into_iter()
            .map(|allocation| PartnerShare {
                share_id: row_id(),
                party_id: allocation.party_id,
                working_interest: allocation.working_interest,
                share_amount: allocation.amount,
                status: ShareStatus::Pending,
                invoice_ref: None,
                payment_amount: None,
                payment_reference: None,
                paid_at: None,
                dispute_reason: None,
                dispute_date: None,
            })
            .collect();

        let cycle = BillingCycle {
            jib_id,
            code: code.into(),
            contract_ref,
            billing_period,
            total_costs,
            operator_share: split.operator_share,
            partners_share: split.partners_share,
            currency: currency.into(),
            status: BillingStatus::Draft,
            due_date,
            sent_date: None,
            created_at: now,
        };

        Ok((cycle, line_items, shares))
    }

    /// Send a draft cycle to the partners
    pub fn send(&self, cycle: &mut BillingCycle, now: DateTime<Utc>) -> JiaResult<()> {
        if !cycle.status.is_valid_transition(&BillingStatus::Sent) {
            return Err(JiaError::invalid_state("send", cycle.status));
        }
        cycle.status = BillingStatus::Sent;
        cycle.sent_date = Some(now);
        Ok(())
    }

    /// Mark a share invoiced
    pub fn mark_invoiced(
        &self,
        cycle: &BillingCycle,
        share: &mut PartnerShare,
        invoice_ref: impl Into<String>,
    ) -> JiaResult<()> {
        if cycle.status == BillingStatus::Draft {
            return Err(JiaError::invalid_state("invoice share", cycle.status));
        }
        if !share.status.is_valid_transition(&ShareStatus::Invoiced) {
            return Err(JiaError::invalid_state("invoice share", share.status));
        }
        share.status = ShareStatus::Invoiced;
        share.invoice_ref = Some(invoice_ref.into());
        Ok(())
    }

    /// Record a partner's payment of its share
    ///
    /// Partial payment of a single share is not modeled; partial settlement
    /// of the cycle is expressed by other shares remaining pending.
    pub fn record_payment(
        &self,
        cycle: &BillingCycle,
        share: &mut PartnerShare,
        amount: Decimal,
        reference: Option<String>,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        if cycle.status == BillingStatus::Draft {
            return Err(JiaError::invalid_state("record payment", cycle.status));
        }
        if !matches!(share.status, ShareStatus::Pending | ShareStatus::Invoiced) {
            return Err(JiaError::invalid_state("record payment", share.status));
        }
        if amount != share.share_amount {
            return Err(JiaError::PaymentMismatch {
                share: share.share_amount.to_string(),
                paid: amount.to_string(),
            });
        }

        share.status = ShareStatus::Paid;
        share.payment_amount = Some(amount);
        share.payment_reference = reference;
        share.paid_at = Some(now);
        Ok(())
    }

    /// Open a dispute on a share
    pub fn open_dispute(
        &self,
        share: &mut PartnerShare,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        if !share.status.is_valid_transition(&ShareStatus::Disputed) {
            return Err(JiaError::invalid_state("open dispute", share.status));
        }
        share.status = ShareStatus::Disputed;
        share.dispute_reason = Some(reason.into());
        share.dispute_date = Some(now);
        Ok(())
    }

    /// Resolve a dispute, re-entering the lifecycle or settling the share
    ///
    /// Dispute metadata is kept for audit.
    pub fn resolve_dispute(
        &self,
        share: &mut PartnerShare,
        new_status: ShareStatus,
        now: DateTime<Utc>,
    ) -> JiaResult<()> {
        if share.status != ShareStatus::Disputed {
            return Err(JiaError::invalid_state("resolve dispute", share.status));
        }
        if !matches!(new_status, ShareStatus::Pending | ShareStatus::Paid) {
            return Err(JiaError::invalid_state(
                "resolve dispute to",
                new_status,
            ));
        }
        share.status = new_status;
        if new_status == ShareStatus::Paid {
            share.paid_at = Some(now);
        }
        Ok(())
    }

    /// Explicitly set the cycle status, gated by share-derived preconditions
    pub fn set_status(
        &self,
        cycle: &mut BillingCycle,
        shares: &[PartnerShare],
        requested: BillingStatus,
    ) -> JiaResult<()> {
        if !cycle.status.is_valid_transition(&requested) {
            return Err(JiaError::invalid_state(
                format!("set status to {requested}"),
                cycle.status,
            ));
        }

        match requested {
            BillingStatus::Paid => {
                if !shares.iter().all(|s| s.status == ShareStatus::Paid) {
                    return Err(JiaError::InconsistentBillingState {
                        requested: requested.to_string(),
                        reason: "not all partner shares are paid".to_string(),
                    });
                }
            }
            BillingStatus::PartiallyPaid => {
                let settled = shares
                    .iter()
                    .any(|s| matches!(s.status, ShareStatus::Paid | ShareStatus::Invoiced));
                let outstanding = shares.iter().any(|s| s.status == ShareStatus::Pending);
                if !settled || !outstanding {
                    return Err(JiaError::InconsistentBillingState {
                        requested: requested.to_string(),
                        reason: "requires at least one settled and one pending share"
                            .to_string(),
                    });
                }
            }
            BillingStatus::Disputed => {
                if !shares.iter().any(|s| s.status == ShareStatus::Disputed) {
                    return Err(JiaError::InconsistentBillingState {
                        requested: requested.to_string(),
                        reason: "no partner share is disputed".to_string(),
                    });
                }
            }
            BillingStatus::Draft | BillingStatus::Sent => {
                return Err(JiaError::invalid_state(
                    format!("set status to {requested}"),
                    cycle.status,
                ));
            }
        }

        cycle.status = requested;
        Ok(())
    }
}
