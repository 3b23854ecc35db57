//! Executor Core Module
//!
//! The orchestration facade over the three accounting aggregates. Every
//! state-changing operation is exactly one repository `mutate` call, so a
//! precondition failure anywhere inside leaves the stored aggregate
//! untouched. The acting user is always an explicit parameter; nothing is
//! read from ambient state.

use crate::error::{ExecutorError, ExecutorResult};
use crate::registry::PartyRegistry;
use chrono::{NaiveDate, Utc};
use jia_core::types::{
    Afe, AfeId, AfePriority, AfeType, BillingPeriod, CashCallId, ContractId, JibId, ShareStatus,
    UserId, VarianceType,
};
use jia_core::{AfeEngine, CashCallEngine, JiaError, JibEngine, LineItemInput};
use jia_store::{
    AfeRecord, AfeRepository, BillingRecord, BillingRepository, CashCallRecord, FundingRepository,
    MemoryAfeStore, MemoryBillingStore, MemoryFundingStore,
};
use rust_decimal::Decimal;
use std::sync::Arc;

/// One category estimate inside an AFE draft
#[derive(Clone, Debug)]
pub struct CategoryEstimate {
    pub code: String,
    pub description: String,
    pub estimated_amount: Decimal,
}

/// Inputs for a new AFE
#[derive(Clone, Debug)]
pub struct AfeDraft {
    pub afe_id: AfeId,
    pub code: String,
    pub title: String,
    pub afe_type: AfeType,
    pub contract_ref: ContractId,
    pub estimated_cost: Decimal,
    pub currency: String,
    /// Approval threshold, fixed by cost-tier policy before drafting
    pub required_approval_level: u32,
    pub justification: String,
    pub priority: AfePriority,
    pub categories: Vec<CategoryEstimate>,
}

/// Inputs for a field expense against an approved AFE
#[derive(Clone, Debug)]
pub struct ExpenseInput {
    pub category_id: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub exchange_rate: Decimal,
    pub vendor_ref: Option<String>,
}

/// Inputs for a variance request
#[derive(Clone, Debug)]
pub struct VarianceRequest {
    pub variance_type: VarianceType,
    pub original_value: Decimal,
    pub new_value: Decimal,
    pub justification: String,
}

/// Inputs for a new billing cycle
#[derive(Clone, Debug)]
pub struct CycleDraft {
    pub jib_id: JibId,
    pub code: String,
    pub contract_ref: ContractId,
    pub billing_period: BillingPeriod,
    pub currency: String,
    pub due_date: Option<NaiveDate>,
    pub line_items: Vec<LineItemInput>,
}

/// Inputs for a new cash call
#[derive(Clone, Debug)]
pub struct CashCallDraft {
    pub call_id: CashCallId,
    pub code: String,
    pub contract_ref: ContractId,
    pub purpose: String,
    pub afe_ref: Option<AfeId>,
    pub total_amount: Decimal,
    pub currency: String,
    pub call_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

/// JIA Executor - orchestration facade
pub struct JiaExecutor {
    afes: Arc<dyn AfeRepository>,
    billing: Arc<dyn BillingRepository>,
    funding: Arc<dyn FundingRepository>,
    registry: Arc<dyn PartyRegistry>,
    afe_engine: AfeEngine,
    jib_engine: JibEngine,
    call_engine: CashCallEngine,
}

impl JiaExecutor {
    /// Create an executor over the given repositories and registry
    pub fn new(
        afes: Arc<dyn AfeRepository>,
        billing: Arc<dyn BillingRepository>,
        funding: Arc<dyn FundingRepository>,
        registry: Arc<dyn PartyRegistry>,
    ) -> Self {
        Self {
            afes,
            billing,
            funding,
            registry,
            afe_engine: AfeEngine::new(),
            jib_engine: JibEngine::new(),
            call_engine: CashCallEngine::new(),
        }
    }

    /// Create an executor backed by in-memory stores
    pub fn in_memory(registry: Arc<dyn PartyRegistry>) -> Self {
        Self::new(
            Arc::new(MemoryAfeStore::new()),
            Arc::new(MemoryBillingStore::new()),
            Arc::new(MemoryFundingStore::new()),
            registry,
        )
    }

    /// AFE repository handle, for read-side queries
    pub fn afes(&self) -> &Arc<dyn AfeRepository> {
        &self.afes
    }

    /// Billing repository handle, for read-side queries
    pub fn billing(&self) -> &Arc<dyn BillingRepository> {
        &self.billing
    }

    /// Funding repository handle, for read-side queries
    pub fn funding(&self) -> &Arc<dyn FundingRepository> {
        &self.funding
    }

    // ============================================================
    // AFE operations
    // ============================================================

    /// Draft a new AFE with its category estimates
    pub async fn create_afe(&self, draft: AfeDraft, actor: &UserId) -> ExecutorResult<AfeRecord> {
        let now = Utc::now();
        let afe = Afe::new(
            draft.afe_id,
            draft.code,
            draft.title,
            draft.afe_type,
            draft.contract_ref,
            draft.estimated_cost,
            draft.currency,
            draft.required_approval_level,
            actor.clone(),
            now,
        )
        .with_justification(draft.justification)
        .with_priority(draft.priority);

        let estimates = draft
            .categories
            .into_iter()
            .map(|c| (c.code, c.description, c.estimated_amount))
            .collect();
        let categories = self.afe_engine.build_categories(&afe, estimates)?;

        let record = self.afes.create(AfeRecord::new(afe, categories)).await?;
        tracing::info!(afe = %record.afe.afe_id, actor = %actor, "AFE drafted");
        Ok(record)
    }

    /// Submit a draft AFE into its approval chain
    pub async fn submit_afe(&self, afe_id: &AfeId, actor: &UserId) -> ExecutorResult<AfeRecord> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let AfeRecord {
                        afe,
                        categories,
                        approvals,
                        ..
                    } = rec;
                    *approvals = engine.submit(afe, categories, now)?;
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(
            afe = %afe_id,
            actor = %actor,
            status = %record.afe.status,
            "AFE submitted"
        );
        Ok(record)
    }

    /// Approve one level of an AFE's chain
    pub async fn approve_afe_level(
        &self,
        afe_id: &AfeId,
        level: u32,
        approver: &UserId,
        comments: Option<String>,
    ) -> ExecutorResult<AfeRecord> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let approver_inner = approver.clone();
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let AfeRecord { afe, approvals, .. } = rec;
                    engine.approve_level(afe, approvals, level, &approver_inner, comments, now)
                }),
            )
            .await?;
        tracing::info!(
            afe = %afe_id,
            level,
            approver = %approver,
            status = %record.afe.status,
            "AFE level approved"
        );
        Ok(record)
    }

    /// Reject one level of an AFE's chain; terminal
    pub async fn reject_afe_level(
        &self,
        afe_id: &AfeId,
        level: u32,
        approver: &UserId,
        reason: Option<String>,
    ) -> ExecutorResult<AfeRecord> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let approver_inner = approver.clone();
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let AfeRecord { afe, approvals, .. } = rec;
                    engine.reject_level(afe, approvals, level, &approver_inner, reason, now)
                }),
            )
            .await?;
        tracing::info!(afe = %afe_id, level, approver = %approver, "AFE rejected");
        Ok(record)
    }

    /// Record a pending field expense; returns the new expense id
    pub async fn record_expense(
        &self,
        afe_id: &AfeId,
        input: ExpenseInput,
        actor: &UserId,
    ) -> ExecutorResult<(AfeRecord, String)> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let actor_inner = actor.clone();
        let mut expense_id = String::new();
        let expense_slot = &mut expense_id;
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let expense = engine.record_expense(
                        &rec.afe,
                        &rec.categories,
                        &input.category_id,
                        input.description,
                        input.amount,
                        input.currency,
                        input.exchange_rate,
                        input.vendor_ref,
                        &actor_inner,
                        now,
                    )?;
                    *expense_slot = expense.expense_id.clone();
                    rec.expenses.push(expense);
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(afe = %afe_id, expense = %expense_id, actor = %actor, "expense recorded");
        Ok((record, expense_id))
    }

    /// Approve a pending expense, rolling it into its category actuals
    pub async fn approve_expense(
        &self,
        afe_id: &AfeId,
        expense_id: &str,
        approver: &UserId,
    ) -> ExecutorResult<AfeRecord> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let approver_inner = approver.clone();
        let expense_inner = expense_id.to_string();
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let AfeRecord {
                        afe,
                        categories,
                        expenses,
                        ..
                    } = rec;
                    engine.approve_expense(
                        afe,
                        categories,
                        expenses,
                        &expense_inner,
                        &approver_inner,
                        now,
                    )
                }),
            )
            .await?;
        tracing::info!(afe = %afe_id, expense = expense_id, approver = %approver, "expense approved");
        Ok(record)
    }

    /// Close an AFE against its final cost
    pub async fn close_afe(
        &self,
        afe_id: &AfeId,
        final_cost: Decimal,
        actor: &UserId,
    ) -> ExecutorResult<AfeRecord> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let actor_inner = actor.clone();
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| engine.close(&mut rec.afe, final_cost, &actor_inner, now)),
            )
            .await?;
        tracing::info!(
            afe = %afe_id,
            actor = %actor,
            variance = ?record.afe.variance,
            "AFE closed"
        );
        Ok(record)
    }

    /// Request a budget or scope variance; returns the new variance id
    pub async fn request_variance(
        &self,
        afe_id: &AfeId,
        request: VarianceRequest,
        actor: &UserId,
    ) -> ExecutorResult<(AfeRecord, String)> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let actor_inner = actor.clone();
        let mut variance_id = String::new();
        let variance_slot = &mut variance_id;
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let variance = engine.request_variance(
                        &rec.afe,
                        request.variance_type,
                        request.original_value,
                        request.new_value,
                        request.justification,
                        &actor_inner,
                        now,
                    )?;
                    *variance_slot = variance.variance_id.clone();
                    rec.variances.push(variance);
                    Ok(())
                }),
            )
            .await?;
        tracing::info!(afe = %afe_id, variance = %variance_id, actor = %actor, "variance requested");
        Ok((record, variance_id))
    }

    /// Approve a pending variance
    pub async fn approve_variance(
        &self,
        afe_id: &AfeId,
        variance_id: &str,
        approver: &UserId,
    ) -> ExecutorResult<AfeRecord> {
        self.decide_variance(afe_id, variance_id, approver, true)
            .await
    }

    /// Reject a pending variance
    pub async fn reject_variance(
        &self,
        afe_id: &AfeId,
        variance_id: &str,
        approver: &UserId,
    ) -> ExecutorResult<AfeRecord> {
        self.decide_variance(afe_id, variance_id, approver, false)
            .await
    }

    async fn decide_variance(
        &self,
        afe_id: &AfeId,
        variance_id: &str,
        approver: &UserId,
        approve: bool,
    ) -> ExecutorResult<AfeRecord> {
        let engine = &self.afe_engine;
        let now = Utc::now();
        let approver_inner = approver.clone();
        let variance_inner = variance_id.to_string();
        let record = self
            .afes
            .mutate(
                afe_id,
                Box::new(move |rec| {
                    let variance = rec
                        .variance_mut(&variance_inner)
                        .ok_or_else(|| JiaError::not_found("AfeVariance", &variance_inner))?;
                    if approve {
                        engine.approve_variance(variance, &approver_inner, now)
                    } else {
                        engine.reject_variance(variance, &approver_inner, now)
                    }
                }),
            )
            .await?;
        tracing::info!(
            afe = %afe_id,
            variance = variance_id,
            approver = %approver,
            approved = approve,
            "variance decided"
        );
        Ok(record)
    }

    // ============================================================
    // Billing operations
    // ============================================================

    /// Build a draft billing cycle; the deck comes from the party registry
    pub async fn create_cycle(
        &self,
        draft: CycleDraft,
        actor: &UserId,
    ) -> ExecutorResult<BillingRecord> {
        let parties = self.registry.working_parties(&draft.contract_ref).await?;
        let now = Utc::now();
        let (cycle, line_items, shares) = self.jib_engine.build_cycle(
            draft.jib_id,
            draft.code,
            draft.contract_ref,
            draft.billing_period,
            draft.currency,
            draft.due_date,
            draft.line_items,
            &parties,
            now,
        )?;
        let record = self
            .billing
            .create(BillingRecord::new(cycle, line_items, shares))
            .await?;
        tracing::info!(
            jib = %record.cycle.jib_id,
            actor = %actor,
            total = %record.cycle.total_costs,
            "billing cycle drafted"
        );
        Ok(record)
    }

    /// Send a draft cycle to the partners
    pub async fn send_cycle(&self, jib_id: &JibId, actor: &UserId) -> ExecutorResult<BillingRecord> {
        let engine = &self.jib_engine;
        let now = Utc::now();
        let record = self
            .billing
            .mutate(
                jib_id,
                Box::new(move |rec| engine.send(&mut rec.cycle, now)),
            )
            .await?;
        tracing::info!(jib = %jib_id, actor = %actor, "billing cycle sent");
        Ok(record)
    }

    /// Attach an invoice reference to a partner share
    pub async fn invoice_share(
        &self,
        jib_id: &JibId,
        share_id: &str,
        invoice_ref: String,
        actor: &UserId,
    ) -> ExecutorResult<BillingRecord> {
        let engine = &self.jib_engine;
        let share_inner = share_id.to_string();
        let record = self
            .billing
            .mutate(
                jib_id,
                Box::new(move |rec| {
                    let BillingRecord { cycle, shares, .. } = rec;
                    let share = shares
                        .iter_mut()
                        .find(|s| s.share_id == share_inner)
                        .ok_or_else(|| JiaError::not_found("PartnerShare", &share_inner))?;
                    engine.mark_invoiced(cycle, share, invoice_ref)
                }),
            )
            .await?;
        tracing::info!(jib = %jib_id, share = share_id, actor = %actor, "share invoiced");
        Ok(record)
    }

    /// Record a partner's payment; must settle the share exactly
    pub async fn record_payment(
        &self,
        jib_id: &JibId,
        share_id: &str,
        amount: Decimal,
        reference: Option<String>,
        actor: &UserId,
    ) -> ExecutorResult<BillingRecord> {
        let engine = &self.jib_engine;
        let now = Utc::now();
        let share_inner = share_id.to_string();
        let record = self
            .billing
            .mutate(
                jib_id,
                Box::new(move |rec| {
                    let BillingRecord { cycle, shares, .. } = rec;
                    let share = shares
                        .iter_mut()
                        .find(|s| s.share_id == share_inner)
                        .ok_or_else(|| JiaError::not_found("PartnerShare", &share_inner))?;
                    engine.record_payment(cycle, share, amount, reference, now)
                }),
            )
            .await?;
        tracing::info!(
            jib = %jib_id,
            share = share_id,
            amount = %amount,
            actor = %actor,
            "payment recorded"
        );
        Ok(record)
    }

    /// Open a dispute on a partner share
    pub async fn open_dispute(
        &self,
        jib_id: &JibId,
        share_id: &str,
        reason: String,
        actor: &UserId,
    ) -> ExecutorResult<BillingRecord> {
        let engine = &self.jib_engine;
        let now = Utc::now();
        let share_inner = share_id.to_string();
        let record = self
            .billing
            .mutate(
                jib_id,
                Box::new(move |rec| {
                    let share = rec
                        .share_mut(&share_inner)
                        .ok_or_else(|| JiaError::not_found("PartnerShare", &share_inner))?;
                    engine.open_dispute(share, reason, now)
                }),
            )
            .await?;
        tracing::info!(jib = %jib_id, share = share_id, actor = %actor, "dispute opened");
        Ok(record)
    }

    /// Resolve a disputed share back to Pending or straight to Paid
    pub async fn resolve_dispute(
        &self,
        jib_id: &JibId,
        share_id: &str,
        new_status: ShareStatus,
        actor: &UserId,
    ) -> ExecutorResult<BillingRecord> {
        let engine = &self.jib_engine;
        let now = Utc::now();
        let share_inner = share_id.to_string();
        let record = self
            .billing
            .mutate(
                jib_id,
                Box::new(move |rec| {
                    let share = rec
                        .share_mut(&share_inner)
                        .ok_or_else(|| JiaError::not_found("PartnerShare", &share_inner))?;
                    engine.resolve_dispute(share, new_status, now)
                }),
            )
            .await?;
        tracing::info!(
            jib = %jib_id,
            share = share_id,
            status = %new_status,
            actor = %actor,
            "dispute resolved"
        );
        Ok(record)
    }

    /// Move the cycle to an explicitly requested status, gated on its shares
    pub async fn set_cycle_status(
        &self,
        jib_id: &JibId,
        requested: jia_core::types::BillingStatus,
        actor: &UserId,
    ) -> ExecutorResult<BillingRecord> {
        let engine = &self.jib_engine;
        let record = self
            .billing
            .mutate(
                jib_id,
                Box::new(move |rec| {
                    let BillingRecord { cycle, shares, .. } = rec;
                    engine.set_status(cycle, shares, requested)
                }),
            )
            .await?;
        tracing::info!(jib = %jib_id, status = %requested, actor = %actor, "cycle status set");
        Ok(record)
    }

    // ============================================================
    // Cash call operations
    // ============================================================

    /// Build a draft cash call; the deck comes from the party registry
    pub async fn create_cash_call(
        &self,
        draft: CashCallDraft,
        actor: &UserId,
    ) -> ExecutorResult<CashCallRecord> {
        let parties = self.registry.working_parties(&draft.contract_ref).await?;
        let now = Utc::now();
        let (call, responses) = self.call_engine.build_call(
            draft.call_id,
            draft.code,
            draft.contract_ref,
            draft.purpose,
            draft.afe_ref,
            draft.total_amount,
            draft.currency,
            draft.call_date,
            draft.due_date,
            &parties,
            now,
        )?;
        let record = self
            .funding
            .create(CashCallRecord::new(call, responses))
            .await?;
        tracing::info!(
            call = %record.call.call_id,
            actor = %actor,
            total = %record.call.total_amount,
            "cash call drafted"
        );
        Ok(record)
    }

    /// Send a draft cash call to the partners
    pub async fn send_cash_call(
        &self,
        call_id: &CashCallId,
        actor: &UserId,
    ) -> ExecutorResult<CashCallRecord> {
        let engine = &self.call_engine;
        let record = self
            .funding
            .mutate(call_id, Box::new(move |rec| engine.send(&mut rec.call)))
            .await?;
        tracing::info!(call = %call_id, actor = %actor, "cash call sent");
        Ok(record)
    }

    /// Record a party's funding against its response
    #[allow(clippy::too_many_arguments)]
    pub async fn record_funding(
        &self,
        call_id: &CashCallId,
        response_id: &str,
        amount: Decimal,
        funded_date: NaiveDate,
        payment_reference: Option<String>,
        bank_reference: Option<String>,
        actor: &UserId,
    ) -> ExecutorResult<CashCallRecord> {
        let engine = &self.call_engine;
        let response_inner = response_id.to_string();
        let record = self
            .funding
            .mutate(
                call_id,
                Box::new(move |rec| {
                    let CashCallRecord { call, responses } = rec;
                    engine.record_funding(
                        call,
                        responses,
                        &response_inner,
                        amount,
                        funded_date,
                        payment_reference,
                        bank_reference,
                    )
                }),
            )
            .await?;
        tracing::info!(
            call = %call_id,
            response = response_id,
            amount = %amount,
            status = %record.call.status,
            actor = %actor,
            "funding recorded"
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::StaticPartyRegistry;
    use jia_core::types::{
        AfeStatus, BillingStatus, CashCallStatus, PartyId, ResponseStatus, WorkingParty,
    };

    fn dec(value: i64, scale: u32) -> Decimal {
        Decimal::new(value, scale)
    }

    fn deck() -> Vec<WorkingParty> {
        vec![
            WorkingParty {
                party_id: PartyId::new("party:operator"),
                name: "Permian Operating LLC".to_string(),
                working_interest: dec(60, 0),
                is_operator: true,
            },
            WorkingParty {
                party_id: PartyId::new("party:basin"),
                name: "Basin Partners LP".to_string(),
                working_interest: dec(40, 0),
                is_operator: false,
            },
        ]
    }

    async fn executor_with_deck(contract: &ContractId) -> JiaExecutor {
        let registry = StaticPartyRegistry::new();
        registry.register(contract.clone(), deck()).await;
        JiaExecutor::in_memory(Arc::new(registry))
    }

    fn afe_draft(contract: &ContractId) -> AfeDraft {
        AfeDraft {
            afe_id: AfeId::new("afe:exec-1"),
            code: "AFE-2024-014".to_string(),
            title: "Workover, well 14".to_string(),
            afe_type: AfeType::Workover,
            contract_ref: contract.clone(),
            estimated_cost: dec(85_000_00, 2),
            currency: "USD".to_string(),
            required_approval_level: 2,
            justification: "Tubing replacement".to_string(),
            priority: AfePriority::High,
            categories: vec![
                CategoryEstimate {
                    code: "RIG".to_string(),
                    description: "Rig time".to_string(),
                    estimated_amount: dec(60_000_00, 2),
                },
                CategoryEstimate {
                    code: "TUB".to_string(),
                    description: "Tubulars".to_string(),
                    estimated_amount: dec(25_000_00, 2),
                },
            ],
        }
    }

    #[tokio::test]
    async fn afe_lifecycle_draft_to_closed() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:ops-eng");
        let afe_id = AfeId::new("afe:exec-1");

        let record = executor.create_afe(afe_draft(&contract), &actor).await.unwrap();
        assert_eq!(record.afe.status, AfeStatus::Draft);
        assert_eq!(record.categories.len(), 2);

        let record = executor.submit_afe(&afe_id, &actor).await.unwrap();
        assert_eq!(record.afe.status, AfeStatus::Pending);
        assert_eq!(record.approvals.len(), 2);

        let approver = UserId::new("user:ops-mgr");
        let record = executor
            .approve_afe_level(&afe_id, 1, &approver, None)
            .await
            .unwrap();
        assert_eq!(record.afe.status, AfeStatus::Pending);

        let vp = UserId::new("user:vp-ops");
        let record = executor
            .approve_afe_level(&afe_id, 2, &vp, Some("within budget".to_string()))
            .await
            .unwrap();
        assert_eq!(record.afe.status, AfeStatus::Approved);

        let category_id = record.categories[0].category_id.clone();
        let (record, expense_id) = executor
            .record_expense(
                &afe_id,
                ExpenseInput {
                    category_id,
                    description: "Rig day rate".to_string(),
                    amount: dec(40_000_00, 2),
                    currency: "USD".to_string(),
                    exchange_rate: Decimal::ONE,
                    vendor_ref: Some("vendor:rig-co".to_string()),
                },
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(record.expenses.len(), 1);

        let record = executor
            .approve_expense(&afe_id, &expense_id, &approver)
            .await
            .unwrap();
        assert_eq!(record.afe.status, AfeStatus::InProgress);
        assert_eq!(record.categories[0].actual_amount, dec(40_000_00, 2));

        let record = executor
            .close_afe(&afe_id, dec(82_500_00, 2), &approver)
            .await
            .unwrap();
        assert_eq!(record.afe.status, AfeStatus::Closed);
        assert_eq!(record.afe.variance, Some(dec(-2_500_00, 2)));
        assert_eq!(record.afe.variance_percentage, Some(dec(-294, 2)));
    }

    #[tokio::test]
    async fn out_of_order_approval_is_rejected() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:ops-eng");
        let afe_id = AfeId::new("afe:exec-1");

        executor.create_afe(afe_draft(&contract), &actor).await.unwrap();
        executor.submit_afe(&afe_id, &actor).await.unwrap();

        let err = executor
            .approve_afe_level(&afe_id, 2, &UserId::new("user:vp-ops"), None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Domain(JiaError::OutOfOrderApproval { expected: 1, got: 2 })
        ));
    }

    #[tokio::test]
    async fn variance_approval_does_not_touch_estimate() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:ops-eng");
        let afe_id = AfeId::new("afe:exec-1");

        executor.create_afe(afe_draft(&contract), &actor).await.unwrap();
        executor.submit_afe(&afe_id, &actor).await.unwrap();
        executor
            .approve_afe_level(&afe_id, 1, &UserId::new("user:ops-mgr"), None)
            .await
            .unwrap();
        executor
            .approve_afe_level(&afe_id, 2, &UserId::new("user:vp-ops"), None)
            .await
            .unwrap();

        let (_, variance_id) = executor
            .request_variance(
                &afe_id,
                VarianceRequest {
                    variance_type: VarianceType::Cost,
                    original_value: dec(85_000_00, 2),
                    new_value: dec(95_000_00, 2),
                    justification: "Extra rig days".to_string(),
                },
                &actor,
            )
            .await
            .unwrap();

        let record = executor
            .approve_variance(&afe_id, &variance_id, &UserId::new("user:vp-ops"))
            .await
            .unwrap();
        assert_eq!(record.afe.estimated_cost, dec(85_000_00, 2));
        assert_eq!(record.variances[0].amount, dec(10_000_00, 2));
    }

    #[tokio::test]
    async fn concurrent_same_level_approvals_admit_exactly_one() {
        let contract = ContractId::new("contract:perm-12");
        let executor = Arc::new(executor_with_deck(&contract).await);
        let actor = UserId::new("user:ops-eng");
        let afe_id = AfeId::new("afe:exec-1");

        executor.create_afe(afe_draft(&contract), &actor).await.unwrap();
        executor.submit_afe(&afe_id, &actor).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..2 {
            let executor = Arc::clone(&executor);
            let afe_id = afe_id.clone();
            handles.push(tokio::spawn(async move {
                let approver = UserId::new(format!("user:mgr-{n}"));
                executor.approve_afe_level(&afe_id, 1, &approver, None).await
            }));
        }

        let mut ok = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                ok += 1;
            }
        }
        assert_eq!(ok, 1);

        let record = executor.afes().get_required(&afe_id).await.unwrap();
        assert_eq!(record.afe.current_approval_level, 1);
    }

    fn cycle_draft(contract: &ContractId) -> CycleDraft {
        CycleDraft {
            jib_id: JibId::new("jib:2024-06"),
            code: "JIB-2024-06".to_string(),
            contract_ref: contract.clone(),
            billing_period: BillingPeriod {
                month: 6,
                year: 2024,
            },
            currency: "USD".to_string(),
            due_date: NaiveDate::from_ymd_opt(2024, 7, 30),
            line_items: vec![
                LineItemInput {
                    cost_category: "LOE".to_string(),
                    description: "Lease operating".to_string(),
                    amount: dec(90_000_00, 2),
                    quantity: Decimal::ONE,
                    unit_price: dec(90_000_00, 2),
                    afe_ref: None,
                    vendor: None,
                    invoice_number: None,
                    invoice_date: None,
                },
                LineItemInput {
                    cost_category: "TRK".to_string(),
                    description: "Water hauling".to_string(),
                    amount: dec(60_000_00, 2),
                    quantity: dec(120, 0),
                    unit_price: dec(500_00, 2),
                    afe_ref: None,
                    vendor: Some("vendor:haulers".to_string()),
                    invoice_number: Some("INV-7781".to_string()),
                    invoice_date: NaiveDate::from_ymd_opt(2024, 6, 28),
                },
            ],
        }
    }

    #[tokio::test]
    async fn billing_cycle_through_payment_to_paid() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:jib-clerk");
        let jib_id = JibId::new("jib:2024-06");

        let record = executor.create_cycle(cycle_draft(&contract), &actor).await.unwrap();
        assert_eq!(record.cycle.total_costs, dec(150_000_00, 2));
        assert_eq!(record.cycle.operator_share, dec(90_000_00, 2));
        assert_eq!(record.cycle.partners_share, dec(60_000_00, 2));
        assert_eq!(record.share_total(), record.cycle.total_costs);

        executor.send_cycle(&jib_id, &actor).await.unwrap();

        let shares: Vec<(String, Decimal)> = record
            .shares
            .iter()
            .map(|s| (s.share_id.clone(), s.share_amount))
            .collect();
        for (share_id, amount) in &shares {
            executor
                .invoice_share(&jib_id, share_id, format!("INV-{share_id}"), &actor)
                .await
                .unwrap();
            executor
                .record_payment(&jib_id, share_id, *amount, None, &actor)
                .await
                .unwrap();
        }

        let record = executor
            .set_cycle_status(&jib_id, BillingStatus::Paid, &actor)
            .await
            .unwrap();
        assert_eq!(record.cycle.status, BillingStatus::Paid);
    }

    #[tokio::test]
    async fn payment_mismatch_is_rejected() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:jib-clerk");
        let jib_id = JibId::new("jib:2024-06");

        let record = executor.create_cycle(cycle_draft(&contract), &actor).await.unwrap();
        executor.send_cycle(&jib_id, &actor).await.unwrap();

        let share = &record.shares[0];
        let err = executor
            .record_payment(
                &jib_id,
                &share.share_id,
                share.share_amount - dec(1, 2),
                None,
                &actor,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Domain(JiaError::PaymentMismatch { .. })
        ));
    }

    #[tokio::test]
    async fn dispute_and_resolution_round_trip() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:jib-clerk");
        let jib_id = JibId::new("jib:2024-06");

        let record = executor.create_cycle(cycle_draft(&contract), &actor).await.unwrap();
        executor.send_cycle(&jib_id, &actor).await.unwrap();

        let share_id = record.shares[1].share_id.clone();
        executor
            .open_dispute(&jib_id, &share_id, "Duplicate hauling charge".to_string(), &actor)
            .await
            .unwrap();

        let record = executor
            .set_cycle_status(&jib_id, BillingStatus::Disputed, &actor)
            .await
            .unwrap();
        assert_eq!(record.cycle.status, BillingStatus::Disputed);

        let record = executor
            .resolve_dispute(&jib_id, &share_id, ShareStatus::Pending, &actor)
            .await
            .unwrap();
        assert_eq!(record.shares[1].status, ShareStatus::Pending);
        assert!(record.shares[1].dispute_reason.is_some());
    }

    #[tokio::test]
    async fn cash_call_partial_then_full_funding() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:treasury");
        let call_id = CashCallId::new("call:2024-07");

        let record = executor
            .create_cash_call(
                CashCallDraft {
                    call_id: call_id.clone(),
                    code: "CC-2024-07".to_string(),
                    contract_ref: contract.clone(),
                    purpose: "Frac spread mobilization".to_string(),
                    afe_ref: Some(AfeId::new("afe:exec-1")),
                    total_amount: dec(200_000_00, 2),
                    currency: "USD".to_string(),
                    call_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                    due_date: NaiveDate::from_ymd_opt(2024, 7, 15),
                },
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(record.call.status, CashCallStatus::Draft);
        assert_eq!(record.responses.len(), 2);

        executor.send_cash_call(&call_id, &actor).await.unwrap();

        let operator_response = record
            .responses
            .iter()
            .find(|r| r.requested_amount == dec(120_000_00, 2))
            .unwrap();
        let partner_response = record
            .responses
            .iter()
            .find(|r| r.requested_amount == dec(80_000_00, 2))
            .unwrap();

        let record = executor
            .record_funding(
                &call_id,
                &partner_response.response_id,
                dec(50_000_00, 2),
                NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
                Some("WIRE-1".to_string()),
                None,
                &actor,
            )
            .await
            .unwrap();
        assert_eq!(record.call.status, CashCallStatus::PartiallyFunded);
        assert_eq!(record.call.funded_amount, dec(50_000_00, 2));

        let record = executor
            .record_funding(
                &call_id,
                &operator_response.response_id,
                dec(120_000_00, 2),
                NaiveDate::from_ymd_opt(2024, 7, 11).unwrap(),
                Some("WIRE-2".to_string()),
                None,
                &actor,
            )
            .await
            .unwrap();
        // Partner response stays Partial, so the call never reaches Funded
        assert_eq!(record.call.status, CashCallStatus::PartiallyFunded);
        assert_eq!(record.call.funded_amount, dec(170_000_00, 2));
        assert_eq!(record.funded_total(), record.call.funded_amount);
        assert_eq!(
            record
                .responses
                .iter()
                .find(|r| r.response_id == partner_response.response_id)
                .unwrap()
                .status,
            ResponseStatus::Partial
        );
    }

    #[tokio::test]
    async fn overfunding_is_rejected() {
        let contract = ContractId::new("contract:perm-12");
        let executor = executor_with_deck(&contract).await;
        let actor = UserId::new("user:treasury");
        let call_id = CashCallId::new("call:2024-07");

        let record = executor
            .create_cash_call(
                CashCallDraft {
                    call_id: call_id.clone(),
                    code: "CC-2024-07".to_string(),
                    contract_ref: contract.clone(),
                    purpose: "Frac spread mobilization".to_string(),
                    afe_ref: None,
                    total_amount: dec(100_000_00, 2),
                    currency: "USD".to_string(),
                    call_date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
                    due_date: None,
                },
                &actor,
            )
            .await
            .unwrap();
        executor.send_cash_call(&call_id, &actor).await.unwrap();

        let response = &record.responses[0];
        let err = executor
            .record_funding(
                &call_id,
                &response.response_id,
                response.requested_amount + dec(1, 2),
                NaiveDate::from_ymd_opt(2024, 7, 10).unwrap(),
                None,
                None,
                &actor,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExecutorError::Domain(JiaError::Overfunding { .. })
        ));
    }
}
