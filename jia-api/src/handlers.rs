//! API Handlers
//!
//! HTTP handler implementations for the JIA API endpoints. Each mutating
//! handler resolves the acting user, calls the matching executor
//! operation, and returns the committed aggregate record.

use axum::{
    extract::{Path, State},
    Json,
};
use jia_core::types::{row_id, AfeId, BillingPeriod, CashCallId, ContractId, JibId, UserId};
use jia_executor::{
    AfeDraft, CashCallDraft, CategoryEstimate, CycleDraft, ExecutorError, ExpenseInput,
    VarianceRequest,
};
use jia_store::{AfeRecord, BillingRecord, CashCallRecord};
use std::sync::Arc;

use crate::dto::*;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Health check handler
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.config.version.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Resolve the acting user from the request, falling back to the identity provider
async fn resolve_actor(state: &AppState, actor: Option<String>) -> ApiResult<UserId> {
    match actor {
        Some(id) if !id.is_empty() => Ok(UserId::new(id)),
        _ => Ok(state.identity.current_user().await?),
    }
}

// ============================================
// AFE handlers
// ============================================

/// Draft a new AFE
pub async fn create_afe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateAfeRequest>,
) -> ApiResult<Json<AfeRecord>> {
    if request.categories.is_empty() {
        return Err(ApiError::validation("at least one category is required"));
    }
    let actor = resolve_actor(&state, request.actor).await?;
    let afe_id = request
        .afe_id
        .map(AfeId::new)
        .unwrap_or_else(|| AfeId::new(format!("afe:{}", row_id())));

    let draft = AfeDraft {
        afe_id,
        code: request.code,
        title: request.title,
        afe_type: request.afe_type,
        contract_ref: ContractId::new(request.contract_ref),
        estimated_cost: request.estimated_cost,
        currency: request.currency,
        required_approval_level: request.required_approval_level,
        justification: request.justification,
        priority: request.priority,
        categories: request
            .categories
            .into_iter()
            .map(|c| CategoryEstimate {
                code: c.code,
                description: c.description,
                estimated_amount: c.estimated_amount,
            })
            .collect(),
    };

    let record = state.executor.create_afe(draft, &actor).await?;
    Ok(Json(record))
}

/// Fetch an AFE aggregate
pub async fn get_afe(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
) -> ApiResult<Json<AfeRecord>> {
    let record = state
        .executor
        .afes()
        .get_required(&AfeId::new(afe_id))
        .await
        .map_err(ExecutorError::from)?;
    Ok(Json(record))
}

/// Submit a draft AFE for approval
pub async fn submit_afe(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .submit_afe(&AfeId::new(afe_id), &actor)
        .await?;
    Ok(Json(record))
}

/// Approve one level of an AFE's chain
pub async fn approve_afe_level(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
    Json(request): Json<ApprovalLevelRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .approve_afe_level(&AfeId::new(afe_id), request.level, &actor, request.comments)
        .await?;
    Ok(Json(record))
}

/// Reject one level of an AFE's chain
pub async fn reject_afe_level(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
    Json(request): Json<ApprovalLevelRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .reject_afe_level(&AfeId::new(afe_id), request.level, &actor, request.comments)
        .await?;
    Ok(Json(record))
}

/// Record a field expense
pub async fn record_expense(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
    Json(request): Json<RecordExpenseRequest>,
) -> ApiResult<Json<ExpenseCreatedResponse>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let input = ExpenseInput {
        category_id: request.category_id,
        description: request.description,
        amount: request.amount,
        currency: request.currency,
        exchange_rate: request.exchange_rate,
        vendor_ref: request.vendor_ref,
    };
    let (record, expense_id) = state
        .executor
        .record_expense(&AfeId::new(afe_id), input, &actor)
        .await?;
    Ok(Json(ExpenseCreatedResponse { expense_id, record }))
}

/// Approve a pending expense
pub async fn approve_expense(
    State(state): State<Arc<AppState>>,
    Path((afe_id, expense_id)): Path<(String, String)>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .approve_expense(&AfeId::new(afe_id), &expense_id, &actor)
        .await?;
    Ok(Json(record))
}

/// Close an AFE against its final cost
pub async fn close_afe(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
    Json(request): Json<CloseAfeRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .close_afe(&AfeId::new(afe_id), request.final_cost, &actor)
        .await?;
    Ok(Json(record))
}

/// Raise a variance against an AFE
pub async fn request_variance(
    State(state): State<Arc<AppState>>,
    Path(afe_id): Path<String>,
    Json(request): Json<RequestVarianceRequest>,
) -> ApiResult<Json<VarianceCreatedResponse>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let variance = VarianceRequest {
        variance_type: request.variance_type,
        original_value: request.original_value,
        new_value: request.new_value,
        justification: request.justification,
    };
    let (record, variance_id) = state
        .executor
        .request_variance(&AfeId::new(afe_id), variance, &actor)
        .await?;
    Ok(Json(VarianceCreatedResponse {
        variance_id,
        record,
    }))
}

/// Approve a pending variance
pub async fn approve_variance(
    State(state): State<Arc<AppState>>,
    Path((afe_id, variance_id)): Path<(String, String)>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .approve_variance(&AfeId::new(afe_id), &variance_id, &actor)
        .await?;
    Ok(Json(record))
}

/// Reject a pending variance
pub async fn reject_variance(
    State(state): State<Arc<AppState>>,
    Path((afe_id, variance_id)): Path<(String, String)>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<AfeRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .reject_variance(&AfeId::new(afe_id), &variance_id, &actor)
        .await?;
    Ok(Json(record))
}

// ============================================
// Billing handlers
// ============================================

/// Draft a billing cycle
pub async fn create_cycle(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCycleRequest>,
) -> ApiResult<Json<BillingRecord>> {
    if !(1..=12).contains(&request.month) {
        return Err(ApiError::validation(format!(
            "month must be 1..=12, got {}",
            request.month
        )));
    }
    let actor = resolve_actor(&state, request.actor).await?;
    let jib_id = request
        .jib_id
        .map(JibId::new)
        .unwrap_or_else(|| JibId::new(format!("jib:{}", row_id())));

    let draft = CycleDraft {
        jib_id,
        code: request.code,
        contract_ref: ContractId::new(request.contract_ref),
        billing_period: BillingPeriod {
            month: request.month,
            year: request.year,
        },
        currency: request.currency,
        due_date: request.due_date,
        line_items: request
            .line_items
            .into_iter()
            .map(|line| jia_core::LineItemInput {
                cost_category: line.cost_category,
                description: line.description,
                amount: line.amount,
                quantity: line.quantity,
                unit_price: line.unit_price,
                afe_ref: line.afe_ref.map(AfeId::new),
                vendor: line.vendor,
                invoice_number: line.invoice_number,
                invoice_date: line.invoice_date,
            })
            .collect(),
    };

    let record = state.executor.create_cycle(draft, &actor).await?;
    Ok(Json(record))
}

/// Fetch a billing cycle aggregate
pub async fn get_cycle(
    State(state): State<Arc<AppState>>,
    Path(jib_id): Path<String>,
) -> ApiResult<Json<BillingRecord>> {
    let record = state
        .executor
        .billing()
        .get_required(&JibId::new(jib_id))
        .await
        .map_err(ExecutorError::from)?;
    Ok(Json(record))
}

/// Send a draft cycle to the partners
pub async fn send_cycle(
    State(state): State<Arc<AppState>>,
    Path(jib_id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<BillingRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .send_cycle(&JibId::new(jib_id), &actor)
        .await?;
    Ok(Json(record))
}

/// Attach an invoice reference to a partner share
pub async fn invoice_share(
    State(state): State<Arc<AppState>>,
    Path((jib_id, share_id)): Path<(String, String)>,
    Json(request): Json<InvoiceShareRequest>,
) -> ApiResult<Json<BillingRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .invoice_share(&JibId::new(jib_id), &share_id, request.invoice_ref, &actor)
        .await?;
    Ok(Json(record))
}

/// Record a partner's payment against its share
pub async fn record_payment(
    State(state): State<Arc<AppState>>,
    Path((jib_id, share_id)): Path<(String, String)>,
    Json(request): Json<RecordPaymentRequest>,
) -> ApiResult<Json<BillingRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .record_payment(
            &JibId::new(jib_id),
            &share_id,
            request.amount,
            request.reference,
            &actor,
        )
        .await?;
    Ok(Json(record))
}

/// Open a dispute on a partner share
pub async fn open_dispute(
    State(state): State<Arc<AppState>>,
    Path((jib_id, share_id)): Path<(String, String)>,
    Json(request): Json<OpenDisputeRequest>,
) -> ApiResult<Json<BillingRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .open_dispute(&JibId::new(jib_id), &share_id, request.reason, &actor)
        .await?;
    Ok(Json(record))
}

/// Resolve a disputed share
pub async fn resolve_dispute(
    State(state): State<Arc<AppState>>,
    Path((jib_id, share_id)): Path<(String, String)>,
    Json(request): Json<ResolveDisputeRequest>,
) -> ApiResult<Json<BillingRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .resolve_dispute(&JibId::new(jib_id), &share_id, request.new_status, &actor)
        .await?;
    Ok(Json(record))
}

/// Move a cycle to an explicitly requested status
pub async fn set_cycle_status(
    State(state): State<Arc<AppState>>,
    Path(jib_id): Path<String>,
    Json(request): Json<SetCycleStatusRequest>,
) -> ApiResult<Json<BillingRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .set_cycle_status(&JibId::new(jib_id), request.status, &actor)
        .await?;
    Ok(Json(record))
}

// ============================================
// Cash call handlers
// ============================================

/// Draft a cash call
pub async fn create_cash_call(
    State(state): State<Arc<AppState>>,
    Json(request): Json<CreateCashCallRequest>,
) -> ApiResult<Json<CashCallRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let call_id = request
        .call_id
        .map(CashCallId::new)
        .unwrap_or_else(|| CashCallId::new(format!("call:{}", row_id())));

    let draft = CashCallDraft {
        call_id,
        code: request.code,
        contract_ref: ContractId::new(request.contract_ref),
        purpose: request.purpose,
        afe_ref: request.afe_ref.map(AfeId::new),
        total_amount: request.total_amount,
        currency: request.currency,
        call_date: request.call_date,
        due_date: request.due_date,
    };

    let record = state.executor.create_cash_call(draft, &actor).await?;
    Ok(Json(record))
}

/// Fetch a cash call aggregate
pub async fn get_cash_call(
    State(state): State<Arc<AppState>>,
    Path(call_id): Path<String>,
) -> ApiResult<Json<CashCallRecord>> {
    let record = state
        .executor
        .funding()
        .get_required(&CashCallId::new(call_id))
        .await
        .map_err(ExecutorError::from)?;
    Ok(Json(record))
}

/// Send a draft cash call to the partners
pub async fn send_cash_call(
    State(state): State<Arc<AppState>>,
    Path(call_id): Path<String>,
    Json(request): Json<ActorRequest>,
) -> ApiResult<Json<CashCallRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .send_cash_call(&CashCallId::new(call_id), &actor)
        .await?;
    Ok(Json(record))
}

/// Record a party's funding against its response
pub async fn record_funding(
    State(state): State<Arc<AppState>>,
    Path((call_id, response_id)): Path<(String, String)>,
    Json(request): Json<RecordFundingRequest>,
) -> ApiResult<Json<CashCallRecord>> {
    let actor = resolve_actor(&state, request.actor).await?;
    let record = state
        .executor
        .record_funding(
            &CashCallId::new(call_id),
            &response_id,
            request.amount,
            request.funded_date,
            request.payment_reference,
            request.bank_reference,
            &actor,
        )
        .await?;
    Ok(Json(record))
}
