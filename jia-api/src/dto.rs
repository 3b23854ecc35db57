//! Data Transfer Objects
//!
//! Request DTOs for the JIA API layer. Responses serialize the aggregate
//! records from jia-store directly; the only response-side DTOs here are
//! the health body and the created-child wrappers that carry a new row id
//! back to the caller.
//!
//! Every mutating request may carry an `actor`; when absent the acting
//! user is resolved through the identity provider.

use chrono::NaiveDate;
use jia_core::types::{AfePriority, AfeType, BillingStatus, ShareStatus, VarianceType};
use jia_store::AfeRecord;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ============================================
// Health
// ============================================

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

// ============================================
// AFE DTOs
// ============================================

/// One category estimate in an AFE draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryEstimateDto {
    pub code: String,
    pub description: String,
    pub estimated_amount: Decimal,
}

/// Request to draft an AFE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAfeRequest {
    /// Client-supplied id; generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afe_id: Option<String>,
    pub code: String,
    pub title: String,
    pub afe_type: AfeType,
    pub contract_ref: String,
    pub estimated_cost: Decimal,
    pub currency: String,
    pub required_approval_level: u32,
    #[serde(default)]
    pub justification: String,
    #[serde(default)]
    pub priority: AfePriority,
    pub categories: Vec<CategoryEstimateDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request carrying only the acting user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to approve or reject one approval level
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalLevelRequest {
    pub level: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to record a field expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordExpenseRequest {
    pub category_id: String,
    pub description: String,
    pub amount: Decimal,
    pub currency: String,
    pub exchange_rate: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Response carrying the new expense id with the committed aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseCreatedResponse {
    pub expense_id: String,
    pub record: AfeRecord,
}

/// Request to close an AFE
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloseAfeRequest {
    pub final_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to raise a variance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestVarianceRequest {
    pub variance_type: VarianceType,
    pub original_value: Decimal,
    pub new_value: Decimal,
    pub justification: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Response carrying the new variance id with the committed aggregate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarianceCreatedResponse {
    pub variance_id: String,
    pub record: AfeRecord,
}

// ============================================
// Billing DTOs
// ============================================

/// One line of invoiced cost in a cycle draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItemDto {
    pub cost_category: String,
    pub description: String,
    pub amount: Decimal,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afe_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invoice_date: Option<NaiveDate>,
}

/// Request to draft a billing cycle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCycleRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jib_id: Option<String>,
    pub code: String,
    pub contract_ref: String,
    pub month: u32,
    pub year: i32,
    pub currency: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    pub line_items: Vec<LineItemDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to attach an invoice reference to a share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvoiceShareRequest {
    pub invoice_ref: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to record a partner payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordPaymentRequest {
    pub amount: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to open a dispute on a share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenDisputeRequest {
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to resolve a disputed share
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolveDisputeRequest {
    pub new_status: ShareStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to move a cycle to an explicit status
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetCycleStatusRequest {
    pub status: BillingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

// ============================================
// Cash call DTOs
// ============================================

/// Request to draft a cash call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCashCallRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub call_id: Option<String>,
    pub code: String,
    pub contract_ref: String,
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub afe_ref: Option<String>,
    pub total_amount: Decimal,
    pub currency: String,
    pub call_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}

/// Request to record a party's funding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordFundingRequest {
    pub amount: Decimal,
    pub funded_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank_reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor: Option<String>,
}
