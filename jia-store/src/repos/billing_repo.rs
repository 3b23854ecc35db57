//! Billing Repository

use super::Mutation;
use crate::entities::BillingRecord;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use jia_core::types::{BillingStatus, ContractId, JibId};

/// Billing cycle aggregate repository trait
#[async_trait]
pub trait BillingRepository: Send + Sync {
    /// Create a billing cycle aggregate
    async fn create(&self, record: BillingRecord) -> StoreResult<BillingRecord>;

    /// Get a billing cycle aggregate by id
    async fn get(&self, jib_id: &JibId) -> StoreResult<Option<BillingRecord>>;

    /// Get a billing cycle aggregate by id, error if not found
    async fn get_required(&self, jib_id: &JibId) -> StoreResult<BillingRecord> {
        self.get(jib_id)
            .await?
            .ok_or_else(|| StoreError::not_found("BillingCycle", jib_id.as_str()))
    }

    /// List cycles by status
    async fn list_by_status(&self, status: BillingStatus) -> StoreResult<Vec<BillingRecord>>;

    /// List cycles for a contract
    async fn list_for_contract(&self, contract: &ContractId) -> StoreResult<Vec<BillingRecord>>;

    /// Atomically read-validate-write the aggregate
    async fn mutate<'a>(
        &self,
        jib_id: &JibId,
        mutation: Mutation<'a, BillingRecord>,
    ) -> StoreResult<BillingRecord>;
}
