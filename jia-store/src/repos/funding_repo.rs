//! Cash Call Repository

use super::Mutation;
use crate::entities::CashCallRecord;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use jia_core::types::{CashCallId, CashCallStatus, ContractId};

/// Cash call aggregate repository trait
#[async_trait]
pub trait FundingRepository: Send + Sync {
    /// Create a cash call aggregate
    async fn create(&self, record: CashCallRecord) -> StoreResult<CashCallRecord>;

    /// Get a cash call aggregate by id
    async fn get(&self, call_id: &CashCallId) -> StoreResult<Option<CashCallRecord>>;

    /// Get a cash call aggregate by id, error if not found
    async fn get_required(&self, call_id: &CashCallId) -> StoreResult<CashCallRecord> {
        self.get(call_id)
            .await?
            .ok_or_else(|| StoreError::not_found("CashCall", call_id.as_str()))
    }

    /// List cash calls by status
    async fn list_by_status(&self, status: CashCallStatus) -> StoreResult<Vec<CashCallRecord>>;

    /// List cash calls for a contract
    async fn list_for_contract(&self, contract: &ContractId) -> StoreResult<Vec<CashCallRecord>>;

    /// Atomically read-validate-write the aggregate
    async fn mutate<'a>(
        &self,
        call_id: &CashCallId,
        mutation: Mutation<'a, CashCallRecord>,
    ) -> StoreResult<CashCallRecord>;
}
