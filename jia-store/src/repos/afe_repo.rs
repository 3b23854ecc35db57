//! AFE Repository

use super::Mutation;
use crate::entities::AfeRecord;
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use jia_core::types::{AfeId, AfeStatus, ContractId};

/// AFE aggregate repository trait
#[async_trait]
pub trait AfeRepository: Send + Sync {
    /// Create an AFE aggregate
    async fn create(&self, record: AfeRecord) -> StoreResult<AfeRecord>;

    /// Get an AFE aggregate by id
    async fn get(&self, afe_id: &AfeId) -> StoreResult<Option<AfeRecord>>;

    /// Get an AFE aggregate by id, error if not found
    async fn get_required(&self, afe_id: &AfeId) -> StoreResult<AfeRecord> {
        self.get(afe_id)
            .await?
            .ok_or_else(|| StoreError::not_found("Afe", afe_id.as_str()))
    }

    /// List AFEs by status
    async fn list_by_status(&self, status: AfeStatus) -> StoreResult<Vec<AfeRecord>>;

    /// List AFEs for a contract
    async fn list_for_contract(&self, contract: &ContractId) -> StoreResult<Vec<AfeRecord>>;

    /// Atomically read-validate-write the aggregate
    ///
    /// Returns the committed record; on a domain error nothing is written.
    async fn mutate<'a>(
        &self,
        afe_id: &AfeId,
        mutation: Mutation<'a, AfeRecord>,
    ) -> StoreResult<AfeRecord>;
}
