//! In-Memory Repositories
//!
//! Aggregate maps guarded by a single `RwLock` per store. `mutate` holds the
//! write lock across read, closure, and commit, so two concurrent mutations of
//! the same aggregate serialize and the loser sees the winner's state. The
//! closure runs against a cloned draft and the draft only replaces the stored
//! record when the closure returns `Ok`, so a failed mutation leaves no
//! partially applied state behind.

use super::{AfeRepository, BillingRepository, FundingRepository, Mutation};
use crate::entities::{AfeRecord, BillingRecord, CashCallRecord};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use jia_core::types::{
    AfeId, AfeStatus, BillingStatus, CashCallId, CashCallStatus, ContractId, JibId,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-memory AFE store
#[derive(Default)]
pub struct MemoryAfeStore {
    items: RwLock<HashMap<String, AfeRecord>>,
}

impl MemoryAfeStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AfeRepository for MemoryAfeStore {
    async fn create(&self, record: AfeRecord) -> StoreResult<AfeRecord> {
        let key = record.afe.afe_id.as_str().to_string();
        let mut guard = self.items.write().await;
        if guard.contains_key(&key) {
            return Err(StoreError::duplicate("Afe", &key));
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    async fn get(&self, afe_id: &AfeId) -> StoreResult<Option<AfeRecord>> {
        let guard = self.items.read().await;
        Ok(guard.get(afe_id.as_str()).cloned())
    }

    async fn list_by_status(&self, status: AfeStatus) -> StoreResult<Vec<AfeRecord>> {
        let guard = self.items.read().await;
        Ok(guard
            .values()
            .filter(|r| r.afe.status == status)
            .cloned()
            .collect())
    }

    async fn list_for_contract(&self, contract: &ContractId) -> StoreResult<Vec<AfeRecord>> {
        let guard = self.items.read().await;
        Ok(guard
            .values()
            .filter(|r| r.afe.contract_ref == *contract)
            .cloned()
            .collect())
    }

    async fn mutate<'a>(
        &self,
        afe_id: &AfeId,
        mutation: Mutation<'a, AfeRecord>,
    ) -> StoreResult<AfeRecord> {
        let mut guard = self.items.write().await;
        let current = guard
            .get_mut(afe_id.as_str())
            .ok_or_else(|| StoreError::not_found("Afe", afe_id.as_str()))?;
        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();
        Ok(draft)
    }
}

/// In-memory billing cycle store
#[derive(Default)]
pub struct MemoryBillingStore {
    items: RwLock<HashMap<String, BillingRecord>>,
}

impl MemoryBillingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BillingRepository for MemoryBillingStore {
    async fn create(&self, record: BillingRecord) -> StoreResult<BillingRecord> {
        let key = record.cycle.jib_id.as_str().to_string();
        let mut guard = self.items.write().await;
        if guard.contains_key(&key) {
            return Err(StoreError::duplicate("BillingCycle", &key));
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    async fn get(&self, jib_id: &JibId) -> StoreResult<Option<BillingRecord>> {
        let guard = self.items.read().await;
        Ok(guard.get(jib_id.as_str()).cloned())
    }

    async fn list_by_status(&self, status: BillingStatus) -> StoreResult<Vec<BillingRecord>> {
        let guard = self.items.read().await;
        Ok(guard
            .values()
            .filter(|r| r.cycle.status == status)
            .cloned()
            .collect())
    }

    async fn list_for_contract(&self, contract: &ContractId) -> StoreResult<Vec<BillingRecord>> {
        let guard = self.items.read().await;
        Ok(guard
            .values()
            .filter(|r| r.cycle.contract_ref == *contract)
            .cloned()
            .collect())
    }

    async fn mutate<'a>(
        &self,
        jib_id: &JibId,
        mutation: Mutation<'a, BillingRecord>,
    ) -> StoreResult<BillingRecord> {
        let mut guard = self.items.write().await;
        let current = guard
            .get_mut(jib_id.as_str())
            .ok_or_else(|| StoreError::not_found("BillingCycle", jib_id.as_str()))?;
        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();
        Ok(draft)
    }
}

/// In-memory cash call store
#[derive(Default)]
pub struct MemoryFundingStore {
    items: RwLock<HashMap<String, CashCallRecord>>,
}

impl MemoryFundingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FundingRepository for MemoryFundingStore {
    async fn create(&self, record: CashCallRecord) -> StoreResult<CashCallRecord> {
        let key = record.call.call_id.as_str().to_string();
        let mut guard = self.items.write().await;
        if guard.contains_key(&key) {
            return Err(StoreError::duplicate("CashCall", &key));
        }
        guard.insert(key, record.clone());
        Ok(record)
    }

    async fn get(&self, call_id: &CashCallId) -> StoreResult<Option<CashCallRecord>> {
        let guard = self.items.read().await;
        Ok(guard.get(call_id.as_str()).cloned())
    }

    async fn list_by_status(&self, status: CashCallStatus) -> StoreResult<Vec<CashCallRecord>> {
        let guard = self.items.read().await;
        Ok(guard
            .values()
            .filter(|r| r.call.status == status)
            .cloned()
            .collect())
    }

    async fn list_for_contract(&self, contract: &ContractId) -> StoreResult<Vec<CashCallRecord>> {
        let guard = self.items.read().await;
        Ok(guard
            .values()
            .filter(|r| r.call.contract_ref == *contract)
            .cloned()
            .collect())
    }

    async fn mutate<'a>(
        &self,
        call_id: &CashCallId,
        mutation: Mutation<'a, CashCallRecord>,
    ) -> StoreResult<CashCallRecord> {
        let mut guard = self.items.write().await;
        let current = guard
            .get_mut(call_id.as_str())
            .ok_or_else(|| StoreError::not_found("CashCall", call_id.as_str()))?;
        let mut draft = current.clone();
        mutation(&mut draft)?;
        *current = draft.clone();
        Ok(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use jia_core::approval::{self, ApprovalRecord};
    use jia_core::types::{Afe, AfeType, UserId};
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn submitted_record() -> AfeRecord {
        let mut afe = Afe::new(
            AfeId::new("afe:mem"),
            "AFE-2024-001",
            "Infill drilling",
            AfeType::Drilling,
            ContractId::new("contract:perm-12"),
            Decimal::new(500_000_00, 2),
            "USD",
            2,
            UserId::new("user:ops"),
            Utc::now(),
        );
        let approvals = approval::submit(&mut afe, Utc::now()).unwrap();
        AfeRecord {
            afe,
            categories: Vec::new(),
            approvals,
            expenses: Vec::new(),
            variances: Vec::new(),
        }
    }

    #[tokio::test]
    async fn create_rejects_duplicate_id() {
        let store = MemoryAfeStore::new();
        let record = submitted_record();
        store.create(record.clone()).await.unwrap();
        let err = store.create(record).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
    }

    #[tokio::test]
    async fn failed_mutation_leaves_record_untouched() {
        let store = MemoryAfeStore::new();
        let record = submitted_record();
        let afe_id = record.afe.afe_id.clone();
        store.create(record).await.unwrap();

        let result = store
            .mutate(
                &afe_id,
                Box::new(|draft| {
                    draft.afe.current_approval_level = 99;
                    Err(jia_core::JiaError::invalid_state("approve", "draft"))
                }),
            )
            .await;
        assert!(result.is_err());

        let stored = store.get_required(&afe_id).await.unwrap();
        assert_eq!(stored.afe.current_approval_level, 0);
    }

    #[tokio::test]
    async fn mutate_missing_aggregate_is_not_found() {
        let store = MemoryAfeStore::new();
        let err = store
            .mutate(&AfeId::new("afe:none"), Box::new(|_| Ok(())))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_same_level_approvals_admit_exactly_one() {
        let store = Arc::new(MemoryAfeStore::new());
        let record = submitted_record();
        let afe_id = record.afe.afe_id.clone();
        store.create(record).await.unwrap();

        let mut handles = Vec::new();
        for n in 0..2 {
            let store = Arc::clone(&store);
            let afe_id = afe_id.clone();
            handles.push(tokio::spawn(async move {
                let approver = UserId::new(format!("user:mgr-{n}"));
                store
                    .mutate(
                        &afe_id,
                        Box::new(move |draft| {
                            let AfeRecord { afe, approvals, .. } = draft;
                            approval::approve_level(
                                afe,
                                approvals.as_mut_slice(),
                                1,
                                &approver,
                                None,
                                Utc::now(),
                            )
                        }),
                    )
                    .await
            }));
        }

        let mut ok = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => ok += 1,
                Err(StoreError::Domain(jia_core::JiaError::AlreadyApproved { level: 1 })) => {
                    conflicts += 1
                }
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(ok, 1);
        assert_eq!(conflicts, 1);

        let stored = store.get_required(&afe_id).await.unwrap();
        assert_eq!(stored.afe.current_approval_level, 1);
        let decided: Vec<&ApprovalRecord> = stored
            .approvals
            .iter()
            .filter(|a| a.decided_at.is_some())
            .collect();
        assert_eq!(decided.len(), 1);
    }
}
