//! Party Registry
//!
//! The executor does not own ownership data. Working-interest decks live
//! upstream (land or division-order systems); the registry trait is the
//! seam those systems implement. `StaticPartyRegistry` is the in-process
//! implementation used by tests and single-node deployments.

use crate::error::{ExecutorError, ExecutorResult};
use async_trait::async_trait;
use jia_core::types::{ContractId, UserId, WorkingParty};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Source of the working-interest deck for a contract
#[async_trait]
pub trait PartyRegistry: Send + Sync {
    /// The parties and working interests billed under a contract
    async fn working_parties(&self, contract: &ContractId) -> ExecutorResult<Vec<WorkingParty>>;
}

/// Source of the acting user when a request does not carry one
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn current_user(&self) -> ExecutorResult<UserId>;
}

/// In-memory registry keyed by contract id
#[derive(Default)]
pub struct StaticPartyRegistry {
    decks: RwLock<HashMap<String, Vec<WorkingParty>>>,
}

impl StaticPartyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the deck for a contract
    pub async fn register(&self, contract: ContractId, parties: Vec<WorkingParty>) {
        let mut decks = self.decks.write().await;
        decks.insert(contract.as_str().to_string(), parties);
    }
}

#[async_trait]
impl PartyRegistry for StaticPartyRegistry {
    async fn working_parties(&self, contract: &ContractId) -> ExecutorResult<Vec<WorkingParty>> {
        let decks = self.decks.read().await;
        decks
            .get(contract.as_str())
            .cloned()
            .ok_or_else(|| ExecutorError::not_found("ContractDeck", contract.as_str()))
    }
}

/// Fixed identity, for wiring where authentication happens upstream
pub struct FixedIdentity {
    user: UserId,
}

impl FixedIdentity {
    pub fn new(user: UserId) -> Self {
        Self { user }
    }
}

#[async_trait]
impl IdentityProvider for FixedIdentity {
    async fn current_user(&self) -> ExecutorResult<UserId> {
        Ok(self.user.clone())
    }
}
