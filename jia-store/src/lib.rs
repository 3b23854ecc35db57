//! JIA Store - Joint Interest Accounting Storage
//!
//! Persistence layer for the three accounting aggregates (AFE, billing
//! cycle, cash call). Each aggregate is stored as one record holding the
//! root and all of its child rows, so a single [`repos`] `mutate` call is
//! a transaction over the whole aggregate: read, validate, write under one
//! lock. Two concurrent mutations of the same aggregate serialize, and the
//! loser observes the winner's state.
//!
//! The repository traits are the seam a database backend would implement;
//! the in-memory implementation shipped here backs tests and single-node
//! deployments.

pub mod entities;
pub mod error;
pub mod repos;

pub use entities::{AfeRecord, BillingRecord, CashCallRecord};
pub use error::{StoreError, StoreResult};
pub use repos::{
    AfeRepository, BillingRepository, FundingRepository, MemoryAfeStore, MemoryBillingStore,
    MemoryFundingStore, Mutation,
};
