//! JIA Store Repositories
//!
//! Data access layer for the accounting aggregates. `mutate` is the one
//! correctness-critical concurrency point: it runs read-validate-write
//! under a single lock, so a concurrent duplicate of a state transition
//! observes the first writer's result and fails its precondition.

mod afe_repo;
mod billing_repo;
mod funding_repo;

// In-memory implementations
mod memory;

pub use afe_repo::AfeRepository;
pub use billing_repo::BillingRepository;
pub use funding_repo::FundingRepository;
pub use memory::{MemoryAfeStore, MemoryBillingStore, MemoryFundingStore};

use jia_core::JiaResult;

/// Aggregate mutation executed atomically by a repository
///
/// The closure sees a draft copy; if it returns an error the stored record
/// is left untouched.
pub type Mutation<'a, T> = Box<dyn FnOnce(&mut T) -> JiaResult<()> + Send + 'a>;
