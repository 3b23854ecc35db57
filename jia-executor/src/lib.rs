//! JIA Executor - Orchestration Layer
//!
//! Coordinates the domain engines, the aggregate stores, and the party
//! registry behind one facade.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                JiaExecutor                    │
//! │   one repository mutate call per operation    │
//! └───────────────────────────────────────────────┘
//!      │               │                │
//!      ▼               ▼                ▼
//!  AfeRepository  BillingRepository  FundingRepository
//!      │               │                │
//!      └───────── jia-store ────────────┘
//!                      │
//!                  jia-core
//! ```
//!
//! # Modules
//!
//! - [`executor`] - The orchestration facade and its input types
//! - [`registry`] - Party registry and identity seams
//! - [`error`] - Error types
//!
//! # Usage Example
//!
//! ```ignore
//! use jia_executor::{JiaExecutor, StaticPartyRegistry};
//! use std::sync::Arc;
//!
//! async fn example() {
//!     let registry = Arc::new(StaticPartyRegistry::new());
//!     let executor = JiaExecutor::in_memory(registry);
//!     // executor.create_afe(...).await
//! }
//! ```

pub mod error;
pub mod executor;
pub mod registry;

pub use error::{ExecutorError, ExecutorResult};
pub use executor::{
    AfeDraft, CashCallDraft, CategoryEstimate, CycleDraft, ExpenseInput, JiaExecutor,
    VarianceRequest,
};
pub use registry::{FixedIdentity, IdentityProvider, PartyRegistry, StaticPartyRegistry};

/// JIA Executor version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
