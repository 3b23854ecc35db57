//! JIA Core - Joint Interest Accounting Domain Layer
//!
//! Pure domain model for joint-venture cost accounting across
//! working-interest partners. It provides:
//! - **Allocation**: exact-sum splits of a total across parties by working interest
//! - **Approval**: sequential level-gated approval/rejection workflow
//! - **AFE**: Authorization for Expenditure lifecycle (categories, expenses, variances, closeout)
//! - **JIB**: Joint Interest Billing cycles (line items, partner shares, payments, disputes)
//! - **Cash Calls**: funding requests with per-party responses and partial-funding aggregation
//!
//! # Core Invariants
//!
//! | Invariant | Core Requirement |
//! |-----------|------------------|
//! | **Exact Sum** | Allocated shares always sum to the allocated total, to the cent |
//! | **Sequential Approval** | Level n+1 can only be approved after level n; skipping fails |
//! | **Terminal Rejection** | A rejected authorization is never resurrected |
//! | **Snapshot Interest** | A working interest captured in an allocation never changes |
//! | **Recomputed Totals** | Derived totals are recomputed from children, never trusted caches |
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      jia-api / jia-executor                  │
//! │            (HTTP surface, orchestration over stores)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │                      jia-core (this crate)                   │
//! │      AFE Engine      │    JIB Engine    │  CashCall Engine   │
//! │            ApprovalWorkflow   │   AllocationCalculator       │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! This crate performs no I/O; callers load state, apply an engine
//! operation, and persist the result in one transaction.

pub mod error;
pub mod types;
pub mod allocation;
pub mod approval;
pub mod afe;
pub mod billing;
pub mod funding;

pub use error::{JiaError, JiaResult};
pub use types::*;
pub use allocation::{AllocationCalculator, AllocationShare, OperatorSplit};
pub use approval::{Approvable, ApprovalRecord, WorkflowStatus};
pub use afe::AfeEngine;
pub use billing::{JibEngine, LineItemInput};
pub use funding::CashCallEngine;
