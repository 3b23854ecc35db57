//! Expenditure Authorization Engine
//!
//! Lifecycle of a spending authorization: categorized estimates, the
//! sequential approval chain, expense recording against approved budgets,
//! independently-approved variances, and closeout against final cost.

mod engine;
mod variance;

pub use engine::AfeEngine;
