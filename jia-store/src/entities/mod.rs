//! JIA Store Entities
//!
//! One record per aggregate: the root plus all child rows. Storing the
//! aggregate as a unit is what lets a single `mutate` be transactional
//! over approvals, expenses, shares, and responses together.

mod afe;
mod billing;
mod funding;

pub use afe::AfeRecord;
pub use billing::BillingRecord;
pub use funding::CashCallRecord;
