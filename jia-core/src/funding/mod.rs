//! Cash Call Engine
//!
//! Funding requests split across partners by working interest, with
//! per-party responses and partial-funding aggregation.

mod engine;

pub use engine::CashCallEngine;
