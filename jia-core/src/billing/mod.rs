//! Billing Cycle Engine
//!
//! Periodic joint-interest bills: line items roll up into a total, the
//! total is split across partners by working interest, and settlement is
//! tracked per partner share.

mod engine;

pub use engine::{JibEngine, LineItemInput};
