//! Cash Call Aggregate Record

use jia_core::types::{CashCall, CashCallResponse};
use serde::{Deserialize, Serialize};

/// Stored cash call aggregate: the call and its per-party responses
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CashCallRecord {
    pub call: CashCall,
    pub responses: Vec<CashCallResponse>,
}

impl CashCallRecord {
    pub fn new(call: CashCall, responses: Vec<CashCallResponse>) -> Self {
        Self { call, responses }
    }

    /// Recompute the funded total; must always equal `call.funded_amount`
    pub fn funded_total(&self) -> rust_decimal::Decimal {
        self.responses.iter().map(|r| r.funded_amount).sum()
    }
}
