//! Allocation
//!
//! Splits a total amount across working-interest parties such that the
//! shares always sum back to the total, to the currency's minor unit.

mod calculator;

pub use calculator::AllocationCalculator;

use crate::types::PartyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One party's computed share of an allocated total
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AllocationShare {
    pub party_id: PartyId,
    /// Working-interest snapshot the share was computed from
    pub working_interest: Decimal,
    pub amount: Decimal,
    /// True for the party that absorbed the rounding remainder
    pub absorbed_remainder: bool,
}

/// Two-way split of a total into operator and non-operator portions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperatorSplit {
    pub operator_share: Decimal,
    pub partners_share: Decimal,
}
