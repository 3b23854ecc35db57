//! Working Party
//!
//! A contract participant with its working-interest percentage. The party
//! registry owns the roster; once a percentage has been captured in an
//! allocation it is an immutable snapshot on the resulting share row.

use super::common::PartyId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Working-interest party (read-only to the core)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorkingParty {
    pub party_id: PartyId,
    pub name: String,
    /// Working-interest percentage, 0..=100
    pub working_interest: Decimal,
    /// Operator conducts operations and absorbs allocation remainders
    pub is_operator: bool,
}

impl WorkingParty {
    pub fn new(
        party_id: PartyId,
        name: impl Into<String>,
        working_interest: Decimal,
        is_operator: bool,
    ) -> Self {
        Self {
            party_id,
            name: name.into(),
            working_interest,
            is_operator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_party_construction() {
        let party = WorkingParty::new(
            PartyId::new("party:op"),
            "Operator LLC",
            Decimal::new(60, 0),
            true,
        );
        assert!(party.is_operator);
        assert_eq!(party.working_interest, Decimal::new(60, 0));
    }
}
