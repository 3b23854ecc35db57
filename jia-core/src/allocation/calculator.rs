//! Allocation Calculator
//!
//! Core exact-sum split logic. Raw shares are rounded to the currency's
//! minor unit and the rounding remainder is assigned to the operator, so
//! fractional-cent drift can never accumulate across parties.

use super::{AllocationShare, OperatorSplit};
use crate::error::{JiaError, JiaResult};
use crate::types::WorkingParty;
use rust_decimal::Decimal;

/// Allocation calculator
#[derive(Clone, Debug)]
pub struct AllocationCalculator {
    /// Rounding precision in decimal places (2 for USD and most currencies)
    precision: u32,
}

impl AllocationCalculator {
    /// Create a calculator with 2-decimal minor-unit precision
    pub fn new() -> Self {
        Self { precision: 2 }
    }

    /// Create a calculator with custom precision
    pub fn with_precision(mut self, precision: u32) -> Self {
        self.precision = precision;
        self
    }

    /// Split `total` across `parties` by working interest
    ///
    /// The rounding remainder goes to the operator party; with no operator
    /// designated it goes to the largest working interest, ties broken by
    /// party id ordering for determinism. The exact-sum invariant is
    /// re-verified before returning; a violation is a calculator defect
    /// reported as `AllocationRounding`.
    pub fn allocate(
        &self,
        total: Decimal,
        parties: &[WorkingParty],
    ) -> JiaResult<Vec<AllocationShare>> {
        if parties.is_empty() {
            return Err(JiaError::NoParties {
                total: total.to_string(),
            });
        }
        self.validate_interests(parties)?;

        let hundred = Decimal::ONE_HUNDRED;
        let mut shares: Vec<AllocationShare> = parties
            .iter()
            .map(|party| AllocationShare {
                party_id: party.party_id.clone(),
                working_interest: party.working_interest,
                amount: (total * party.working_interest / hundred).round_dp(self.precision),
                absorbed_remainder: false,
            })
            .collect();

        let rounded_sum: Decimal = shares.iter().map(|s| s.amount).sum();
        let remainder = total - rounded_sum;
        if !remainder.is_zero() {
            let idx = self.remainder_index(parties);
            shares[idx].amount += remainder;
            shares[idx].absorbed_remainder = true;
        }

        let allocated: Decimal = shares.iter().map(|s| s.amount).sum();
        if allocated != total {
            tracing::error!(
                expected = %total,
                actual = %allocated,
                "allocation shares do not sum to total after remainder assignment"
            );
            return Err(JiaError::AllocationRounding {
                expected: total.to_string(),
                actual: allocated.to_string(),
            });
        }

        Ok(shares)
    }

    /// Two-way split of `total` into operator and non-operator portions
    ///
    /// Uses the same rounding and remainder policy as [`allocate`](Self::allocate);
    /// the operator side absorbs the remainder.
    pub fn operator_split(
        &self,
        total: Decimal,
        parties: &[WorkingParty],
    ) -> JiaResult<OperatorSplit> {
        if parties.is_empty() {
            return Err(JiaError::NoParties {
                total: total.to_string(),
            });
        }
        self.validate_interests(parties)?;

        let hundred = Decimal::ONE_HUNDRED;
        let operator_interest: Decimal = parties
            .iter()
            .filter(|p| p.is_operator)
            .map(|p| p.working_interest)
            .sum();

        let partners_share = (total * (hundred - operator_interest) / hundred)
            .round_dp(self.precision);
        let operator_share = total - partners_share;

        let split = OperatorSplit {
            operator_share,
            partners_share,
        };

        if split.operator_share + split.partners_share != total {
            tracing::error!(
                expected = %total,
                operator = %split.operator_share,
                partners = %split.partners_share,
                "operator split does not sum to total"
            );
            return Err(JiaError::AllocationRounding {
                expected: total.to_string(),
                actual: (split.operator_share + split.partners_share).to_string(),
            });
        }

        Ok(split)
    }

    fn validate_interests(&self, parties: &[WorkingParty]) -> JiaResult<()> {
        for party in parties {
            if party.working_interest < Decimal::ZERO
                || party.working_interest > Decimal::ONE_HUNDRED
            {
                return Err(JiaError::InvalidWorkingInterest {
                    party_id: party.party_id.to_string(),
                    interest: party.working_interest.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Index of the party that absorbs the rounding remainder
    fn remainder_index(&self, parties: &[WorkingParty]) -> usize {
        if let Some(idx) = parties.iter().position(|p| p.is_operator) {
            return idx;
        }

        let mut best = 0;
        for (idx, party) in parties.iter().enumerate().skip(1) {
            let current = &parties[best];
            let larger = party.working_interest > current.working_interest;
            let tie_wins = party.working_interest == current.working_interest
                && party.party_id < current.party_id;
            if larger || tie_wins {
                best = idx;
            }
        }
        best
    }
}

impl Default for AllocationCalculator {
    fn default() -> Self {
        Self::new()
    }
}
