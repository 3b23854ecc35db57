//! Cash Call Engine
//!
//! `funded_amount` on a call is never trusted as a cache: it is recomputed
//! from the responses inside every mutation that touches a response, and
//! the status derivation follows from the same pass.

use crate::allocation::AllocationCalculator;
use crate::error::{JiaError, JiaResult};
use crate::types::{
    row_id, AfeId, CashCall, CashCallId, CashCallResponse, CashCallStatus, ContractId,
    ResponseStatus, WorkingParty,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Cash call engine
#[derive(Clone, Debug, Default)]
pub struct CashCallEngine {
    calculator: AllocationCalculator,
}

impl CashCallEngine {
    /// Create new engine
    pub fn new() -> Self {
        Self {
            calculator: AllocationCalculator::new(),
        }
    }

    /// Build a draft cash call with one pending response per party
    #[allow(clippy::too_many_arguments)]
    pub fn build_call(
        &self,
        call_id: CashCallId,
        code: impl Into<String>,
        contract_ref: ContractId,
        purpose: impl Into<String>,
        afe_ref: Option<AfeId>,
        total_amount: Decimal,
        currency: impl Into<String>,
        call_date: NaiveDate,
        due_date: Option<NaiveDate>,
        parties: &[WorkingParty],
        now: DateTime<Utc>,
    ) -> JiaResult<(CashCall, Vec<CashCallResponse>)> {
        if total_amount <= Decimal::ZERO {
            return Err(JiaError::NonPositiveCallTotal {
                total: total_amount.to_string(),
            });
        }

        let allocations = self.calculator.allocate(total_amount, parties)?;
        let responses: Vec<CashCallResponse> = allocations
            .into_iter()
            .map(|allocation| CashCallResponse {
                response_id: row_id(),
                party_id: allocation.party_id,
                working_interest: allocation.working_interest,
                requested_amount: allocation.amount,
                funded_amount: Decimal::ZERO,
                funded_date: None,
                payment_reference: None,
                bank_reference: None,
                status: ResponseStatus::Pending,
            })
            .collect();

        let call = CashCall {
            call_id,
            code: code.into(),
            contract_ref,
            purpose: purpose.into(),
            afe_ref,
            total_amount,
            funded_amount: Decimal::ZERO,
            currency: currency.into(),
            call_date,
            due_date,
            status: CashCallStatus::Draft,
            created_at: now,
        };

        Ok((call, responses))
    }

    /// Send a draft call to the partners
    pub fn send(&self, call: &mut CashCall) -> JiaResult<()> {
        if !call.status.is_valid_transition(&CashCallStatus::Sent) {
            return Err(JiaError::invalid_state("send", call.status));
        }
        call.status = CashCallStatus::Sent;
        Ok(())
    }

    /// Record a party's funding against its response
    ///
    /// One terminal funding event per response: a partial response is not
    /// topped up later; shortfalls are covered by a fresh call. The call's
    /// `funded_amount` and status are re-derived from all responses in the
    /// same mutation.
    pub fn record_funding(
        &self,
        call: &mut CashCall,
        responses: &mut [CashCallResponse],
        response_id: &str,
        amount: Decimal,
        funded_date: NaiveDate,
        payment_reference: Option<String>,
        bank_reference: Option<String>,
    ) -> JiaResult<()> {
        if !matches!(
            call.status,
            CashCallStatus::Sent | CashCallStatus::PartiallyFunded
        ) {
            return Err(JiaError::invalid_state("record funding", call.status));
        }
        if amount <= Decimal::ZERO {
            return Err(JiaError::InvalidAmount {
                reason: format!("funding amount must be positive, got {amount}"),
            });
        }

        let response = responses
            .iter_mut()
            .find(|r| r.response_id == response_id)
            .ok_or_else(|| JiaError::not_found("CashCallResponse", response_id))?;
        if response.status != ResponseStatus::Pending {
            return Err(JiaError::invalid_state("record funding", response.status));
        }
        if amount > response.requested_amount {
            return Err(JiaError::Overfunding {
                requested: response.requested_amount.to_string(),
                funded: amount.to_string(),
            });
        }

        response.funded_amount = amount;
        response.funded_date = Some(funded_date);
        response.payment_reference = payment_reference;
        response.bank_reference = bank_reference;
        response.status = if amount == response.requested_amount {
            ResponseStatus::Funded
        } else {
            ResponseStatus::Partial
        };

        self.refresh_funding(call, responses);
        Ok(())
    }

    /// Re-derive `funded_amount` and call status from the responses
    pub fn refresh_funding(&self, call: &mut CashCall, responses: &[CashCallResponse]) {
        call.funded_amount = responses.iter().map(|r| r.funded_amount).sum();

        if !responses.is_empty() && responses.iter().all(|r| r.status == ResponseStatus::Funded) {
            call.status = CashCallStatus::Funded;
        } else if call.funded_amount > Decimal::ZERO {
            call.status = CashCallStatus::PartiallyFunded;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PartyId;
    use std::str::FromStr;

    fn party(id: &str, interest: &str, operator: bool) -> WorkingParty {
        WorkingParty::new(
            PartyId::new(id),
            id.to_uppercase(),
            Decimal::from_str(interest).unwrap(),
            operator,
        )
    }

    fn sent_call(total: i64) -> (CashCallEngine, CashCall, Vec<CashCallResponse>) {
        let engine = CashCallEngine::new();
        let parties = vec![party("party:a", "40", true), party("party:b", "60", false)];
        let (mut call, responses) = engine
            .build_call(
                CashCallId::new("call:1"),
                "CC-2025-001",
                ContractId::new("contract:1"),
                "Drilling advance",
                None,
                Decimal::new(total, 0),
                "USD",
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                None,
                &parties,
                Utc::now(),
            )
            .unwrap();
        engine.send(&mut call).unwrap();
        (engine, call, responses)
    }

    #[test]
    fn test_requested_amounts_follow_working_interest() {
        let (_, call, responses) = sent_call(500_000);
        assert_eq!(responses[0].requested_amount, Decimal::new(200_000, 0));
        assert_eq!(responses[1].requested_amount, Decimal::new(300_000, 0));
        let requested: Decimal = responses.iter().map(|r| r.requested_amount).sum();
        assert_eq!(requested, call.total_amount);
    }

    #[test]
    fn test_non_positive_total_rejected() {
        let engine = CashCallEngine::new();
        let parties = vec![party("party:a", "100", true)];
        let err = engine
            .build_call(
                CashCallId::new("call:1"),
                "CC-2025-001",
                ContractId::new("contract:1"),
                "Nothing",
                None,
                Decimal::ZERO,
                "USD",
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                None,
                &parties,
                Utc::now(),
            )
            .unwrap_err();
        assert!(matches!(err, JiaError::NonPositiveCallTotal { .. }));
    }

    #[test]
    fn test_funding_aggregation_and_status() {
        let (engine, mut call, mut responses) = sent_call(500_000);
        let date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();

        let id = responses[0].response_id.clone();
        engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(200_000, 0), date, None, None)
            .unwrap();
        assert_eq!(responses[0].status, ResponseStatus::Funded);
        assert_eq!(call.funded_amount, Decimal::new(200_000, 0));
        assert_eq!(call.status, CashCallStatus::PartiallyFunded);

        let id = responses[1].response_id.clone();
        engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(300_000, 0), date, None, None)
            .unwrap();
        assert_eq!(call.funded_amount, Decimal::new(500_000, 0));
        assert_eq!(call.status, CashCallStatus::Funded);
    }

    #[test]
    fn test_partial_funding_never_reaches_funded() {
        let (engine, mut call, mut responses) = sent_call(500_000);
        let date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();

        let id = responses[0].response_id.clone();
        engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(150_000, 0), date, None, None)
            .unwrap();
        assert_eq!(responses[0].status, ResponseStatus::Partial);

        let id = responses[1].response_id.clone();
        engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(300_000, 0), date, None, None)
            .unwrap();

        // One response partial: the call stays partially funded
        assert_eq!(call.status, CashCallStatus::PartiallyFunded);
        assert_eq!(call.funded_amount, Decimal::new(450_000, 0));
    }

    #[test]
    fn test_overfunding_rejected() {
        let (engine, mut call, mut responses) = sent_call(500_000);
        let id = responses[0].response_id.clone();

        let err = engine
            .record_funding(
                &mut call,
                &mut responses,
                &id,
                Decimal::new(200_001, 0),
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, JiaError::Overfunding { .. }));
        assert_eq!(responses[0].status, ResponseStatus::Pending);
        assert_eq!(call.funded_amount, Decimal::ZERO);
    }

    #[test]
    fn test_partial_response_not_topped_up() {
        let (engine, mut call, mut responses) = sent_call(500_000);
        let date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let id = responses[0].response_id.clone();

        engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(100_000, 0), date, None, None)
            .unwrap();
        let err = engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(100_000, 0), date, None, None)
            .unwrap_err();
        assert!(matches!(err, JiaError::InvalidState { .. }));
    }

    #[test]
    fn test_funding_requires_sent_call() {
        let engine = CashCallEngine::new();
        let parties = vec![party("party:a", "100", true)];
        let (mut call, mut responses) = engine
            .build_call(
                CashCallId::new("call:1"),
                "CC-2025-001",
                ContractId::new("contract:1"),
                "Advance",
                None,
                Decimal::new(10_000, 0),
                "USD",
                NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
                None,
                &parties,
                Utc::now(),
            )
            .unwrap();

        let id = responses[0].response_id.clone();
        let err = engine
            .record_funding(
                &mut call,
                &mut responses,
                &id,
                Decimal::new(10_000, 0),
                NaiveDate::from_ymd_opt(2025, 1, 20).unwrap(),
                None,
                None,
            )
            .unwrap_err();
        assert!(matches!(err, JiaError::InvalidState { .. }));
    }

    #[test]
    fn test_refresh_matches_recomputed_sum() {
        // Drift detector: a cached funded_amount must equal the recomputed sum
        let (engine, mut call, mut responses) = sent_call(500_000);
        let date = NaiveDate::from_ymd_opt(2025, 1, 20).unwrap();
        let id = responses[1].response_id.clone();
        engine
            .record_funding(&mut call, &mut responses, &id, Decimal::new(250_000, 0), date, None, None)
            .unwrap();

        let recomputed: Decimal = responses.iter().map(|r| r.funded_amount).sum();
        assert_eq!(call.funded_amount, recomputed);
    }
}
