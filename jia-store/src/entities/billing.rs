//! Billing Cycle Aggregate Record

use jia_core::types::{BillingCycle, JibLineItem, PartnerShare};
use serde::{Deserialize, Serialize};

/// Stored billing cycle aggregate: the cycle, its line items, and shares
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BillingRecord {
    pub cycle: BillingCycle,
    pub line_items: Vec<JibLineItem>,
    pub shares: Vec<PartnerShare>,
}

impl BillingRecord {
    pub fn new(cycle: BillingCycle, line_items: Vec<JibLineItem>, shares: Vec<PartnerShare>) -> Self {
        Self {
            cycle,
            line_items,
            shares,
        }
    }

    /// Find a share by id
    pub fn share_mut(&mut self, share_id: &str) -> Option<&mut PartnerShare> {
        self.shares.iter_mut().find(|s| s.share_id == share_id)
    }

    /// Recompute the share total; must always equal `cycle.total_costs`
    pub fn share_total(&self) -> rust_decimal::Decimal {
        self.shares.iter().map(|s| s.share_amount).sum()
    }
}
