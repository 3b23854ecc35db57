//! AFE Aggregate Record

use jia_core::approval::ApprovalRecord;
use jia_core::types::{Afe, AfeCategory, AfeExpense, AfeVariance};
use serde::{Deserialize, Serialize};

/// Stored AFE aggregate: the authorization and all child rows
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AfeRecord {
    pub afe: Afe,
    pub categories: Vec<AfeCategory>,
    pub approvals: Vec<ApprovalRecord>,
    pub expenses: Vec<AfeExpense>,
    pub variances: Vec<AfeVariance>,
}

impl AfeRecord {
    /// Create a record for a freshly drafted AFE
    pub fn new(afe: Afe, categories: Vec<AfeCategory>) -> Self {
        Self {
            afe,
            categories,
            approvals: Vec::new(),
            expenses: Vec::new(),
            variances: Vec::new(),
        }
    }

    /// Find a variance by id
    pub fn variance_mut(&mut self, variance_id: &str) -> Option<&mut AfeVariance> {
        self.variances
            .iter_mut()
            .find(|v| v.variance_id == variance_id)
    }

    /// Find an expense by id
    pub fn expense(&self, expense_id: &str) -> Option<&AfeExpense> {
        self.expenses.iter().find(|e| e.expense_id == expense_id)
    }
}
