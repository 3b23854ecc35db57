//! Approval Workflow
//!
//! Sequential, level-gated approval shared by the financial authorization
//! entities. Rejection at any level is terminal; there is no reopen, so the
//! rejection audit trail is immutable by construction.

mod machine;

pub use machine::{approve_level, reject_level, submit, Approvable, WorkflowStatus};

use crate::types::{ApprovalDecision, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One approval level's record
///
/// Pre-created as Pending when the entity is submitted; mutated exactly
/// once to a terminal decision.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApprovalRecord {
    pub approval_id: String,
    pub level: u32,
    pub status: ApprovalDecision,
    pub approver: Option<UserId>,
    pub comments: Option<String>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl ApprovalRecord {
    /// Create a pending record for a level
    pub fn pending(level: u32) -> Self {
        Self {
            approval_id: crate::types::row_id(),
            level,
            status: ApprovalDecision::Pending,
            approver: None,
            comments: None,
            decided_at: None,
        }
    }

    fn decide(
        &mut self,
        decision: ApprovalDecision,
        approver: &UserId,
        comments: Option<String>,
        now: DateTime<Utc>,
    ) {
        self.status = decision;
        self.approver = Some(approver.clone());
        self.comments = comments;
        self.decided_at = Some(now);
    }
}
