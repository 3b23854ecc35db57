//! Approval State Machine
//!
//! Generic over any entity carrying a level-gated workflow. The strict
//! `level == current + 1` gate guarantees approval chains cannot be
//! reordered or skipped, and makes concurrent duplicate approvals
//! observable: the second attempt sees the advanced level and fails.

use super::ApprovalRecord;
use crate::error::{JiaError, JiaResult};
use crate::types::{ApprovalDecision, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow position of an approvable entity
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    Draft,
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Pending => write!(f, "pending"),
            Self::Approved => write!(f, "approved"),
            Self::Rejected => write!(f, "rejected"),
        }
    }
}

/// Entity that moves through the sequential approval workflow
pub trait Approvable {
    /// Current workflow position, mapped from the entity's own status
    fn workflow_status(&self) -> WorkflowStatus;

    /// Apply a workflow transition onto the entity's own status
    fn set_workflow_status(&mut self, status: WorkflowStatus);

    /// Highest level approved so far
    fn current_level(&self) -> u32;

    fn set_current_level(&mut self, level: u32);

    /// Approval threshold, fixed at creation
    fn required_level(&self) -> u32;

    /// Stamp submission time
    fn mark_submitted(&mut self, now: DateTime<Utc>);

    /// Stamp final approval time
    fn mark_approved(&mut self, now: DateTime<Utc>);
}

/// Submit a draft entity into the approval chain
///
/// Pre-creates one pending record per level. A zero-level policy has no
/// gates, so submission approves immediately.
pub fn submit<T: Approvable>(entity: &mut T, now: DateTime<Utc>) -> JiaResult<Vec<ApprovalRecord>> {
    if entity.workflow_status() != WorkflowStatus::Draft {
        return Err(JiaError::invalid_state("submit", entity.workflow_status()));
    }

    entity.set_current_level(0);
    entity.set_workflow_status(WorkflowStatus::Pending);
    entity.mark_submitted(now);

    if entity.required_level() == 0 {
        entity.set_workflow_status(WorkflowStatus::Approved);
        entity.mark_approved(now);
        return Ok(Vec::new());
    }

    Ok((1..=entity.required_level())
        .map(ApprovalRecord::pending)
        .collect())
}

/// Approve one level, strictly in sequence
pub fn approve_level<T: Approvable>(
    entity: &mut T,
    records: &mut [ApprovalRecord],
    level: u32,
    approver: &UserId,
    comments: Option<String>,
    now: DateTime<Utc>,
) -> JiaResult<()> {
    let record = gate_level(entity, records, level)?;
    record.decide(ApprovalDecision::Approved, approver, comments, now);
    entity.set_current_level(level);

    if level >= entity.required_level() {
        entity.set_workflow_status(WorkflowStatus::Approved);
        entity.mark_approved(now);
    }

    Ok(())
}

/// Reject one level; terminal for the whole entity
pub fn reject_level<T: Approvable>(
    entity: &mut T,
    records: &mut [ApprovalRecord],
    level: u32,
    approver: &UserId,
    reason: Option<String>,
    now: DateTime<Utc>,
) -> JiaResult<()> {
    let record = gate_level(entity, records, level)?;
    record.decide(ApprovalDecision::Rejected, approver, reason, now);
    entity.set_workflow_status(WorkflowStatus::Rejected);
    Ok(())
}

/// Shared precondition check for approve/reject
fn gate_level<'a, T: Approvable>(
    entity: &T,
    records: &'a mut [ApprovalRecord],
    level: u32,
) -> JiaResult<&'a mut ApprovalRecord> {
    if entity.workflow_status() != WorkflowStatus::Pending {
        return Err(JiaError::invalid_state(
            "decide approval level",
            entity.workflow_status(),
        ));
    }

    let expected = entity.current_level() + 1;
    if level <= entity.current_level() {
        return Err(JiaError::AlreadyApproved { level });
    }
    if level != expected {
        return Err(JiaError::OutOfOrderApproval {
            expected,
            got: level,
        });
    }

    let record = records
        .iter_mut()
        .find(|r| r.level == level)
        .ok_or(JiaError::MissingApprovalRecord { level })?;
    if record.status != ApprovalDecision::Pending {
        return Err(JiaError::AlreadyApproved { level });
    }

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal approvable entity for machine-level tests
    struct Workflow {
        status: WorkflowStatus,
        current: u32,
        required: u32,
        submitted_at: Option<DateTime<Utc>>,
        approved_at: Option<DateTime<Utc>>,
    }

    impl Workflow {
        fn new(required: u32) -> Self {
            Self {
                status: WorkflowStatus::Draft,
                current: 0,
                required,
                submitted_at: None,
                approved_at: None,
            }
        }
    }

    impl Approvable for Workflow {
        fn workflow_status(&self) -> WorkflowStatus {
            self.status
        }
        fn set_workflow_status(&mut self, status: WorkflowStatus) {
            self.status = status;
        }
        fn current_level(&self) -> u32 {
            self.current
        }
        fn set_current_level(&mut self, level: u32) {
            self.current = level;
        }
        fn required_level(&self) -> u32 {
            self.required
        }
        fn mark_submitted(&mut self, now: DateTime<Utc>) {
            self.submitted_at = Some(now);
        }
        fn mark_approved(&mut self, now: DateTime<Utc>) {
            self.approved_at = Some(now);
        }
    }

    fn approver() -> UserId {
        UserId::new("user:approver")
    }

    #[test]
    fn test_submit_precreates_pending_records() {
        let mut wf = Workflow::new(3);
        let records = submit(&mut wf, Utc::now()).unwrap();

        assert_eq!(wf.status, WorkflowStatus::Pending);
        assert_eq!(wf.current, 0);
        assert!(wf.submitted_at.is_some());
        assert_eq!(records.len(), 3);
        assert!(records
            .iter()
            .all(|r| r.status == ApprovalDecision::Pending));
    }

    #[test]
    fn test_submit_requires_draft() {
        let mut wf = Workflow::new(2);
        submit(&mut wf, Utc::now()).unwrap();

        let err = submit(&mut wf, Utc::now()).unwrap_err();
        assert!(matches!(err, JiaError::InvalidState { .. }));
    }

    #[test]
    fn test_zero_level_policy_approves_on_submit() {
        let mut wf = Workflow::new(0);
        let records = submit(&mut wf, Utc::now()).unwrap();
        assert!(records.is_empty());
        assert_eq!(wf.status, WorkflowStatus::Approved);
    }

    #[test]
    fn test_sequential_approval_reaches_terminal() {
        let mut wf = Workflow::new(2);
        let mut records = submit(&mut wf, Utc::now()).unwrap();

        approve_level(&mut wf, &mut records, 1, &approver(), None, Utc::now()).unwrap();
        assert_eq!(wf.status, WorkflowStatus::Pending);
        assert_eq!(wf.current, 1);

        approve_level(&mut wf, &mut records, 2, &approver(), None, Utc::now()).unwrap();
        assert_eq!(wf.status, WorkflowStatus::Approved);
        assert_eq!(wf.current, 2);
        assert!(wf.approved_at.is_some());
    }

    #[test]
    fn test_skipping_a_level_fails() {
        let mut wf = Workflow::new(3);
        let mut records = submit(&mut wf, Utc::now()).unwrap();

        let err =
            approve_level(&mut wf, &mut records, 2, &approver(), None, Utc::now()).unwrap_err();
        assert_eq!(err, JiaError::OutOfOrderApproval { expected: 1, got: 2 });
        // Entity untouched
        assert_eq!(wf.current, 0);
        assert_eq!(wf.status, WorkflowStatus::Pending);
    }

    #[test]
    fn test_reapproving_a_level_fails() {
        let mut wf = Workflow::new(2);
        let mut records = submit(&mut wf, Utc::now()).unwrap();
        approve_level(&mut wf, &mut records, 1, &approver(), None, Utc::now()).unwrap();

        let err =
            approve_level(&mut wf, &mut records, 1, &approver(), None, Utc::now()).unwrap_err();
        assert_eq!(err, JiaError::AlreadyApproved { level: 1 });
    }

    #[test]
    fn test_rejection_is_terminal() {
        let mut wf = Workflow::new(2);
        let mut records = submit(&mut wf, Utc::now()).unwrap();

        reject_level(
            &mut wf,
            &mut records,
            1,
            &approver(),
            Some("insufficient justification".to_string()),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(wf.status, WorkflowStatus::Rejected);

        let err =
            approve_level(&mut wf, &mut records, 2, &approver(), None, Utc::now()).unwrap_err();
        assert!(matches!(err, JiaError::InvalidState { .. }));

        let err =
            reject_level(&mut wf, &mut records, 2, &approver(), None, Utc::now()).unwrap_err();
        assert!(matches!(err, JiaError::InvalidState { .. }));
    }

    #[test]
    fn test_rejection_records_reason() {
        let mut wf = Workflow::new(1);
        let mut records = submit(&mut wf, Utc::now()).unwrap();

        reject_level(
            &mut wf,
            &mut records,
            1,
            &approver(),
            Some("over budget".to_string()),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(records[0].status, ApprovalDecision::Rejected);
        assert_eq!(records[0].comments.as_deref(), Some("over budget"));
        assert!(records[0].decided_at.is_some());
    }
}
