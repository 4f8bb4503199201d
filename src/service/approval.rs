// service/approval.rs
use serde::{Deserialize, Serialize};

use crate::{
    models::requestmodel::ApprovalStatus,
    service::error::ServiceError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approve,
    Reject,
}

impl ReviewDecision {
    pub fn target(&self) -> ApprovalStatus {
        match self {
            ReviewDecision::Approve => ApprovalStatus::Approved,
            ReviewDecision::Reject => ApprovalStatus::Rejected,
        }
    }
}

/// `pending -> {approved, rejected}`; both targets are terminal.
pub fn is_valid_transition(from: ApprovalStatus, to: ApprovalStatus) -> bool {
    matches!(
        (from, to),
        (ApprovalStatus::Pending, ApprovalStatus::Approved)
            | (ApprovalStatus::Pending, ApprovalStatus::Rejected)
    )
}

pub fn transition(from: ApprovalStatus, decision: ReviewDecision) -> Result<ApprovalStatus, ServiceError> {
    let to = decision.target();
    if !is_valid_transition(from, to) {
        return Err(invalid_transition(from, to));
    }
    Ok(to)
}

pub fn invalid_transition(from: ApprovalStatus, to: ApprovalStatus) -> ServiceError {
    ServiceError::InvalidStateTransition(format!(
        "cannot move from {} to {}; only pending records can be reviewed",
        from.to_str(),
        to.to_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_can_be_approved_or_rejected() {
        assert_eq!(
            transition(ApprovalStatus::Pending, ReviewDecision::Approve).unwrap(),
            ApprovalStatus::Approved
        );
        assert_eq!(
            transition(ApprovalStatus::Pending, ReviewDecision::Reject).unwrap(),
            ApprovalStatus::Rejected
        );
    }

    #[test]
    fn decided_records_are_terminal() {
        for from in [ApprovalStatus::Approved, ApprovalStatus::Rejected] {
            for decision in [ReviewDecision::Approve, ReviewDecision::Reject] {
                assert!(matches!(
                    transition(from, decision),
                    Err(ServiceError::InvalidStateTransition(_))
                ));
            }
        }
        assert!(!is_valid_transition(ApprovalStatus::Approved, ApprovalStatus::Pending));
        assert!(!is_valid_transition(ApprovalStatus::Pending, ApprovalStatus::Pending));
    }
}
