//! Vacation decisions: `pending -> approved | rejected`, both terminal.

use serde::{Deserialize, Serialize};

use super::access::{ActionContext, Capability};
use super::audit::{self, AuditAction, NotificationKind};
use super::domain::{State, VacationRequest, VacationStatus};
use super::error::{DeskError, EntityKind, ValidationError};

/// The two confirmations an approver has to give before a vacation is
/// approved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Acknowledgements {
    pub first: bool,
    pub second: bool,
}

/// Evidence that both acknowledgements were given. Only obtainable through
/// [`ApprovalProof::confirm`].
#[derive(Debug)]
pub struct ApprovalProof {
    _confirmed: (),
}

impl ApprovalProof {
    pub fn confirm(acknowledgements: Acknowledgements) -> Result<Self, ValidationError> {
        if acknowledgements.first && acknowledgements.second {
            Ok(Self { _confirmed: () })
        } else {
            Err(ValidationError::MissingAcknowledgement)
        }
    }
}

pub fn can_transition(from: VacationStatus, to: VacationStatus) -> bool {
    from == VacationStatus::Pending && to.is_terminal()
}

pub fn approve_vacation(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    vacation_id: &str,
    _proof: ApprovalProof,
) -> Result<VacationRequest, DeskError> {
    decide(state, ctx, intern_id, vacation_id, VacationStatus::Approved)
}

pub fn reject_vacation(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    vacation_id: &str,
) -> Result<VacationRequest, DeskError> {
    decide(state, ctx, intern_id, vacation_id, VacationStatus::Rejected)
}

fn decide(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    vacation_id: &str,
    to: VacationStatus,
) -> Result<VacationRequest, DeskError> {
    ctx.require(Capability::ManageProvas)?;

    let intern = state.intern_mut(intern_id)?;
    let vacation = intern
        .vacations
        .iter_mut()
        .find(|vacation| vacation.id == vacation_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::Vacation, vacation_id))?;

    if !can_transition(vacation.status, to) {
        return Err(ValidationError::InvalidTransition {
            from: vacation.status,
            to,
        }
        .into());
    }

    vacation.status = to;
    vacation.decided_by = Some(ctx.actor().name.clone());
    vacation.decided_at = Some(ctx.now());
    let decided = vacation.clone();

    let (action, kind) = match to {
        VacationStatus::Approved => (AuditAction::ApproveVacation, NotificationKind::VacationApproved),
        _ => (AuditAction::RejectVacation, NotificationKind::VacationRejected),
    };
    let details = format!(
        "vacation from {} to {} {} by {}",
        decided.start_date,
        decided.end_date(),
        to,
        ctx.actor().name
    );
    audit::record(intern, ctx, action, details.clone());

    if let Some(owner) = state.owner_of_mut(intern_id) {
        audit::notify(owner, kind, details, ctx.now());
    }

    Ok(decided)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proof_needs_both_acknowledgements() {
        for acknowledgements in [
            Acknowledgements::default(),
            Acknowledgements {
                first: true,
                second: false,
            },
            Acknowledgements {
                first: false,
                second: true,
            },
        ] {
            assert!(matches!(
                ApprovalProof::confirm(acknowledgements),
                Err(ValidationError::MissingAcknowledgement)
            ));
        }

        assert!(ApprovalProof::confirm(Acknowledgements {
            first: true,
            second: true,
        })
        .is_ok());
    }

    #[test]
    fn only_pending_requests_move() {
        use VacationStatus::*;
        assert!(can_transition(Pending, Approved));
        assert!(can_transition(Pending, Rejected));
        assert!(!can_transition(Pending, Pending));
        assert!(!can_transition(Approved, Rejected));
        assert!(!can_transition(Rejected, Approved));
        assert!(!can_transition(Approved, Approved));
    }
}
