use super::common::*;
use crate::workflows::absence;
use crate::workflows::approval::{self, Acknowledgements, ApprovalProof};
use crate::workflows::audit::{AuditAction, NotificationKind};
use crate::workflows::error::{AuthorizationError, DeskError, PolicyBlock, ValidationError};
use crate::workflows::{Capability, VacationRequest, VacationStatus};

fn proof() -> ApprovalProof {
    ApprovalProof::confirm(Acknowledgements {
        first: true,
        second: true,
    })
    .expect("both acknowledged")
}

fn requested(fx: &mut Fixture) -> VacationRequest {
    let ctx = fx.intern_ctx(at(2024, 1, 1));
    let intern_id = fx.intern_id.clone();
    absence::request_vacation(&mut fx.state, &ctx, &intern_id, date(2024, 6, 3), 10)
        .expect("requested")
}

#[test]
fn approved_vacation_cannot_be_deleted() {
    let mut fx = fixture();
    let request = requested(&mut fx);
    let intern_id = fx.intern_id.clone();

    let admin = fx.admin_ctx(at(2024, 1, 2));
    let approved =
        approval::approve_vacation(&mut fx.state, &admin, &intern_id, &request.id, proof())
            .expect("approved");
    assert_eq!(approved.status, VacationStatus::Approved);
    assert_eq!(approved.decided_by.as_deref(), Some("Ana Admin"));
    assert_eq!(approved.decided_at, Some(at(2024, 1, 2)));

    for ctx in [fx.intern_ctx(at(2024, 1, 3)), fx.super_ctx(at(2024, 1, 3))] {
        match absence::delete_vacation(&mut fx.state, &ctx, &intern_id, &request.id) {
            Err(DeskError::Blocked(PolicyBlock::ApprovedVacationLocked { vacation_id })) => {
                assert_eq!(vacation_id, request.id);
            }
            other => panic!("expected approved lock, got {other:?}"),
        }
    }
    assert_eq!(fx.intern().vacations.len(), 1);
}

#[test]
fn approval_audits_and_notifies_the_owner() {
    let mut fx = fixture();
    let request = requested(&mut fx);
    let intern_id = fx.intern_id.clone();
    let admin = fx.admin_ctx(at(2024, 1, 2));

    approval::approve_vacation(&mut fx.state, &admin, &intern_id, &request.id, proof())
        .expect("approved");

    let last = fx.intern().audit_log.last().expect("audited");
    assert_eq!(last.action, AuditAction::ApproveVacation);
    assert_eq!(last.by_user_id, fx.admin_id);

    let notifications = &fx.intern_user().notifications;
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::VacationApproved);
    assert!(notifications[0].message.contains("2024-06-03"));
}

#[test]
fn rejection_keeps_the_record_out_of_the_trash() {
    let mut fx = fixture();
    let request = requested(&mut fx);
    let intern_id = fx.intern_id.clone();
    let admin = fx.admin_ctx(at(2024, 1, 2));

    let rejected = approval::reject_vacation(&mut fx.state, &admin, &intern_id, &request.id)
        .expect("rejected");

    assert_eq!(rejected.status, VacationStatus::Rejected);
    assert_eq!(fx.intern().vacations[0].status, VacationStatus::Rejected);
    assert!(fx.state.trash.is_empty());
    assert_eq!(
        fx.intern().audit_log.last().map(|entry| entry.action),
        Some(AuditAction::RejectVacation)
    );
    assert_eq!(
        fx.intern_user().notifications[0].kind,
        NotificationKind::VacationRejected
    );
}

#[test]
fn decided_requests_are_terminal() {
    let mut fx = fixture();
    let request = requested(&mut fx);
    let intern_id = fx.intern_id.clone();
    let admin = fx.admin_ctx(at(2024, 1, 2));

    approval::reject_vacation(&mut fx.state, &admin, &intern_id, &request.id).expect("rejected");
    let snapshot = fx.state.clone();

    assert!(matches!(
        approval::approve_vacation(&mut fx.state, &admin, &intern_id, &request.id, proof()),
        Err(DeskError::Validation(ValidationError::InvalidTransition {
            from: VacationStatus::Rejected,
            to: VacationStatus::Approved,
        }))
    ));
    assert!(matches!(
        approval::reject_vacation(&mut fx.state, &admin, &intern_id, &request.id),
        Err(DeskError::Validation(ValidationError::InvalidTransition { .. }))
    ));
    assert_eq!(fx.state, snapshot);
}

#[test]
fn deciding_requires_manage_provas() {
    let mut fx = fixture();
    let request = requested(&mut fx);
    let intern_id = fx.intern_id.clone();
    fx.admin_mut().powers.manage_provas = false;

    for ctx in [fx.admin_ctx(at(2024, 1, 2)), fx.intern_ctx(at(2024, 1, 2))] {
        assert!(matches!(
            approval::approve_vacation(&mut fx.state, &ctx, &intern_id, &request.id, proof()),
            Err(DeskError::Authorization(
                AuthorizationError::MissingCapability(Capability::ManageProvas)
            ))
        ));
    }
    assert_eq!(fx.intern().vacations[0].status, VacationStatus::Pending);
}

#[test]
fn unknown_vacation_is_not_found() {
    let mut fx = fixture();
    let intern_id = fx.intern_id.clone();
    let admin = fx.admin_ctx(at(2024, 1, 2));
    assert!(matches!(
        approval::reject_vacation(&mut fx.state, &admin, &intern_id, "nope"),
        Err(DeskError::NotFound { .. })
    ));
}
