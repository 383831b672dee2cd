//! Soft deletion into the trash, restoration, and time-based purging.

use chrono::NaiveDate;

use super::access::{ActionContext, Capability, Role};
use super::audit::{self, AuditAction};
use super::domain::{new_id, MetaConfig, State, TrashItem, TrashPayload};
use super::error::{DeskError, EntityKind, ValidationError};
use crate::calendar;

/// Whole days an item has spent in the trash as of `today`.
pub fn days_in_trash(item: &TrashItem, today: NaiveDate) -> i64 {
    calendar::days_between(calendar::day_of(item.deleted_at), today)
}

/// An item stays restorable until more than `trashRetentionDays` have elapsed.
pub fn is_restorable(item: &TrashItem, meta: &MetaConfig, today: NaiveDate) -> bool {
    days_in_trash(item, today) <= i64::from(meta.trash_retention_days)
}

/// Delete a user, cascading to the intern it is linked to. Both land in a
/// single trash item.
pub fn delete_user(
    state: &mut State,
    ctx: &ActionContext,
    user_id: &str,
) -> Result<TrashItem, DeskError> {
    ctx.require(Capability::DeleteUser)?;

    let target = state.user(user_id)?;
    if target.role == Role::Super {
        return Err(ValidationError::SuperUserProtected.into());
    }
    if target.id == ctx.actor().id {
        return Err(ValidationError::SelfDeletion.into());
    }
    let intern_position = match target.intern_id.as_deref() {
        Some(intern_id) => Some(
            state
                .interns
                .iter()
                .position(|intern| intern.id == intern_id)
                .ok_or_else(|| DeskError::not_found(EntityKind::Intern, intern_id))?,
        ),
        None => None,
    };

    let user_position = state
        .users
        .iter()
        .position(|user| user.id == user_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::User, user_id))?;
    let user = state.users.remove(user_position);
    let intern = intern_position.map(|position| {
        let mut intern = state.interns.remove(position);
        audit::record(
            &mut intern,
            ctx,
            AuditAction::DeleteIntern,
            format!("moved to trash together with user {}", user.name),
        );
        intern
    });

    let item = TrashItem {
        id: new_id(),
        deleted_at: ctx.now(),
        payload: TrashPayload::DeletedUser { user, intern },
    };
    state.trash.push(item.clone());
    Ok(item)
}

pub fn restore(state: &mut State, ctx: &ActionContext, item_id: &str) -> Result<TrashItem, DeskError> {
    ctx.require(Capability::DeleteUser)?;

    let position = state
        .trash
        .iter()
        .position(|item| item.id == item_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::TrashItem, item_id))?;
    let item = &state.trash[position];
    if !is_restorable(item, &state.meta, ctx.today()) {
        return Err(ValidationError::RetentionExpired {
            item_id: item_id.to_string(),
        }
        .into());
    }
    ensure_no_conflict(state, &item.payload)?;

    let item = state.trash.remove(position);
    match item.payload.clone() {
        TrashPayload::DeletedUser { user, intern } => {
            if let Some(mut intern) = intern {
                audit::record(
                    &mut intern,
                    ctx,
                    AuditAction::RestoreIntern,
                    format!("restored from trash together with user {}", user.name),
                );
                state.interns.push(intern);
            }
            state.users.push(user);
        }
        TrashPayload::RejectedRegistration { registration } => {
            state.pending_registrations.push(registration);
        }
    }
    Ok(item)
}

fn ensure_no_conflict(state: &State, payload: &TrashPayload) -> Result<(), ValidationError> {
    let conflict = match payload {
        TrashPayload::DeletedUser { user, intern } => {
            if state.users.iter().any(|existing| existing.id == user.id) {
                Some(user.id.clone())
            } else {
                intern.as_ref().and_then(|intern| {
                    state
                        .interns
                        .iter()
                        .any(|existing| existing.id == intern.id)
                        .then(|| intern.id.clone())
                })
            }
        }
        TrashPayload::RejectedRegistration { registration } => state
            .pending_registrations
            .iter()
            .any(|existing| existing.id == registration.id)
            .then(|| registration.id.clone()),
    };

    match conflict {
        Some(id) => Err(ValidationError::RestoreConflict { id }),
        None => Ok(()),
    }
}

/// Permanently drop every item past its retention window. Returns the ids of
/// the purged items.
pub fn sweep(state: &mut State, today: NaiveDate) -> Vec<String> {
    let meta = state.meta;
    let mut purged = Vec::new();
    state.trash.retain(|item| {
        let keep = is_restorable(item, &meta, today);
        if !keep {
            purged.push(item.id.clone());
        }
        keep
    });
    purged
}

pub fn restorable_items(state: &State, today: NaiveDate) -> Vec<&TrashItem> {
    state
        .trash
        .iter()
        .filter(|item| is_restorable(item, &state.meta, today))
        .collect()
}
