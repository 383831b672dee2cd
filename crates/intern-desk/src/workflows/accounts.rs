//! User administration: intern/admin creation, powers, pre-registrations.

use chrono::{DateTime, Utc};

use super::access::{ensure_can_grant, ActionContext, Capability, Powers, Role};
use super::domain::{
    new_id, Intern, MetaConfig, PendingRegistration, State, TrashItem, TrashPayload, User,
};
use super::error::{DeskError, EntityKind, ValidationError};

fn clean_name(name: &str) -> Result<String, ValidationError> {
    let name = name.trim();
    if name.is_empty() {
        Err(ValidationError::EmptyName)
    } else {
        Ok(name.to_string())
    }
}

/// Seed the single super user on an empty store. Returns `None` when one
/// already exists.
pub fn bootstrap_super(state: &mut State, name: &str, now: DateTime<Utc>) -> Option<User> {
    if state.super_user().is_some() {
        return None;
    }
    let user = User::new(name, Role::Super, now);
    state.users.push(user.clone());
    Some(user)
}

fn insert_intern_pair(state: &mut State, name: String, now: DateTime<Utc>) -> (User, Intern) {
    let intern = Intern::new(name.clone(), now);
    let mut user = User::new(name, Role::Intern, now);
    user.intern_id = Some(intern.id.clone());
    state.interns.push(intern.clone());
    state.users.push(user.clone());
    (user, intern)
}

pub fn create_intern(
    state: &mut State,
    ctx: &ActionContext,
    name: &str,
) -> Result<(User, Intern), DeskError> {
    ctx.require(Capability::CreateIntern)?;
    let name = clean_name(name)?;
    Ok(insert_intern_pair(state, name, ctx.now()))
}

pub fn create_admin(state: &mut State, ctx: &ActionContext, name: &str) -> Result<User, DeskError> {
    ctx.require(Capability::DelegateAdmins)?;
    let name = clean_name(name)?;
    let user = User::new(name, Role::Admin, ctx.now());
    state.users.push(user.clone());
    Ok(user)
}

pub fn update_powers(
    state: &mut State,
    ctx: &ActionContext,
    user_id: &str,
    powers: Powers,
) -> Result<User, DeskError> {
    ctx.require(Capability::EditUser)?;

    let target = state.user(user_id)?;
    match target.role {
        Role::Super => return Err(ValidationError::SuperUserProtected.into()),
        Role::Admin => ctx.require(Capability::DelegateAdmins)?,
        Role::Intern if !powers.is_empty() => return Err(ValidationError::InternPowers.into()),
        Role::Intern => {}
    }
    ensure_can_grant(ctx.actor(), &target.powers, &powers)?;

    let target = state.user_mut(user_id)?;
    target.powers = powers;
    Ok(target.clone())
}

pub fn set_self_password_change(
    state: &mut State,
    ctx: &ActionContext,
    user_id: &str,
    allowed: bool,
) -> Result<User, DeskError> {
    ctx.require(Capability::ResetPassword)?;
    let target = state.user_mut(user_id)?;
    target.self_password_change = allowed;
    Ok(target.clone())
}

/// Anonymous sign-up; no actor is involved.
pub fn submit_registration(
    state: &mut State,
    name: &str,
    now: DateTime<Utc>,
) -> Result<PendingRegistration, DeskError> {
    let registration = PendingRegistration {
        id: new_id(),
        name: clean_name(name)?,
        created_at: now,
    };
    state.pending_registrations.push(registration.clone());
    Ok(registration)
}

fn take_registration(
    state: &mut State,
    registration_id: &str,
) -> Result<PendingRegistration, DeskError> {
    let position = state
        .pending_registrations
        .iter()
        .position(|registration| registration.id == registration_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::Registration, registration_id))?;
    Ok(state.pending_registrations.remove(position))
}

pub fn approve_registration(
    state: &mut State,
    ctx: &ActionContext,
    registration_id: &str,
) -> Result<(User, Intern), DeskError> {
    ctx.require(Capability::CreateIntern)?;
    let registration = take_registration(state, registration_id)?;
    Ok(insert_intern_pair(state, registration.name, ctx.now()))
}

/// Rejected sign-ups are kept in the trash until retention expires.
pub fn reject_registration(
    state: &mut State,
    ctx: &ActionContext,
    registration_id: &str,
) -> Result<TrashItem, DeskError> {
    ctx.require(Capability::CreateIntern)?;
    let registration = take_registration(state, registration_id)?;
    let item = TrashItem {
        id: new_id(),
        deleted_at: ctx.now(),
        payload: TrashPayload::RejectedRegistration { registration },
    };
    state.trash.push(item.clone());
    Ok(item)
}

/// Replace the rule configuration. Values are range-checked as a whole before
/// anything is written.
pub fn save_meta(
    state: &mut State,
    ctx: &ActionContext,
    meta: MetaConfig,
) -> Result<MetaConfig, DeskError> {
    ctx.require_staff("change the rule configuration")?;
    meta.validate()?;
    state.meta = meta;
    Ok(meta)
}
