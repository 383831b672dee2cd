use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::domain::{State, User};
use super::error::{AuthorizationError, DeskError};
use crate::calendar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Super,
    Admin,
    Intern,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Super => "super",
            Self::Admin => "admin",
            Self::Intern => "intern",
        }
    }

    pub const fn is_staff(self) -> bool {
        matches!(self, Self::Super | Self::Admin)
    }
}

/// Named permission flags gating mutating operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    CreateIntern,
    EditUser,
    DeleteUser,
    ResetPassword,
    DelegateAdmins,
    ManageHours,
    ManageProvas,
}

impl Capability {
    pub const ALL: [Self; 7] = [
        Self::CreateIntern,
        Self::EditUser,
        Self::DeleteUser,
        Self::ResetPassword,
        Self::DelegateAdmins,
        Self::ManageHours,
        Self::ManageProvas,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CreateIntern => "create_intern",
            Self::EditUser => "edit_user",
            Self::DeleteUser => "delete_user",
            Self::ResetPassword => "reset_password",
            Self::DelegateAdmins => "delegate_admins",
            Self::ManageHours => "manage_hours",
            Self::ManageProvas => "manage_provas",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-shape capability record stored on every user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Powers {
    pub create_intern: bool,
    pub edit_user: bool,
    pub delete_user: bool,
    pub reset_password: bool,
    pub delegate_admins: bool,
    pub manage_hours: bool,
    pub manage_provas: bool,
}

impl Powers {
    pub const fn all() -> Self {
        Self {
            create_intern: true,
            edit_user: true,
            delete_user: true,
            reset_password: true,
            delegate_admins: true,
            manage_hours: true,
            manage_provas: true,
        }
    }

    pub const fn none() -> Self {
        Self {
            create_intern: false,
            edit_user: false,
            delete_user: false,
            reset_password: false,
            delegate_admins: false,
            manage_hours: false,
            manage_provas: false,
        }
    }

    /// Default capability set handed to a freshly created user of `role`.
    pub const fn template(role: Role) -> Self {
        match role {
            Role::Super => Self::all(),
            Role::Admin => Self {
                delegate_admins: false,
                ..Self::all()
            },
            Role::Intern => Self::none(),
        }
    }

    pub const fn grants(&self, capability: Capability) -> bool {
        match capability {
            Capability::CreateIntern => self.create_intern,
            Capability::EditUser => self.edit_user,
            Capability::DeleteUser => self.delete_user,
            Capability::ResetPassword => self.reset_password,
            Capability::DelegateAdmins => self.delegate_admins,
            Capability::ManageHours => self.manage_hours,
            Capability::ManageProvas => self.manage_provas,
        }
    }

    pub fn is_empty(&self) -> bool {
        Capability::ALL
            .iter()
            .all(|capability| !self.grants(*capability))
    }
}

/// Whether `actor` may perform an action gated by `capability`.
pub fn has_power(actor: &User, capability: Capability) -> bool {
    actor.role == Role::Super || actor.powers.grants(capability)
}

/// Only a super user may switch `delegate_admins` on for somebody.
pub fn ensure_can_grant(
    actor: &User,
    current: &Powers,
    requested: &Powers,
) -> Result<(), AuthorizationError> {
    if requested.delegate_admins && !current.delegate_admins && actor.role != Role::Super {
        return Err(AuthorizationError::SuperOnly {
            action: "grant delegate_admins",
        });
    }
    Ok(())
}

/// The resolved acting user plus the instant the action is evaluated at.
#[derive(Debug, Clone)]
pub struct ActionContext {
    actor: User,
    now: DateTime<Utc>,
}

impl ActionContext {
    pub fn new(actor: User, now: DateTime<Utc>) -> Self {
        Self { actor, now }
    }

    pub fn resolve(state: &State, user_id: &str, now: DateTime<Utc>) -> Result<Self, DeskError> {
        let actor = state.user(user_id)?.clone();
        Ok(Self::new(actor, now))
    }

    pub fn actor(&self) -> &User {
        &self.actor
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn today(&self) -> NaiveDate {
        calendar::day_of(self.now)
    }

    pub fn require(&self, capability: Capability) -> Result<(), DeskError> {
        if has_power(&self.actor, capability) {
            Ok(())
        } else {
            Err(AuthorizationError::MissingCapability(capability).into())
        }
    }

    /// Interns act on their own records; everybody else needs `capability`.
    pub fn require_owner_or(&self, intern_id: &str, capability: Capability) -> Result<(), DeskError> {
        if self.actor.intern_id.as_deref() == Some(intern_id) {
            return Ok(());
        }
        self.require(capability)
    }

    pub fn require_staff(&self, action: &'static str) -> Result<(), DeskError> {
        if self.actor.role.is_staff() {
            Ok(())
        } else {
            Err(AuthorizationError::StaffOnly { action }.into())
        }
    }
}
