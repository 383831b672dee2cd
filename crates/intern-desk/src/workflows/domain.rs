use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::access::{Powers, Role};
use super::audit::{AuditLogEntry, Notification};
use super::error::{DeskError, EntityKind, ValidationError};

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// The whole shared document: loaded wholesale, mutated, written back wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    #[serde(default)]
    pub users: Vec<User>,
    #[serde(default)]
    pub interns: Vec<Intern>,
    #[serde(default)]
    pub meta: MetaConfig,
    #[serde(default)]
    pub pending_registrations: Vec<PendingRegistration>,
    #[serde(default)]
    pub trash: Vec<TrashItem>,
    #[serde(default)]
    pub pautas: Vec<PautaRecord>,
}

impl State {
    pub fn user(&self, user_id: &str) -> Result<&User, DeskError> {
        self.users
            .iter()
            .find(|user| user.id == user_id)
            .ok_or_else(|| DeskError::not_found(EntityKind::User, user_id))
    }

    pub fn user_mut(&mut self, user_id: &str) -> Result<&mut User, DeskError> {
        self.users
            .iter_mut()
            .find(|user| user.id == user_id)
            .ok_or_else(|| DeskError::not_found(EntityKind::User, user_id))
    }

    pub fn intern(&self, intern_id: &str) -> Result<&Intern, DeskError> {
        self.interns
            .iter()
            .find(|intern| intern.id == intern_id)
            .ok_or_else(|| DeskError::not_found(EntityKind::Intern, intern_id))
    }

    pub fn intern_mut(&mut self, intern_id: &str) -> Result<&mut Intern, DeskError> {
        self.interns
            .iter_mut()
            .find(|intern| intern.id == intern_id)
            .ok_or_else(|| DeskError::not_found(EntityKind::Intern, intern_id))
    }

    /// The login bound to an intern, if any.
    pub fn owner_of_mut(&mut self, intern_id: &str) -> Option<&mut User> {
        self.users
            .iter_mut()
            .find(|user| user.intern_id.as_deref() == Some(intern_id))
    }

    pub fn super_user(&self) -> Option<&User> {
        self.users.iter().find(|user| user.role == Role::Super)
    }
}

/// Process-wide rule configuration. Read fresh from the state on every rule
/// evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MetaConfig {
    pub prova_block_days: u32,
    pub vacation_block_days: u32,
    pub trash_retention_days: u32,
}

impl MetaConfig {
    pub const PROVA_BLOCK_DAYS: (u32, u32) = (0, 30);
    pub const VACATION_BLOCK_DAYS: (u32, u32) = (0, 90);
    pub const TRASH_RETENTION_DAYS: (u32, u32) = (1, 30);

    pub fn validate(&self) -> Result<(), ValidationError> {
        check_range(
            "provaBlockDays",
            self.prova_block_days,
            Self::PROVA_BLOCK_DAYS,
        )?;
        check_range(
            "vacationBlockDays",
            self.vacation_block_days,
            Self::VACATION_BLOCK_DAYS,
        )?;
        check_range(
            "trashRetentionDays",
            self.trash_retention_days,
            Self::TRASH_RETENTION_DAYS,
        )
    }
}

impl Default for MetaConfig {
    fn default() -> Self {
        Self {
            prova_block_days: 5,
            vacation_block_days: 30,
            trash_retention_days: 10,
        }
    }
}

fn check_range(field: &'static str, value: u32, (min, max): (u32, u32)) -> Result<(), ValidationError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ValidationError::ConfigOutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub powers: Powers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub intern_id: Option<String>,
    #[serde(default)]
    pub self_password_change: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub notifications: Vec<Notification>,
}

impl User {
    pub fn new(name: impl Into<String>, role: Role, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            role,
            powers: Powers::template(role),
            intern_id: None,
            self_password_change: role == Role::Intern,
            created_at,
            notifications: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Intern {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub dates: Vec<ExamLeaveRecord>,
    #[serde(default)]
    pub vacations: Vec<VacationRequest>,
    #[serde(default)]
    pub hours: Vec<HoursEntry>,
    #[serde(default)]
    pub audit_log: Vec<AuditLogEntry>,
    pub created_at: DateTime<Utc>,
}

impl Intern {
    pub fn new(name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
            dates: Vec::new(),
            vacations: Vec::new(),
            hours: Vec::new(),
            audit_log: Vec::new(),
            created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamLeaveRecord {
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VacationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VacationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }

    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for VacationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VacationRequest {
    pub id: String,
    pub start_date: NaiveDate,
    pub days: u32,
    pub dates: Vec<NaiveDate>,
    pub status: VacationStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decided_at: Option<DateTime<Utc>>,
}

impl VacationRequest {
    pub fn end_date(&self) -> NaiveDate {
        self.dates.last().copied().unwrap_or(self.start_date)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Bank,
    Negative,
}

impl EntryType {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Negative => "negative",
        }
    }

    /// Apply the sign carried by this entry type to a positive magnitude.
    pub fn signed(self, magnitude: f64) -> f64 {
        match self {
            Self::Bank => magnitude.abs(),
            Self::Negative => -magnitude.abs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoursEntry {
    pub id: String,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub hours: f64,
    pub reason: String,
    #[serde(default)]
    pub compensated: bool,
    pub created_by_id: String,
    pub created_by_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensated_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compensated_at: Option<DateTime<Utc>>,
}

impl HoursEntry {
    pub fn describe(&self) -> String {
        format!(
            "{:.2}h {} on {} ({})",
            self.hours.abs(),
            self.entry_type.label(),
            self.date,
            self.reason
        )
    }
}

/// Self-service sign-up awaiting an administrator's decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingRegistration {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

/// Docket record; the latest one defines the earliest vacation start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PautaRecord {
    pub id: String,
    pub data_conferencia: NaiveDate,
    pub data_pauta: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrashItem {
    pub id: String,
    pub deleted_at: DateTime<Utc>,
    pub payload: TrashPayload,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrashPayload {
    DeletedUser {
        user: User,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        intern: Option<Intern>,
    },
    RejectedRegistration {
        registration: PendingRegistration,
    },
}

impl TrashPayload {
    pub fn label(&self) -> String {
        match self {
            TrashPayload::DeletedUser { user, .. } => format!("user {}", user.name),
            TrashPayload::RejectedRegistration { registration } => {
                format!("registration {}", registration.name)
            }
        }
    }
}
