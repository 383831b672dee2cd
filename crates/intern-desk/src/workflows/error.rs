use chrono::NaiveDate;
use std::fmt;

use super::access::Capability;
use super::domain::VacationStatus;
use crate::store::StoreError;

/// Failure returned by every desk operation. A failed operation leaves the
/// state it was given untouched.
#[derive(Debug, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    Authorization(#[from] AuthorizationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Blocked(#[from] PolicyBlock),
    #[error("{kind} `{id}` not found")]
    NotFound { kind: EntityKind, id: String },
    #[error("state could not be persisted: {0}")]
    Persistence(#[from] StoreError),
}

impl DeskError {
    pub(crate) fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// Short machine-readable category used by API payloads and logs.
    pub const fn category(&self) -> &'static str {
        match self {
            DeskError::Authorization(_) => "authorization",
            DeskError::Validation(_) => "validation",
            DeskError::Blocked(_) => "blocked_by_policy",
            DeskError::NotFound { .. } => "not_found",
            DeskError::Persistence(_) => "persistence",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("missing capability `{0}`")]
    MissingCapability(Capability),
    #[error("only the super user may {action}")]
    SuperOnly { action: &'static str },
    #[error("only administrators may {action}")]
    StaffOnly { action: &'static str },
}

/// Malformed or out-of-range input, rejected before any mutation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("hours must be a positive number (got {value})")]
    NonPositiveHours { value: f64 },
    #[error("a reason is required")]
    EmptyReason,
    #[error("a name is required")]
    EmptyName,
    #[error("'{raw}' is not a YYYY-MM-DD date")]
    InvalidDate { raw: String },
    #[error("vacation must span at least {min} days (requested {days})")]
    VacationTooShort { days: u32, min: u32 },
    #[error("vacation may span at most {max} days (requested {days})")]
    VacationTooLong { days: u32, max: u32 },
    #[error("link '{link}' uses a scheme other than http or https")]
    UnsafeLink { link: String },
    #[error("link '{link}' is not a valid address")]
    InvalidLink { link: String },
    #[error("entry `{entry_id}` is a bank entry and cannot be compensated")]
    CompensationOnBankEntry { entry_id: String },
    #[error("vacation cannot move from {from} to {to}")]
    InvalidTransition {
        from: VacationStatus,
        to: VacationStatus,
    },
    #[error("approval requires both confirmations")]
    MissingAcknowledgement,
    #[error("{field} must be between {min} and {max} (got {value})")]
    ConfigOutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
    #[error("the super user cannot be deleted or edited")]
    SuperUserProtected,
    #[error("users cannot delete themselves")]
    SelfDeletion,
    #[error("intern accounts do not carry administrative powers")]
    InternPowers,
    #[error("trash item `{item_id}` is past its retention window")]
    RetentionExpired { item_id: String },
    #[error("cannot restore `{id}`: an entity with that id already exists")]
    RestoreConflict { id: String },
}

/// Well-formed input that a business rule currently refuses.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyBlock {
    #[error("exam leave on {date} falls inside the blocking window; the earliest bookable date is {earliest}")]
    ExamLeaveWindow { date: NaiveDate, earliest: NaiveDate },
    #[error("vacations cannot start before {earliest} because of the current pauta (requested {start_date})")]
    PautaDeadline {
        start_date: NaiveDate,
        earliest: NaiveDate,
    },
    #[error("vacation starting {start_date} can no longer be changed: changes close {block_days} days before the start ({days_remaining} left)")]
    VacationChangeLocked {
        start_date: NaiveDate,
        days_remaining: i64,
        block_days: u32,
    },
    #[error("vacation `{vacation_id}` is approved and cannot be deleted")]
    ApprovedVacationLocked { vacation_id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    User,
    Intern,
    HoursEntry,
    ExamLeave,
    Vacation,
    Registration,
    TrashItem,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::User => "user",
            EntityKind::Intern => "intern",
            EntityKind::HoursEntry => "hours entry",
            EntityKind::ExamLeave => "exam leave",
            EntityKind::Vacation => "vacation",
            EntityKind::Registration => "registration",
            EntityKind::TrashItem => "trash item",
        };
        f.write_str(label)
    }
}
