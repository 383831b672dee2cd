//! Append-only audit trail per intern and per-user notification queues.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::access::ActionContext;
use super::domain::{new_id, Intern, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    CreateEntry,
    EditEntry,
    DeleteEntry,
    Compensated,
    Uncompensated,
    CreateProva,
    RemoveProva,
    CreateVacation,
    DeleteVacation,
    ApproveVacation,
    RejectVacation,
    DeleteIntern,
    RestoreIntern,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    pub action: AuditAction,
    pub by_user_id: String,
    pub by_user_name: String,
    pub at: DateTime<Utc>,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    HoursEntryDeleted,
    VacationApproved,
    VacationRejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub is_read: bool,
    pub message: String,
}

/// Append an audit record attributed to the acting user.
pub(crate) fn record(
    intern: &mut Intern,
    ctx: &ActionContext,
    action: AuditAction,
    details: impl Into<String>,
) {
    let actor = ctx.actor();
    intern.audit_log.push(AuditLogEntry {
        id: new_id(),
        action,
        by_user_id: actor.id.clone(),
        by_user_name: actor.name.clone(),
        at: ctx.now(),
        details: details.into(),
    });
}

/// Queue a notification on the affected user's own inbox.
pub fn notify(
    user: &mut User,
    kind: NotificationKind,
    message: impl Into<String>,
    at: DateTime<Utc>,
) {
    user.notifications.push(Notification {
        id: new_id(),
        kind,
        timestamp: at,
        is_read: false,
        message: message.into(),
    });
}

pub fn unread(user: &User) -> impl Iterator<Item = &Notification> {
    user.notifications
        .iter()
        .filter(|notification| !notification.is_read)
}

/// Most recent audit records first.
pub fn history(intern: &Intern, limit: usize) -> Vec<&AuditLogEntry> {
    intern.audit_log.iter().rev().take(limit).collect()
}
