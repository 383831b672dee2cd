use chrono::NaiveDate;
use serde::Serialize;

use super::link::sanitize_link;
use crate::calendar;
use crate::workflows::access::{ActionContext, Capability};
use crate::workflows::audit::{self, AuditAction};
use crate::workflows::domain::{ExamLeaveRecord, MetaConfig, State};
use crate::workflows::error::{DeskError, EntityKind, PolicyBlock};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "record", rename_all = "snake_case")]
pub enum ExamLeaveOutcome {
    Recorded(ExamLeaveRecord),
    /// A record for the date already existed; nothing was written.
    AlreadyRecorded(ExamLeaveRecord),
}

impl ExamLeaveOutcome {
    pub fn record(&self) -> &ExamLeaveRecord {
        match self {
            Self::Recorded(record) | Self::AlreadyRecorded(record) => record,
        }
    }
}

/// First date an exam leave can be booked for: strictly after `today + provaBlockDays`.
pub fn earliest_exam_leave(today: NaiveDate, meta: &MetaConfig) -> NaiveDate {
    calendar::add_days(today, i64::from(meta.prova_block_days) + 1)
}

pub fn request_exam_leave(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    date: NaiveDate,
    link: Option<&str>,
) -> Result<ExamLeaveOutcome, DeskError> {
    ctx.require_owner_or(intern_id, Capability::ManageProvas)?;

    let earliest = earliest_exam_leave(ctx.today(), &state.meta);
    let intern = state.intern_mut(intern_id)?;
    if date < earliest {
        return Err(PolicyBlock::ExamLeaveWindow { date, earliest }.into());
    }
    let link = match link {
        Some(raw) => sanitize_link(raw)?,
        None => None,
    };

    if let Some(existing) = intern.dates.iter().find(|record| record.date == date) {
        return Ok(ExamLeaveOutcome::AlreadyRecorded(existing.clone()));
    }

    let record = ExamLeaveRecord { date, link };
    intern.dates.push(record.clone());
    intern.dates.sort_by_key(|record| record.date);
    audit::record(
        intern,
        ctx,
        AuditAction::CreateProva,
        format!("exam leave requested for {date}"),
    );
    Ok(ExamLeaveOutcome::Recorded(record))
}

/// Removal has no window check.
pub fn remove_exam_leave(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    date: NaiveDate,
) -> Result<ExamLeaveRecord, DeskError> {
    ctx.require_owner_or(intern_id, Capability::ManageProvas)?;

    let intern = state.intern_mut(intern_id)?;
    let position = intern
        .dates
        .iter()
        .position(|record| record.date == date)
        .ok_or_else(|| DeskError::not_found(EntityKind::ExamLeave, date.to_string()))?;

    let removed = intern.dates.remove(position);
    audit::record(
        intern,
        ctx,
        AuditAction::RemoveProva,
        format!("exam leave on {date} removed"),
    );
    Ok(removed)
}
