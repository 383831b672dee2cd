//! Per-intern hours ledger: bank credits and negative debits with compensation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::access::{ActionContext, Capability};
use super::audit::{self, AuditAction, NotificationKind};
use super::domain::{new_id, EntryType, HoursEntry, Intern, State};
use super::error::{DeskError, EntityKind, ValidationError};

/// Caller-supplied fields for creating or editing an entry. `hours` is the
/// unsigned magnitude; the sign is derived from `entry_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryDraft {
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub hours: f64,
    pub reason: String,
    #[serde(default)]
    pub compensated: bool,
}

impl EntryDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if !self.hours.is_finite() || self.hours <= 0.0 {
            return Err(ValidationError::NonPositiveHours { value: self.hours });
        }
        if self.reason.trim().is_empty() {
            return Err(ValidationError::EmptyReason);
        }
        Ok(())
    }

    fn signed_hours(&self) -> f64 {
        self.entry_type.signed(self.hours)
    }

    /// Compensation is only carried by negative entries.
    fn effective_compensated(&self) -> bool {
        self.entry_type == EntryType::Negative && self.compensated
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub bank: f64,
    pub negative: f64,
    pub net: f64,
}

impl LedgerSummary {
    /// Each entry lands in exactly one bucket, chosen by the sign of `hours`.
    pub fn from_entries(entries: &[HoursEntry]) -> Self {
        let (bank, negative) = entries
            .iter()
            .fold((0.0_f64, 0.0_f64), |(bank, negative), entry| {
                if entry.hours > 0.0 {
                    (bank + entry.hours, negative)
                } else if entry.hours < 0.0 && !entry.compensated {
                    (bank, negative + entry.hours.abs())
                } else {
                    (bank, negative)
                }
            });

        Self {
            bank,
            negative,
            net: bank - negative,
        }
    }
}

pub fn summarize(intern: &Intern) -> LedgerSummary {
    LedgerSummary::from_entries(&intern.hours)
}

pub fn create_entry(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    draft: EntryDraft,
) -> Result<HoursEntry, DeskError> {
    ctx.require(Capability::ManageHours)?;
    draft.validate()?;

    let intern = state.intern_mut(intern_id)?;
    let actor = ctx.actor();
    let compensated = draft.effective_compensated();
    let entry = HoursEntry {
        id: new_id(),
        date: draft.date,
        entry_type: draft.entry_type,
        hours: draft.signed_hours(),
        reason: draft.reason.trim().to_string(),
        compensated,
        created_by_id: actor.id.clone(),
        created_by_name: actor.name.clone(),
        created_at: ctx.now(),
        last_modified_by: None,
        last_modified_at: None,
        compensated_by: compensated.then(|| actor.name.clone()),
        compensated_at: compensated.then(|| ctx.now()),
    };

    audit::record(
        intern,
        ctx,
        AuditAction::CreateEntry,
        format!("added {}", entry.describe()),
    );
    intern.hours.push(entry.clone());
    Ok(entry)
}

pub fn edit_entry(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    entry_id: &str,
    draft: EntryDraft,
) -> Result<HoursEntry, DeskError> {
    ctx.require(Capability::ManageHours)?;
    draft.validate()?;

    let intern = state.intern_mut(intern_id)?;
    let entry = intern
        .hours
        .iter_mut()
        .find(|entry| entry.id == entry_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::HoursEntry, entry_id))?;

    let before = entry.describe();
    let compensated = draft.effective_compensated();
    if compensated != entry.compensated {
        entry.compensated_by = compensated.then(|| ctx.actor().name.clone());
        entry.compensated_at = compensated.then(|| ctx.now());
    }
    entry.date = draft.date;
    entry.entry_type = draft.entry_type;
    entry.hours = draft.signed_hours();
    entry.reason = draft.reason.trim().to_string();
    entry.compensated = compensated;
    entry.last_modified_by = Some(ctx.actor().name.clone());
    entry.last_modified_at = Some(ctx.now());

    let updated = entry.clone();
    audit::record(
        intern,
        ctx,
        AuditAction::EditEntry,
        format!("changed {before} to {}", updated.describe()),
    );
    Ok(updated)
}

pub fn delete_entry(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    entry_id: &str,
) -> Result<HoursEntry, DeskError> {
    ctx.require(Capability::ManageHours)?;

    let intern = state.intern_mut(intern_id)?;
    let position = intern
        .hours
        .iter()
        .position(|entry| entry.id == entry_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::HoursEntry, entry_id))?;

    let removed = intern.hours.remove(position);
    let description = format!("removed {}", removed.describe());
    audit::record(intern, ctx, AuditAction::DeleteEntry, description.clone());

    let actor_id = ctx.actor().id.clone();
    if let Some(owner) = state.owner_of_mut(intern_id) {
        if owner.id != actor_id {
            audit::notify(
                owner,
                NotificationKind::HoursEntryDeleted,
                format!("{} {}", ctx.actor().name, description),
                ctx.now(),
            );
        }
    }

    Ok(removed)
}

/// Mark a negative entry as offset (or undo it).
pub fn set_compensated(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    entry_id: &str,
    compensated: bool,
) -> Result<HoursEntry, DeskError> {
    ctx.require(Capability::ManageHours)?;

    let intern = state.intern_mut(intern_id)?;
    let entry = intern
        .hours
        .iter_mut()
        .find(|entry| entry.id == entry_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::HoursEntry, entry_id))?;

    if entry.entry_type != EntryType::Negative {
        return Err(ValidationError::CompensationOnBankEntry {
            entry_id: entry_id.to_string(),
        }
        .into());
    }
    if entry.compensated == compensated {
        return Ok(entry.clone());
    }

    entry.compensated = compensated;
    if compensated {
        entry.compensated_by = Some(ctx.actor().name.clone());
        entry.compensated_at = Some(ctx.now());
    } else {
        entry.compensated_by = None;
        entry.compensated_at = None;
    }

    let updated = entry.clone();
    let action = if compensated {
        AuditAction::Compensated
    } else {
        AuditAction::Uncompensated
    };
    audit::record(intern, ctx, action, updated.describe());
    Ok(updated)
}
