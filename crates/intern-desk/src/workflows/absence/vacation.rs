use chrono::NaiveDate;

use crate::calendar;
use crate::workflows::access::{ActionContext, Capability};
use crate::workflows::audit::{self, AuditAction};
use crate::workflows::domain::{
    new_id, MetaConfig, PautaRecord, State, VacationRequest, VacationStatus,
};
use crate::workflows::error::{DeskError, EntityKind, PolicyBlock, ValidationError};

pub const MIN_VACATION_DAYS: u32 = 5;
pub const MAX_VACATION_DAYS: u32 = 30;

/// Earliest allowed vacation start: the day after the `dataPauta` of the
/// record with the latest `dataConferencia`. `None` when no pauta is known.
pub fn pauta_deadline(pautas: &[PautaRecord]) -> Option<NaiveDate> {
    pautas
        .iter()
        .max_by_key(|pauta| pauta.data_conferencia)
        .map(|pauta| calendar::add_days(pauta.data_pauta, 1))
}

/// Record the pauta published for a conference day, replacing any earlier
/// record for the same day. Staff only.
pub fn upsert_pauta(
    state: &mut State,
    ctx: &ActionContext,
    data_conferencia: NaiveDate,
    data_pauta: NaiveDate,
) -> Result<PautaRecord, DeskError> {
    ctx.require_staff("publish pautas")?;

    if let Some(existing) = state
        .pautas
        .iter_mut()
        .find(|pauta| pauta.data_conferencia == data_conferencia)
    {
        existing.data_pauta = data_pauta;
        return Ok(existing.clone());
    }

    let record = PautaRecord {
        id: new_id(),
        data_conferencia,
        data_pauta,
    };
    state.pautas.push(record.clone());
    state.pautas.sort_by_key(|pauta| pauta.data_conferencia);
    Ok(record)
}

fn validate_length(days: u32) -> Result<(), ValidationError> {
    if days < MIN_VACATION_DAYS {
        return Err(ValidationError::VacationTooShort {
            days,
            min: MIN_VACATION_DAYS,
        });
    }
    if days > MAX_VACATION_DAYS {
        return Err(ValidationError::VacationTooLong {
            days,
            max: MAX_VACATION_DAYS,
        });
    }
    Ok(())
}

pub fn request_vacation(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    start_date: NaiveDate,
    days: u32,
) -> Result<VacationRequest, DeskError> {
    ctx.require_owner_or(intern_id, Capability::ManageProvas)?;
    validate_length(days)?;

    if let Some(earliest) = pauta_deadline(&state.pautas) {
        if start_date < earliest {
            return Err(PolicyBlock::PautaDeadline {
                start_date,
                earliest,
            }
            .into());
        }
    }

    let intern = state.intern_mut(intern_id)?;
    let request = VacationRequest {
        id: new_id(),
        start_date,
        days,
        dates: calendar::consecutive_days(start_date, days),
        status: VacationStatus::Pending,
        created_at: ctx.now(),
        decided_by: None,
        decided_at: None,
    };

    audit::record(
        intern,
        ctx,
        AuditAction::CreateVacation,
        format!(
            "vacation of {days} days requested from {start_date} to {}",
            request.end_date()
        ),
    );
    intern.vacations.push(request.clone());
    Ok(request)
}

/// Approved vacations are frozen. Pending ones freeze once their start is
/// closer than `vacationBlockDays`. Rejected ones are off the schedule and
/// can always be cleared.
pub fn ensure_vacation_mutable(
    vacation: &VacationRequest,
    meta: &MetaConfig,
    today: NaiveDate,
) -> Result<(), PolicyBlock> {
    match vacation.status {
        VacationStatus::Approved => {
            return Err(PolicyBlock::ApprovedVacationLocked {
                vacation_id: vacation.id.clone(),
            })
        }
        VacationStatus::Rejected => return Ok(()),
        VacationStatus::Pending => {}
    }

    let days_remaining = calendar::days_between(today, vacation.start_date);
    if days_remaining < i64::from(meta.vacation_block_days) {
        return Err(PolicyBlock::VacationChangeLocked {
            start_date: vacation.start_date,
            days_remaining,
            block_days: meta.vacation_block_days,
        });
    }
    Ok(())
}

pub fn delete_vacation(
    state: &mut State,
    ctx: &ActionContext,
    intern_id: &str,
    vacation_id: &str,
) -> Result<VacationRequest, DeskError> {
    ctx.require_owner_or(intern_id, Capability::ManageProvas)?;

    let meta = state.meta;
    let intern = state.intern_mut(intern_id)?;
    let position = intern
        .vacations
        .iter()
        .position(|vacation| vacation.id == vacation_id)
        .ok_or_else(|| DeskError::not_found(EntityKind::Vacation, vacation_id))?;

    ensure_vacation_mutable(&intern.vacations[position], &meta, ctx.today())?;

    let removed = intern.vacations.remove(position);
    audit::record(
        intern,
        ctx,
        AuditAction::DeleteVacation,
        format!(
            "{} vacation from {} to {} deleted",
            removed.status,
            removed.start_date,
            removed.end_date()
        ),
    );
    Ok(removed)
}
