use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use serde_json::json;

use super::absence::{self, ExamLeaveOutcome};
use super::access::{Capability, Powers};
use super::accounts;
use super::approval::{self, Acknowledgements, ApprovalProof};
use super::domain::MetaConfig;
use super::ledger::{self, EntryDraft};
use super::retention;
use crate::calendar;
use crate::error::AppError;
use crate::service::DeskService;
use crate::store::StateStore;

pub const ACTOR_HEADER: &str = "x-actor-id";

type Service<S> = Arc<DeskService<S>>;

/// Router exposing every desk operation. The acting user is identified by
/// the `x-actor-id` header, resolved by the surrounding gateway.
pub fn desk_router<S>(service: Service<S>) -> Router
where
    S: StateStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/interns/:intern_id/hours",
            post(create_entry_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/hours/summary",
            get(summary_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/hours/:entry_id",
            put(edit_entry_handler::<S>).delete(delete_entry_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/hours/:entry_id/compensation",
            post(compensation_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/exam-leave",
            post(exam_leave_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/exam-leave/:date",
            delete(remove_exam_leave_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/vacations",
            post(vacation_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/vacations/:vacation_id",
            delete(delete_vacation_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/vacations/:vacation_id/approve",
            post(approve_handler::<S>),
        )
        .route(
            "/api/v1/interns/:intern_id/vacations/:vacation_id/reject",
            post(reject_handler::<S>),
        )
        .route(
            "/api/v1/meta",
            get(meta_handler::<S>).put(save_meta_handler::<S>),
        )
        .route(
            "/api/v1/pautas",
            get(pautas_handler::<S>).put(upsert_pauta_handler::<S>),
        )
        .route("/api/v1/interns", post(create_intern_handler::<S>))
        .route("/api/v1/admins", post(create_admin_handler::<S>))
        .route("/api/v1/users/:user_id", delete(delete_user_handler::<S>))
        .route(
            "/api/v1/users/:user_id/powers",
            put(update_powers_handler::<S>),
        )
        .route("/api/v1/registrations", post(submit_registration_handler::<S>))
        .route(
            "/api/v1/registrations/:registration_id/approve",
            post(approve_registration_handler::<S>),
        )
        .route(
            "/api/v1/registrations/:registration_id/reject",
            post(reject_registration_handler::<S>),
        )
        .route(
            "/api/v1/trash/:item_id/restore",
            post(restore_handler::<S>),
        )
        .route("/api/v1/trash/sweep", post(sweep_handler::<S>))
        .with_state(service)
}

fn actor_id(headers: &HeaderMap) -> Result<String, AppError> {
    headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or(AppError::Unauthenticated)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PautaBody {
    data_conferencia: NaiveDate,
    data_pauta: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NameBody {
    name: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct CompensationRequest {
    compensated: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ExamLeaveRequest {
    date: NaiveDate,
    #[serde(default)]
    link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct VacationBody {
    start_date: NaiveDate,
    days: u32,
}

pub(crate) async fn summary_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(intern_id): Path<String>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let summary = service.read(&actor, Utc::now(), |state, ctx| {
        ctx.require_owner_or(&intern_id, Capability::ManageHours)?;
        Ok(ledger::summarize(state.intern(&intern_id)?))
    })?;
    Ok(Json(summary).into_response())
}

pub(crate) async fn create_entry_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(intern_id): Path<String>,
    Json(draft): Json<EntryDraft>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let entry = service.execute(&actor, Utc::now(), "create_entry", |state, ctx| {
        ledger::create_entry(state, ctx, &intern_id, draft)
    })?;
    Ok((StatusCode::CREATED, Json(entry)).into_response())
}

pub(crate) async fn edit_entry_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, entry_id)): Path<(String, String)>,
    Json(draft): Json<EntryDraft>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let entry = service.execute(&actor, Utc::now(), "edit_entry", |state, ctx| {
        ledger::edit_entry(state, ctx, &intern_id, &entry_id, draft)
    })?;
    Ok(Json(entry).into_response())
}

pub(crate) async fn delete_entry_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, entry_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let removed = service.execute(&actor, Utc::now(), "delete_entry", |state, ctx| {
        ledger::delete_entry(state, ctx, &intern_id, &entry_id)
    })?;
    Ok(Json(removed).into_response())
}

pub(crate) async fn compensation_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, entry_id)): Path<(String, String)>,
    Json(body): Json<CompensationRequest>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let entry = service.execute(&actor, Utc::now(), "set_compensated", |state, ctx| {
        ledger::set_compensated(state, ctx, &intern_id, &entry_id, body.compensated)
    })?;
    Ok(Json(entry).into_response())
}

pub(crate) async fn exam_leave_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(intern_id): Path<String>,
    Json(body): Json<ExamLeaveRequest>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let outcome = service.execute(&actor, Utc::now(), "create_prova", |state, ctx| {
        absence::request_exam_leave(state, ctx, &intern_id, body.date, body.link.as_deref())
    })?;
    let status = match outcome {
        ExamLeaveOutcome::Recorded(_) => StatusCode::CREATED,
        ExamLeaveOutcome::AlreadyRecorded(_) => StatusCode::OK,
    };
    Ok((status, Json(outcome)).into_response())
}

pub(crate) async fn remove_exam_leave_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, raw_date)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let date = calendar::parse_date(&raw_date).map_err(|err| AppError::Desk(err.into()))?;
    let removed = service.execute(&actor, Utc::now(), "remove_prova", |state, ctx| {
        absence::remove_exam_leave(state, ctx, &intern_id, date)
    })?;
    Ok(Json(removed).into_response())
}

pub(crate) async fn vacation_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(intern_id): Path<String>,
    Json(body): Json<VacationBody>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let request = service.execute(&actor, Utc::now(), "create_vacation", |state, ctx| {
        absence::request_vacation(state, ctx, &intern_id, body.start_date, body.days)
    })?;
    Ok((StatusCode::CREATED, Json(request)).into_response())
}

pub(crate) async fn delete_vacation_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, vacation_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let removed = service.execute(&actor, Utc::now(), "delete_vacation", |state, ctx| {
        absence::delete_vacation(state, ctx, &intern_id, &vacation_id)
    })?;
    Ok(Json(removed).into_response())
}

pub(crate) async fn approve_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, vacation_id)): Path<(String, String)>,
    Json(acknowledgements): Json<Acknowledgements>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let proof = ApprovalProof::confirm(acknowledgements).map_err(|err| AppError::Desk(err.into()))?;
    let decided = service.execute(&actor, Utc::now(), "approve_vacation", |state, ctx| {
        approval::approve_vacation(state, ctx, &intern_id, &vacation_id, proof)
    })?;
    Ok(Json(decided).into_response())
}

pub(crate) async fn reject_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path((intern_id, vacation_id)): Path<(String, String)>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let decided = service.execute(&actor, Utc::now(), "reject_vacation", |state, ctx| {
        approval::reject_vacation(state, ctx, &intern_id, &vacation_id)
    })?;
    Ok(Json(decided).into_response())
}

pub(crate) async fn meta_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let meta = service.read(&actor, Utc::now(), |state, _ctx| Ok(state.meta))?;
    Ok(Json(meta).into_response())
}

pub(crate) async fn save_meta_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Json(meta): Json<MetaConfig>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let meta = service.execute(&actor, Utc::now(), "save_meta", |state, ctx| {
        accounts::save_meta(state, ctx, meta)
    })?;
    Ok(Json(meta).into_response())
}

pub(crate) async fn pautas_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let pautas = service.read(&actor, Utc::now(), |state, _ctx| Ok(state.pautas.clone()))?;
    Ok(Json(pautas).into_response())
}

pub(crate) async fn upsert_pauta_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Json(body): Json<PautaBody>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let pauta = service.execute(&actor, Utc::now(), "upsert_pauta", |state, ctx| {
        absence::upsert_pauta(state, ctx, body.data_conferencia, body.data_pauta)
    })?;
    Ok(Json(pauta).into_response())
}

pub(crate) async fn create_intern_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Json(body): Json<NameBody>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let (user, intern) = service.execute(&actor, Utc::now(), "create_intern", |state, ctx| {
        accounts::create_intern(state, ctx, &body.name)
    })?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "intern": intern })),
    )
        .into_response())
}

pub(crate) async fn create_admin_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Json(body): Json<NameBody>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let user = service.execute(&actor, Utc::now(), "create_admin", |state, ctx| {
        accounts::create_admin(state, ctx, &body.name)
    })?;
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

pub(crate) async fn update_powers_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
    Json(powers): Json<Powers>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let user = service.execute(&actor, Utc::now(), "update_powers", |state, ctx| {
        accounts::update_powers(state, ctx, &user_id, powers)
    })?;
    Ok(Json(user).into_response())
}

/// Self-service sign-up; the only route without an acting user.
pub(crate) async fn submit_registration_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    Json(body): Json<NameBody>,
) -> Result<Response, AppError> {
    let now = Utc::now();
    let registration = service.execute_system("submit_registration", |state| {
        accounts::submit_registration(state, &body.name, now)
    })?;
    Ok((StatusCode::ACCEPTED, Json(registration)).into_response())
}

pub(crate) async fn approve_registration_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let (user, intern) =
        service.execute(&actor, Utc::now(), "approve_registration", |state, ctx| {
            accounts::approve_registration(state, ctx, &registration_id)
        })?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "intern": intern })),
    )
        .into_response())
}

pub(crate) async fn reject_registration_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(registration_id): Path<String>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let item = service.execute(&actor, Utc::now(), "reject_registration", |state, ctx| {
        accounts::reject_registration(state, ctx, &registration_id)
    })?;
    Ok(Json(json!({ "trashItemId": item.id })).into_response())
}

pub(crate) async fn delete_user_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(user_id): Path<String>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let item = service.execute(&actor, Utc::now(), "delete_user", |state, ctx| {
        retention::delete_user(state, ctx, &user_id)
    })?;
    Ok(Json(json!({ "trashItemId": item.id, "deletedAt": item.deleted_at })).into_response())
}

pub(crate) async fn restore_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
    Path(item_id): Path<String>,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let item = service.execute(&actor, Utc::now(), "restore_trash_item", |state, ctx| {
        retention::restore(state, ctx, &item_id)
    })?;
    Ok(Json(json!({ "restored": item.payload.label() })).into_response())
}

pub(crate) async fn sweep_handler<S: StateStore + 'static>(
    State(service): State<Service<S>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let actor = actor_id(&headers)?;
    let purged = service.execute(&actor, Utc::now(), "sweep_trash", |state, ctx| {
        ctx.require_staff("purge the trash")?;
        Ok(retention::sweep(state, ctx.today()))
    })?;
    Ok(Json(json!({ "purged": purged })).into_response())
}
