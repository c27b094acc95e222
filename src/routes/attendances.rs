use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::db::attendances::ListFilter;
use crate::error::AppError;
use crate::handlers::attendances::{
    AttendanceInput, CheckIn, CheckOut, DeleteAttendance, GetAttendance, GetWorkHours,
    ListAttendances, UpdateAttendance,
};
use crate::models::{Attendance, WorkHours};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Deserialize)]
pub struct CheckOutBody {
    #[serde(default)]
    pub check_out: Option<DateTime<Utc>>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<Attendance>>, AppError> {
    let request = ListAttendances {
        filter: ListFilter {
            employee_id: query.employee_id,
            from: query.from,
            to: query.to,
        },
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn check_in(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(request): Json<CheckIn>,
) -> Result<(StatusCode, Json<Attendance>), AppError> {
    auth.require_role()?;
    let attendance = state.mediator.send(request).await?;
    Ok((StatusCode::CREATED, Json(attendance)))
}

pub async fn check_out(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<CheckOutBody>,
) -> Result<Json<Attendance>, AppError> {
    auth.require_role()?;
    let request = CheckOut {
        id,
        check_out: body.check_out,
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Attendance>, AppError> {
    Ok(Json(state.mediator.send(GetAttendance { id }).await?))
}

pub async fn work_hours(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkHours>, AppError> {
    Ok(Json(state.mediator.send(GetWorkHours { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<AttendanceInput>,
) -> Result<Json<Attendance>, AppError> {
    auth.require_admin_or_manager()?;
    Ok(Json(state.mediator.send(UpdateAttendance { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin_or_manager()?;
    state.mediator.send(DeleteAttendance { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
