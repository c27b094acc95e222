use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::salary_histories::{
    CreateSalaryHistory, DeleteSalaryHistory, GetSalaryHistory, ListSalaryHistories,
    SalaryHistoryInput, UpdateSalaryHistory,
};
use crate::models::SalaryHistory;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<SalaryHistory>>, AppError> {
    let request = ListSalaryHistories {
        employee_id: query.employee_id,
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<SalaryHistoryInput>,
) -> Result<(StatusCode, Json<SalaryHistory>), AppError> {
    auth.require_admin_or_manager()?;
    let entry = state.mediator.send(CreateSalaryHistory(input)).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SalaryHistory>, AppError> {
    Ok(Json(state.mediator.send(GetSalaryHistory { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SalaryHistoryInput>,
) -> Result<Json<SalaryHistory>, AppError> {
    auth.require_admin_or_manager()?;
    Ok(Json(state.mediator.send(UpdateSalaryHistory { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin_or_manager()?;
    state.mediator.send(DeleteSalaryHistory { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
