use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::db::employees::ListFilter;
use crate::error::AppError;
use crate::handlers::employees::{
    CreateEmployee, DeleteEmployee, EmployeeInput, GetEmployee, ListEmployees, UpdateEmployee,
};
use crate::models::{Employee, EmployeeListItem};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<EmployeeListItem>>, AppError> {
    let request = ListEmployees {
        filter: ListFilter {
            department_id: query.department_id,
            position_id: query.position_id,
            is_active: query.is_active,
            search: query.search,
        },
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(request): Json<CreateEmployee>,
) -> Result<(StatusCode, Json<Employee>), AppError> {
    auth.require_admin_or_manager()?;
    let employee = state.mediator.send(request).await?;
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, AppError> {
    Ok(Json(state.mediator.send(GetEmployee { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<EmployeeInput>,
) -> Result<Json<Employee>, AppError> {
    auth.require_admin_or_manager()?;
    Ok(Json(state.mediator.send(UpdateEmployee { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin_or_manager()?;
    state.mediator.send(DeleteEmployee { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
