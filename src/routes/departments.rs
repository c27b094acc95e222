use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::departments::{
    CreateDepartment, DeleteDepartment, DepartmentInput, GetDepartment, ListDepartments,
    UpdateDepartment,
};
use crate::models::Department;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<Department>>, AppError> {
    let request = ListDepartments {
        search: query.search,
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<DepartmentInput>,
) -> Result<(StatusCode, Json<Department>), AppError> {
    auth.require_admin()?;
    let department = state.mediator.send(CreateDepartment(input)).await?;
    Ok((StatusCode::CREATED, Json(department)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Department>, AppError> {
    Ok(Json(state.mediator.send(GetDepartment { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<DepartmentInput>,
) -> Result<Json<Department>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.mediator.send(UpdateDepartment { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    state.mediator.send(DeleteDepartment { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
