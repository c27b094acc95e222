use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::roles::{CreateRole, DeleteRole, GetRole, ListRoles, RoleInput, UpdateRole};
use crate::models::Role;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<Role>>, AppError> {
    let request = ListRoles {
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<RoleInput>,
) -> Result<(StatusCode, Json<Role>), AppError> {
    auth.require_admin()?;
    let role = state.mediator.send(CreateRole(input)).await?;
    Ok((StatusCode::CREATED, Json(role)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Role>, AppError> {
    Ok(Json(state.mediator.send(GetRole { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<RoleInput>,
) -> Result<Json<Role>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.mediator.send(UpdateRole { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    state.mediator.send(DeleteRole { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
