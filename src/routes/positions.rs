use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::positions::{
    CreatePosition, DeletePosition, GetPosition, ListPositions, PositionInput, UpdatePosition,
};
use crate::models::Position;
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
) -> Result<Json<Paged<Position>>, AppError> {
    let request = ListPositions {
        search: query.search,
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<PositionInput>,
) -> Result<(StatusCode, Json<Position>), AppError> {
    auth.require_admin()?;
    let position = state.mediator.send(CreatePosition(input)).await?;
    Ok((StatusCode::CREATED, Json(position)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Position>, AppError> {
    Ok(Json(state.mediator.send(GetPosition { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<PositionInput>,
) -> Result<Json<Position>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.mediator.send(UpdatePosition { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    state.mediator.send(DeletePosition { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
