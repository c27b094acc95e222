use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::contracts::{
    ContractInput, CreateContract, DeleteContract, GetContract, ListContracts, UpdateContract,
};
use crate::models::Contract;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<Contract>>, AppError> {
    let request = ListContracts {
        employee_id: query.employee_id,
        status: query.status,
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<ContractInput>,
) -> Result<(StatusCode, Json<Contract>), AppError> {
    auth.require_admin_or_manager()?;
    let contract = state.mediator.send(CreateContract(input)).await?;
    Ok((StatusCode::CREATED, Json(contract)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Contract>, AppError> {
    Ok(Json(state.mediator.send(GetContract { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<ContractInput>,
) -> Result<Json<Contract>, AppError> {
    auth.require_admin_or_manager()?;
    Ok(Json(state.mediator.send(UpdateContract { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin_or_manager()?;
    state.mediator.send(DeleteContract { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
