use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::skills::{CreateSkill, DeleteSkill, GetSkill, ListSkills, SkillInput, UpdateSkill};
use crate::models::Skill;
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub employee_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<Skill>>, AppError> {
    let request = ListSkills {
        employee_id: query.employee_id,
        search: query.search,
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(input): Json<SkillInput>,
) -> Result<(StatusCode, Json<Skill>), AppError> {
    auth.require_admin_or_manager()?;
    let skill = state.mediator.send(CreateSkill(input)).await?;
    Ok((StatusCode::CREATED, Json(skill)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Skill>, AppError> {
    Ok(Json(state.mediator.send(GetSkill { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<SkillInput>,
) -> Result<Json<Skill>, AppError> {
    auth.require_admin_or_manager()?;
    Ok(Json(state.mediator.send(UpdateSkill { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin_or_manager()?;
    state.mediator.send(DeleteSkill { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
