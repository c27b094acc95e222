use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::users::{
    AssignRole, CreateUser, DeleteUser, GetUser, ListUsers, RemoveRole, ResetPassword, UpdateUser,
    UserInput,
};
use crate::models::{User, UserDetails};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

#[derive(Deserialize)]
pub struct ResetPasswordBody {
    pub new_password: String,
}

pub async fn list(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Paged<User>>, AppError> {
    let request = ListUsers {
        search: query.search,
        page: PageRequest::from_query(query.page, query.page_size),
    };
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(request): Json<CreateUser>,
) -> Result<(StatusCode, Json<UserDetails>), AppError> {
    auth.require_admin()?;
    let user = state.mediator.send(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get(
    _auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetails>, AppError> {
    Ok(Json(state.mediator.send(GetUser { id }).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(input): Json<UserInput>,
) -> Result<Json<UserDetails>, AppError> {
    auth.require_admin()?;
    Ok(Json(state.mediator.send(UpdateUser { id, input }).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    if id == auth.user_id {
        return Err(AppError::BadRequest("You cannot delete your own account".to_string()));
    }
    state.mediator.send(DeleteUser { id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ResetPasswordBody>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    let request = ResetPassword {
        id,
        new_password: body.new_password,
    };
    state.mediator.send(request).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    state.mediator.send(AssignRole { user_id, role_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_role(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((user_id, role_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;
    state.mediator.send(RemoveRole { user_id, role_id }).await?;
    Ok(StatusCode::NO_CONTENT)
}
