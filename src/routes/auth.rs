use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use crate::app::result::Failure;
use crate::auth::AuthUser;
use crate::error::AppError;
use crate::handlers::auth::{Login, Logout, Refresh, Register};
use crate::models::TokenPair;
use crate::state::SharedState;

pub async fn register(
    State(state): State<SharedState>,
    Json(request): Json<Register>,
) -> Result<(StatusCode, Json<TokenPair>), AppError> {
    let tokens = state.mediator.send(request).await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(request): Json<Login>,
) -> Result<Json<TokenPair>, AppError> {
    if state.login_limiter.check(&request.username).is_err() {
        return Err(AppError::RateLimited(
            "Too many login attempts. Please try again later.".to_string(),
        ));
    }

    let username = request.username.clone();
    match state.mediator.send(request).await {
        Ok(tokens) => {
            state.login_limiter.reset(&username);
            tracing::info!(username = %username, "User logged in");
            Ok(Json(tokens))
        }
        Err(failure @ Failure::Unauthorized(_)) => {
            state.login_limiter.record_failure(&username);
            Err(failure.into())
        }
        Err(failure) => Err(failure.into()),
    }
}

pub async fn refresh(
    State(state): State<SharedState>,
    Json(request): Json<Refresh>,
) -> Result<Json<TokenPair>, AppError> {
    Ok(Json(state.mediator.send(request).await?))
}

pub async fn logout(auth: AuthUser, State(state): State<SharedState>) -> Result<StatusCode, AppError> {
    state
        .mediator
        .send(Logout {
            token_id: auth.token_id,
        })
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
