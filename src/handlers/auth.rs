use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::result::{AppResult, Failure};
use crate::app::validation::{Rules, Validator, Violation};
use crate::app::{Handler, Mediator, Registration, Request};
use crate::auth::jwt::{self, ACCESS_TOKEN_TTL_SECS, Claims};
use crate::auth::{password, token};
use crate::config::JwtConfig;
use crate::db::{self, ReadStore, Reference, Unique, UnitOfWork};
use crate::handlers::users::{new_user, password_rules, username_rules};
use crate::models::{ADMIN, TokenPair, User, UserRole, UserToken};

const REFRESH_TOKEN_TTL_DAYS: i64 = 7;
const BOOTSTRAP_LOCK: i64 = 1;
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Creates the first account, which becomes an administrator. Closed once
/// any user exists.
#[derive(Debug, Clone, Deserialize)]
pub struct Register {
    pub username: String,
    pub password: String,
    pub employee_id: Option<Uuid>,
}

impl Request for Register {
    type Response = TokenPair;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Login {
    pub username: String,
    pub password: String,
}

impl Request for Login {
    type Response = TokenPair;
}

#[derive(Debug, Clone, Deserialize)]
pub struct Refresh {
    pub refresh_token: String,
}

impl Request for Refresh {
    type Response = TokenPair;
}

/// Revokes the token pair the caller authenticated with.
#[derive(Debug, Clone, Copy)]
pub struct Logout {
    pub token_id: Uuid,
}

impl Request for Logout {
    type Response = ();
}

pub struct RegisterValidator {
    store: Arc<dyn ReadStore>,
}

impl RegisterValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Validator<Register> for RegisterValidator {
    async fn validate(&self, request: &Register) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        if username_rules(&mut rules, &request.username)
            && self
                .store
                .is_taken(&Unique::Username(request.username.clone()), None)
                .await?
        {
            rules.push("username", "Username is already taken.");
        }
        password_rules(&mut rules, "password", &request.password);
        if let Some(employee_id) = request.employee_id {
            rules.check(
                self.store.exists(Reference::Employee, employee_id).await?,
                "employee_id",
                "Employee does not exist.",
            );
        }
        Ok(rules.into_violations())
    }
}

pub struct LoginValidator;

#[async_trait]
impl Validator<Login> for LoginValidator {
    async fn validate(&self, request: &Login) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        rules.required("username", &request.username, "Username");
        rules.required("password", &request.password, "Password");
        Ok(rules.into_violations())
    }
}

pub struct RefreshValidator;

#[async_trait]
impl Validator<Refresh> for RefreshValidator {
    async fn validate(&self, request: &Refresh) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        rules.required("refresh_token", &request.refresh_token, "Refresh token");
        Ok(rules.into_violations())
    }
}

#[derive(Clone)]
pub struct AuthHandlers {
    pool: PgPool,
    jwt: JwtConfig,
}

/// A freshly issued pair: the row to store and the clear tokens to return.
struct Issued {
    row: UserToken,
    pair: TokenPair,
}

impl AuthHandlers {
    pub fn new(pool: PgPool, jwt: JwtConfig) -> Self {
        Self { pool, jwt }
    }

    async fn role_names(&self, user_id: Uuid) -> AppResult<Vec<String>> {
        let roles = db::roles::list_for_user(&self.pool, user_id).await?;
        Ok(roles.into_iter().map(|r| r.role_name).collect())
    }

    /// Signs an access token bound to `token_id` and draws a new refresh token.
    fn issue(&self, user: &User, roles: Vec<String>, token_id: Uuid) -> AppResult<Issued> {
        let now = Utc::now();
        let claims = Claims::new(user.id, user.username.clone(), roles, token_id, now, &self.jwt);
        let access_token = jwt::encode_token(&claims, &self.jwt).map_err(Failure::Unexpected)?;
        let refresh_token = token::generate_refresh_token();
        let access_expires_at = now + Duration::seconds(ACCESS_TOKEN_TTL_SECS);

        let row = UserToken {
            id: token_id,
            user_id: user.id,
            access_token_hash: token::hash_token(&access_token),
            access_expires_at,
            refresh_token_hash: token::hash_token(&refresh_token),
            refresh_expires_at: now + Duration::days(REFRESH_TOKEN_TTL_DAYS),
            created_at: now,
        };

        Ok(Issued {
            row,
            pair: TokenPair {
                access_token,
                refresh_token,
                token_type: "Bearer".to_string(),
                expires_at: access_expires_at,
            },
        })
    }

    async fn sign_in(&self, user: &User) -> AppResult<TokenPair> {
        let roles = self.role_names(user.id).await?;
        let issued = self.issue(user, roles, Uuid::now_v7())?;

        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                uow.repository::<UserToken>().add(issued.row);
                Ok(issued.pair)
            })
            .await
    }
}

#[async_trait]
impl Handler<Register> for AuthHandlers {
    async fn handle(&self, request: Register) -> AppResult<TokenPair> {
        let admin = db::roles::find_by_name(&self.pool, ADMIN)
            .await?
            .ok_or_else(|| Failure::Unexpected(format!("Role {ADMIN} is not seeded")))?;

        let user = UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                // Serializes concurrent bootstrap attempts.
                uow.advisory_lock(BOOTSTRAP_LOCK).await?;

                let users = uow.repository::<User>();
                if users.count().await? > 0 {
                    return Err(Failure::Forbidden(
                        "Registration is disabled. Contact your system administrator.".to_string(),
                    ));
                }

                let user = new_user(request.employee_id, &request.username, &request.password, true)?;
                users.add(user.clone());
                uow.repository::<UserRole>().add(UserRole {
                    user_id: user.id,
                    role_id: admin.id,
                });
                Ok(user)
            })
            .await?;

        tracing::info!(user_id = %user.id, username = %user.username, "Administrator registered");
        self.sign_in(&user).await
    }
}

#[async_trait]
impl Handler<Login> for AuthHandlers {
    async fn handle(&self, request: Login) -> AppResult<TokenPair> {
        let user = db::users::find_by_username(&self.pool, &request.username)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(|| Failure::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        let valid = password::verify(&request.password, &user.password_hash, &user.password_salt)
            .map_err(Failure::Unexpected)?;
        if !valid {
            tracing::debug!(username = %user.username, "Login rejected");
            return Err(Failure::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        self.sign_in(&user).await
    }
}

#[async_trait]
impl Handler<Refresh> for AuthHandlers {
    async fn handle(&self, request: Refresh) -> AppResult<TokenPair> {
        let invalid = || Failure::Unauthorized("Invalid or expired refresh token".to_string());

        let stored = db::user_tokens::find_by_refresh_hash(
            &self.pool,
            &token::hash_token(&request.refresh_token),
        )
        .await?
        .filter(|t| t.is_refresh_valid(Utc::now()))
        .ok_or_else(invalid)?;

        let user = UnitOfWork::new(self.pool.clone())
            .repository::<User>()
            .find(stored.user_id)
            .await?
            .filter(|u| u.is_active)
            .ok_or_else(invalid)?;

        // Rotation: the old pair is revoked together with issuing the new one.
        let roles = self.role_names(user.id).await?;
        let issued = self.issue(&user, roles, Uuid::now_v7())?;

        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let tokens = uow.repository::<UserToken>();
                tokens.delete(&stored);
                tokens.add(issued.row);
                Ok(issued.pair)
            })
            .await
    }
}

#[async_trait]
impl Handler<Logout> for AuthHandlers {
    async fn handle(&self, request: Logout) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let tokens = uow.repository::<UserToken>();
                let stored = tokens
                    .find(request.token_id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Token"))?;
                tokens.delete(&stored);
                Ok(())
            })
            .await
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>, jwt: &JwtConfig) {
    let handlers = AuthHandlers::new(pool.clone(), jwt.clone());

    mediator.register(
        Registration::<Register>::new(handlers.clone()).validate(RegisterValidator::new(store.clone())),
    );
    mediator.register(Registration::<Login>::new(handlers.clone()).validate(LoginValidator));
    mediator.register(Registration::<Refresh>::new(handlers.clone()).validate(RefreshValidator));
    mediator.register(Registration::<Logout>::new(handlers));
}
