use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::app::result::{AppResult, Failure};
use crate::app::validation::{PageValidator, Paginated, Rules, Validator, Violation};
use crate::app::{Handler, Mediator, Registration, Request};
use crate::auth::password;
use crate::db::{self, ReadStore, Reference, Unique, UnitOfWork};
use crate::models::{User, UserDetails, UserRole};

pub const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub employee_id: Option<Uuid>,
    pub username: String,
    pub password: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
    #[serde(default)]
    pub role_ids: Vec<Uuid>,
}

impl Request for CreateUser {
    type Response = UserDetails;
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserInput {
    pub employee_id: Option<Uuid>,
    pub username: String,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub id: Uuid,
    pub input: UserInput,
}

impl Request for UpdateUser {
    type Response = UserDetails;
}

#[derive(Debug, Clone)]
pub struct ResetPassword {
    pub id: Uuid,
    pub new_password: String,
}

impl Request for ResetPassword {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteUser {
    pub id: Uuid,
}

impl Request for DeleteUser {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetUser {
    pub id: Uuid,
}

impl Request for GetUser {
    type Response = UserDetails;
}

#[derive(Debug, Clone, Default)]
pub struct ListUsers {
    pub search: Option<String>,
    pub page: PageRequest,
}

impl Request for ListUsers {
    type Response = Paged<User>;
}

impl Paginated for ListUsers {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

#[derive(Debug, Clone, Copy)]
pub struct AssignRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
}

impl Request for AssignRole {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct RemoveRole {
    pub user_id: Uuid,
    pub role_id: Uuid,
}

impl Request for RemoveRole {
    type Response = ();
}

/// Username format and length. Shared with self-registration.
pub(crate) fn username_rules(rules: &mut Rules, username: &str) -> bool {
    rules.text("username", username, 50, "Username")
        && rules.check(
            username
                .trim()
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')),
            "username",
            "Username may only contain letters, digits, '.', '_' and '-'.",
        )
}

pub(crate) fn password_rules(rules: &mut Rules, field: &str, password: &str) {
    let len = password.chars().count();
    rules.check(
        (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len),
        field,
        format!("Password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters."),
    );
}

/// A new active-or-not user with a freshly salted password hash.
pub(crate) fn new_user(
    employee_id: Option<Uuid>,
    username: &str,
    plain_password: &str,
    is_active: bool,
) -> AppResult<User> {
    let hashed = password::hash(plain_password).map_err(Failure::Unexpected)?;
    let now = Utc::now();
    Ok(User {
        id: Uuid::now_v7(),
        employee_id,
        username: username.trim().to_string(),
        password_hash: hashed.hash,
        password_salt: hashed.salt,
        is_active,
        created_at: now,
        updated_at: now,
    })
}

pub struct UserValidator {
    store: Arc<dyn ReadStore>,
}

impl UserValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(
        &self,
        rules: &mut Rules,
        username: &str,
        employee_id: Option<Uuid>,
        current: Option<Uuid>,
    ) -> AppResult<()> {
        if username_rules(rules, username)
            && self
                .store
                .is_taken(&Unique::Username(username.to_string()), current)
                .await?
        {
            rules.push("username", "Username is already taken.");
        }

        if let Some(employee_id) = employee_id {
            rules.check(
                self.store.exists(Reference::Employee, employee_id).await?,
                "employee_id",
                "Employee does not exist.",
            );
        }
        Ok(())
    }
}

#[async_trait]
impl Validator<CreateUser> for UserValidator {
    async fn validate(&self, request: &CreateUser) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        self.check(&mut rules, &request.username, request.employee_id, None)
            .await?;
        password_rules(&mut rules, "password", &request.password);

        for role_id in &request.role_ids {
            rules.check(
                self.store.exists(Reference::Role, *role_id).await?,
                "role_ids",
                format!("Role {role_id} does not exist."),
            );
        }

        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<UpdateUser> for UserValidator {
    async fn validate(&self, request: &UpdateUser) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        self.check(
            &mut rules,
            &request.input.username,
            request.input.employee_id,
            Some(request.id),
        )
        .await?;
        Ok(rules.into_violations())
    }
}

pub struct ResetPasswordValidator;

#[async_trait]
impl Validator<ResetPassword> for ResetPasswordValidator {
    async fn validate(&self, request: &ResetPassword) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        password_rules(&mut rules, "new_password", &request.new_password);
        Ok(rules.into_violations())
    }
}

pub struct AssignRoleValidator {
    store: Arc<dyn ReadStore>,
}

impl AssignRoleValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Validator<AssignRole> for AssignRoleValidator {
    async fn validate(&self, request: &AssignRole) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        let user_exists = rules.check(
            self.store.exists(Reference::User, request.user_id).await?,
            "user_id",
            "User does not exist.",
        );
        let role_exists = rules.check(
            self.store.exists(Reference::Role, request.role_id).await?,
            "role_id",
            "Role does not exist.",
        );

        if user_exists && role_exists {
            let assignment = Unique::UserRole {
                user_id: request.user_id,
                role_id: request.role_id,
            };
            rules.check(
                !self.store.is_taken(&assignment, None).await?,
                "role_id",
                "User already has this role.",
            );
        }

        Ok(rules.into_violations())
    }
}

#[derive(Clone)]
pub struct UserHandlers {
    pool: PgPool,
}

impl UserHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access tokens embed roles; drop them when the user loses rights.
    async fn revoke_sessions(&self, user_id: Uuid) -> AppResult<()> {
        let revoked = db::user_tokens::delete_for_user(&self.pool, user_id).await?;
        tracing::info!(user_id = %user_id, revoked, "Sessions revoked");
        Ok(())
    }

    async fn details(&self, user: User) -> AppResult<UserDetails> {
        let roles = db::roles::list_for_user(&self.pool, user.id).await?;
        Ok(UserDetails { user, roles })
    }
}

#[async_trait]
impl Handler<CreateUser> for UserHandlers {
    async fn handle(&self, request: CreateUser) -> AppResult<UserDetails> {
        let user = UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let user = new_user(
                    request.employee_id,
                    &request.username,
                    &request.password,
                    request.is_active,
                )?;
                uow.repository::<User>().add(user.clone());

                let user_roles = uow.repository::<UserRole>();
                for role_id in request.role_ids {
                    user_roles.add(UserRole {
                        user_id: user.id,
                        role_id,
                    });
                }
                Ok(user)
            })
            .await
            .map_err(|f| f.on_conflict("Username is already taken."))?;

        tracing::info!(user_id = %user.id, username = %user.username, "User created");
        self.details(user).await
    }
}

#[async_trait]
impl Handler<UpdateUser> for UserHandlers {
    async fn handle(&self, request: UpdateUser) -> AppResult<UserDetails> {
        let user = UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let users = uow.repository::<User>();
                let mut user = users
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("User"))?;

                user.employee_id = request.input.employee_id;
                user.username = request.input.username.trim().to_string();
                user.is_active = request.input.is_active;
                user.updated_at = Utc::now();

                users.update(user.clone());
                Ok(user)
            })
            .await?;

        if !user.is_active {
            self.revoke_sessions(user.id).await?;
        }
        self.details(user).await
    }
}

#[async_trait]
impl Handler<ResetPassword> for UserHandlers {
    async fn handle(&self, request: ResetPassword) -> AppResult<()> {
        let user_id = request.id;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let users = uow.repository::<User>();
                let mut user = users
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("User"))?;

                let hashed = password::hash(&request.new_password).map_err(Failure::Unexpected)?;
                user.password_hash = hashed.hash;
                user.password_salt = hashed.salt;
                user.updated_at = Utc::now();

                users.update(user);
                Ok(())
            })
            .await?;

        tracing::info!(user_id = %user_id, "Password reset");
        Ok(())
    }
}

#[async_trait]
impl Handler<DeleteUser> for UserHandlers {
    async fn handle(&self, request: DeleteUser) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let users = uow.repository::<User>();
                let user = users
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("User"))?;
                users.delete(&user);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl Handler<GetUser> for UserHandlers {
    async fn handle(&self, request: GetUser) -> AppResult<UserDetails> {
        let user = UnitOfWork::new(self.pool.clone())
            .repository::<User>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("User"))?;
        self.details(user).await
    }
}

#[async_trait]
impl Handler<ListUsers> for UserHandlers {
    async fn handle(&self, request: ListUsers) -> AppResult<Paged<User>> {
        let (items, total) =
            db::users::list(&self.pool, request.search.as_deref(), &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

#[async_trait]
impl Handler<AssignRole> for UserHandlers {
    async fn handle(&self, request: AssignRole) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                uow.repository::<UserRole>().add(UserRole {
                    user_id: request.user_id,
                    role_id: request.role_id,
                });
                Ok(())
            })
            .await
            .map_err(|f| f.on_conflict("User already has this role."))
    }
}

#[async_trait]
impl Handler<RemoveRole> for UserHandlers {
    async fn handle(&self, request: RemoveRole) -> AppResult<()> {
        let user_id = request.user_id;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let user_roles = uow.repository::<UserRole>();
                let assignment = user_roles
                    .find((request.user_id, request.role_id))
                    .await?
                    .ok_or_else(|| Failure::NotFound("User does not have this role.".to_string()))?;
                user_roles.delete(&assignment);
                Ok(())
            })
            .await?;

        self.revoke_sessions(user_id).await
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = UserHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateUser>::new(handlers.clone()).validate(UserValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateUser>::new(handlers.clone()).validate(UserValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<ResetPassword>::new(handlers.clone()).validate(ResetPasswordValidator),
    );
    mediator.register(Registration::<DeleteUser>::new(handlers.clone()));
    mediator.register(Registration::<GetUser>::new(handlers.clone()));
    mediator.register(Registration::<ListUsers>::new(handlers.clone()).validate(PageValidator::new()));
    mediator.register(
        Registration::<AssignRole>::new(handlers.clone())
            .validate(AssignRoleValidator::new(store.clone())),
    );
    mediator.register(Registration::<RemoveRole>::new(handlers));
}
