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
use crate::db::{self, ReadStore, Unique, UnitOfWork};
use crate::models::Role;

#[derive(Debug, Clone, Deserialize)]
pub struct RoleInput {
    pub role_name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateRole(pub RoleInput);

impl Request for CreateRole {
    type Response = Role;
}

#[derive(Debug, Clone)]
pub struct UpdateRole {
    pub id: Uuid,
    pub input: RoleInput,
}

impl Request for UpdateRole {
    type Response = Role;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteRole {
    pub id: Uuid,
}

impl Request for DeleteRole {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetRole {
    pub id: Uuid,
}

impl Request for GetRole {
    type Response = Role;
}

#[derive(Debug, Clone, Default)]
pub struct ListRoles {
    pub page: PageRequest,
}

impl Request for ListRoles {
    type Response = Paged<Role>;
}

impl Paginated for ListRoles {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct RoleValidator {
    store: Arc<dyn ReadStore>,
}

impl RoleValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &RoleInput, current: Option<Uuid>) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        if rules.text("role_name", &input.role_name, 50, "Role name")
            && self
                .store
                .is_taken(&Unique::RoleName(input.role_name.clone()), current)
                .await?
        {
            rules.push("role_name", "Role name already exists.");
        }
        rules.optional_text("description", input.description.as_deref(), 500, "Description");
        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreateRole> for RoleValidator {
    async fn validate(&self, request: &CreateRole) -> AppResult<Vec<Violation>> {
        self.check(&request.0, None).await
    }
}

#[async_trait]
impl Validator<UpdateRole> for RoleValidator {
    async fn validate(&self, request: &UpdateRole) -> AppResult<Vec<Violation>> {
        self.check(&request.input, Some(request.id)).await
    }
}

#[derive(Clone)]
pub struct RoleHandlers {
    pool: PgPool,
}

impl RoleHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreateRole> for RoleHandlers {
    async fn handle(&self, request: CreateRole) -> AppResult<Role> {
        let CreateRole(input) = request;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let role = Role {
                    id: Uuid::now_v7(),
                    role_name: input.role_name.trim().to_string(),
                    description: input.description,
                    created_at: Utc::now(),
                };
                uow.repository::<Role>().add(role.clone());
                Ok(role)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdateRole> for RoleHandlers {
    async fn handle(&self, request: UpdateRole) -> AppResult<Role> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let roles = uow.repository::<Role>();
                let mut role = roles
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Role"))?;

                role.role_name = request.input.role_name.trim().to_string();
                role.description = request.input.description;

                roles.update(role.clone());
                Ok(role)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeleteRole> for RoleHandlers {
    async fn handle(&self, request: DeleteRole) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let roles = uow.repository::<Role>();
                let role = roles
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Role"))?;
                roles.delete(&role);
                Ok(())
            })
            .await
            .map_err(|f| f.on_conflict("Cannot delete a role that is assigned to users."))
    }
}

#[async_trait]
impl Handler<GetRole> for RoleHandlers {
    async fn handle(&self, request: GetRole) -> AppResult<Role> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Role>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Role"))
    }
}

#[async_trait]
impl Handler<ListRoles> for RoleHandlers {
    async fn handle(&self, request: ListRoles) -> AppResult<Paged<Role>> {
        let (items, total) = db::roles::list(&self.pool, &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = RoleHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateRole>::new(handlers.clone()).validate(RoleValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateRole>::new(handlers.clone()).validate(RoleValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteRole>::new(handlers.clone()));
    mediator.register(Registration::<GetRole>::new(handlers.clone()));
    mediator.register(Registration::<ListRoles>::new(handlers).validate(PageValidator::new()));
}
