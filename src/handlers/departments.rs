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
use crate::db::{self, ReadStore, Reference, Unique, UnitOfWork};
use crate::models::Department;

#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentInput {
    pub department_name: String,
    pub location: Option<String>,
    pub manager_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct CreateDepartment(pub DepartmentInput);

impl Request for CreateDepartment {
    type Response = Department;
}

#[derive(Debug, Clone)]
pub struct UpdateDepartment {
    pub id: Uuid,
    pub input: DepartmentInput,
}

impl Request for UpdateDepartment {
    type Response = Department;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteDepartment {
    pub id: Uuid,
}

impl Request for DeleteDepartment {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetDepartment {
    pub id: Uuid,
}

impl Request for GetDepartment {
    type Response = Department;
}

#[derive(Debug, Clone, Default)]
pub struct ListDepartments {
    pub search: Option<String>,
    pub page: PageRequest,
}

impl Request for ListDepartments {
    type Response = Paged<Department>;
}

impl Paginated for ListDepartments {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct DepartmentValidator {
    store: Arc<dyn ReadStore>,
}

impl DepartmentValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &DepartmentInput, current: Option<Uuid>) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        if rules.text("department_name", &input.department_name, 100, "Department name")
            && self
                .store
                .is_taken(&Unique::DepartmentName(input.department_name.clone()), current)
                .await?
        {
            rules.push("department_name", "Department name already exists.");
        }

        rules.optional_text("location", input.location.as_deref(), 200, "Location");

        if let Some(manager_id) = input.manager_id {
            rules.check(
                self.store.exists(Reference::Employee, manager_id).await?,
                "manager_id",
                "Manager does not exist.",
            );
        }

        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreateDepartment> for DepartmentValidator {
    async fn validate(&self, request: &CreateDepartment) -> AppResult<Vec<Violation>> {
        self.check(&request.0, None).await
    }
}

#[async_trait]
impl Validator<UpdateDepartment> for DepartmentValidator {
    async fn validate(&self, request: &UpdateDepartment) -> AppResult<Vec<Violation>> {
        self.check(&request.input, Some(request.id)).await
    }
}

#[derive(Clone)]
pub struct DepartmentHandlers {
    pool: PgPool,
}

impl DepartmentHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreateDepartment> for DepartmentHandlers {
    async fn handle(&self, request: CreateDepartment) -> AppResult<Department> {
        let CreateDepartment(input) = request;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let department = Department::new(
                    input.department_name.trim().to_string(),
                    input.location,
                    input.manager_id,
                );
                uow.repository::<Department>().add(department.clone());
                Ok(department)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdateDepartment> for DepartmentHandlers {
    async fn handle(&self, request: UpdateDepartment) -> AppResult<Department> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let departments = uow.repository::<Department>();
                let mut department = departments
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Department"))?;

                department.department_name = request.input.department_name.trim().to_string();
                department.location = request.input.location;
                department.manager_id = request.input.manager_id;
                department.updated_at = Utc::now();

                departments.update(department.clone());
                Ok(department)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeleteDepartment> for DepartmentHandlers {
    async fn handle(&self, request: DeleteDepartment) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let departments = uow.repository::<Department>();
                let department = departments
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Department"))?;
                departments.delete(&department);
                Ok(())
            })
            .await
            .map_err(|f| f.on_conflict("Cannot delete a department that still has employees."))
    }
}

#[async_trait]
impl Handler<GetDepartment> for DepartmentHandlers {
    async fn handle(&self, request: GetDepartment) -> AppResult<Department> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Department>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Department"))
    }
}

#[async_trait]
impl Handler<ListDepartments> for DepartmentHandlers {
    async fn handle(&self, request: ListDepartments) -> AppResult<Paged<Department>> {
        let (items, total) =
            db::departments::list(&self.pool, request.search.as_deref(), &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = DepartmentHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateDepartment>::new(handlers.clone())
            .validate(DepartmentValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateDepartment>::new(handlers.clone())
            .validate(DepartmentValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteDepartment>::new(handlers.clone()));
    mediator.register(Registration::<GetDepartment>::new(handlers.clone()));
    mediator.register(
        Registration::<ListDepartments>::new(handlers).validate(PageValidator::new()),
    );
}
