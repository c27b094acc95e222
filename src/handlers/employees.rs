use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::app::result::{AppResult, Failure};
use crate::app::validation::{PageValidator, Paginated, Rules, Validator, Violation};
use crate::app::{Handler, Mediator, Registration, Request};
use crate::db::{self, ReadStore, Reference, Unique, UnitOfWork};
use crate::handlers::money;
use crate::models::{Employee, EmployeeListItem, SalaryHistory};

fn active_by_default() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmployeeInput {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub hire_date: NaiveDate,
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    #[serde(default = "active_by_default")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEmployee {
    #[serde(flatten)]
    pub input: EmployeeInput,
    /// Recorded as the first salary history entry, effective on the hire date.
    pub starting_salary: Option<Decimal>,
}

impl Request for CreateEmployee {
    type Response = Employee;
}

#[derive(Debug, Clone)]
pub struct UpdateEmployee {
    pub id: Uuid,
    pub input: EmployeeInput,
}

impl Request for UpdateEmployee {
    type Response = Employee;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteEmployee {
    pub id: Uuid,
}

impl Request for DeleteEmployee {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetEmployee {
    pub id: Uuid,
}

impl Request for GetEmployee {
    type Response = Employee;
}

#[derive(Debug, Clone, Default)]
pub struct ListEmployees {
    pub filter: db::employees::ListFilter,
    pub page: PageRequest,
}

impl Request for ListEmployees {
    type Response = Paged<EmployeeListItem>;
}

impl Paginated for ListEmployees {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct EmployeeValidator {
    store: Arc<dyn ReadStore>,
}

impl EmployeeValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &EmployeeInput, current: Option<Uuid>) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        rules.text("first_name", &input.first_name, 50, "First name");
        rules.text("last_name", &input.last_name, 50, "Last name");

        if rules.email("email", &input.email)
            && self
                .store
                .is_taken(&Unique::EmployeeEmail(input.email.clone()), current)
                .await?
        {
            rules.push("email", "Email is already in use.");
        }

        rules.optional_text("phone", input.phone.as_deref(), 20, "Phone");

        if let Some(date_of_birth) = input.date_of_birth {
            rules.check(
                date_of_birth < input.hire_date,
                "date_of_birth",
                "Date of birth must be before the hire date.",
            );
        }

        if let Some(department_id) = input.department_id {
            rules.check(
                self.store.exists(Reference::Department, department_id).await?,
                "department_id",
                "Department does not exist.",
            );
        }
        if let Some(position_id) = input.position_id {
            rules.check(
                self.store.exists(Reference::Position, position_id).await?,
                "position_id",
                "Position does not exist.",
            );
        }

        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreateEmployee> for EmployeeValidator {
    async fn validate(&self, request: &CreateEmployee) -> AppResult<Vec<Violation>> {
        let mut violations = self.check(&request.input, None).await?;
        if let Some(salary) = request.starting_salary {
            let mut rules = Rules::new();
            rules.money("starting_salary", salary, "Starting salary");
            violations.extend(rules.into_violations());
        }
        Ok(violations)
    }
}

#[async_trait]
impl Validator<UpdateEmployee> for EmployeeValidator {
    async fn validate(&self, request: &UpdateEmployee) -> AppResult<Vec<Violation>> {
        self.check(&request.input, Some(request.id)).await
    }
}

#[derive(Clone)]
pub struct EmployeeHandlers {
    pool: PgPool,
}

impl EmployeeHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreateEmployee> for EmployeeHandlers {
    async fn handle(&self, request: CreateEmployee) -> AppResult<Employee> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let input = request.input;
                let now = Utc::now();
                let employee = Employee {
                    id: Uuid::now_v7(),
                    first_name: input.first_name.trim().to_string(),
                    last_name: input.last_name.trim().to_string(),
                    email: input.email.trim().to_string(),
                    phone: input.phone,
                    date_of_birth: input.date_of_birth,
                    hire_date: input.hire_date,
                    department_id: input.department_id,
                    position_id: input.position_id,
                    is_active: input.is_active,
                    created_at: now,
                    updated_at: now,
                };
                uow.repository::<Employee>().add(employee.clone());

                if let Some(salary) = request.starting_salary {
                    uow.repository::<SalaryHistory>().add(SalaryHistory::new(
                        employee.id,
                        money(salary),
                        employee.hire_date,
                    ));
                }

                Ok(employee)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdateEmployee> for EmployeeHandlers {
    async fn handle(&self, request: UpdateEmployee) -> AppResult<Employee> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let employees = uow.repository::<Employee>();
                let mut employee = employees
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Employee"))?;

                let input = request.input;
                employee.first_name = input.first_name.trim().to_string();
                employee.last_name = input.last_name.trim().to_string();
                employee.email = input.email.trim().to_string();
                employee.phone = input.phone;
                employee.date_of_birth = input.date_of_birth;
                employee.hire_date = input.hire_date;
                employee.department_id = input.department_id;
                employee.position_id = input.position_id;
                employee.is_active = input.is_active;
                employee.updated_at = Utc::now();

                employees.update(employee.clone());
                Ok(employee)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeleteEmployee> for EmployeeHandlers {
    async fn handle(&self, request: DeleteEmployee) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let employees = uow.repository::<Employee>();
                let employee = employees
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Employee"))?;
                employees.delete(&employee);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl Handler<GetEmployee> for EmployeeHandlers {
    async fn handle(&self, request: GetEmployee) -> AppResult<Employee> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Employee>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Employee"))
    }
}

#[async_trait]
impl Handler<ListEmployees> for EmployeeHandlers {
    async fn handle(&self, request: ListEmployees) -> AppResult<Paged<EmployeeListItem>> {
        let (items, total) = db::employees::list(&self.pool, &request.filter, &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = EmployeeHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateEmployee>::new(handlers.clone())
            .validate(EmployeeValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateEmployee>::new(handlers.clone())
            .validate(EmployeeValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteEmployee>::new(handlers.clone()));
    mediator.register(Registration::<GetEmployee>::new(handlers.clone()));
    mediator.register(Registration::<ListEmployees>::new(handlers).validate(PageValidator::new()));
}
