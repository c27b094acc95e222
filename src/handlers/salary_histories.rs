use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::app::result::{AppResult, Failure};
use crate::app::validation::{PageValidator, Paginated, Rules, Validator, Violation};
use crate::app::{Handler, Mediator, Registration, Request};
use crate::db::{self, ReadStore, Reference, UnitOfWork};
use crate::handlers::money;
use crate::models::SalaryHistory;

#[derive(Debug, Clone, Deserialize)]
pub struct SalaryHistoryInput {
    pub employee_id: Uuid,
    pub salary: Decimal,
    pub effective_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct CreateSalaryHistory(pub SalaryHistoryInput);

impl Request for CreateSalaryHistory {
    type Response = SalaryHistory;
}

#[derive(Debug, Clone)]
pub struct UpdateSalaryHistory {
    pub id: Uuid,
    pub input: SalaryHistoryInput,
}

impl Request for UpdateSalaryHistory {
    type Response = SalaryHistory;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteSalaryHistory {
    pub id: Uuid,
}

impl Request for DeleteSalaryHistory {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetSalaryHistory {
    pub id: Uuid,
}

impl Request for GetSalaryHistory {
    type Response = SalaryHistory;
}

#[derive(Debug, Clone, Default)]
pub struct ListSalaryHistories {
    pub employee_id: Option<Uuid>,
    pub page: PageRequest,
}

impl Request for ListSalaryHistories {
    type Response = Paged<SalaryHistory>;
}

impl Paginated for ListSalaryHistories {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct SalaryHistoryValidator {
    store: Arc<dyn ReadStore>,
}

impl SalaryHistoryValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &SalaryHistoryInput) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        rules.check(
            self.store.exists(Reference::Employee, input.employee_id).await?,
            "employee_id",
            "Employee does not exist.",
        );
        if rules.check(
            input.salary > Decimal::ZERO,
            "salary",
            "Salary must be greater than 0.",
        ) {
            rules.money("salary", input.salary, "Salary");
        }
        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreateSalaryHistory> for SalaryHistoryValidator {
    async fn validate(&self, request: &CreateSalaryHistory) -> AppResult<Vec<Violation>> {
        self.check(&request.0).await
    }
}

#[async_trait]
impl Validator<UpdateSalaryHistory> for SalaryHistoryValidator {
    async fn validate(&self, request: &UpdateSalaryHistory) -> AppResult<Vec<Violation>> {
        self.check(&request.input).await
    }
}

#[derive(Clone)]
pub struct SalaryHistoryHandlers {
    pool: PgPool,
}

impl SalaryHistoryHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreateSalaryHistory> for SalaryHistoryHandlers {
    async fn handle(&self, request: CreateSalaryHistory) -> AppResult<SalaryHistory> {
        let CreateSalaryHistory(input) = request;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let entry =
                    SalaryHistory::new(input.employee_id, money(input.salary), input.effective_date);
                uow.repository::<SalaryHistory>().add(entry.clone());
                Ok(entry)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdateSalaryHistory> for SalaryHistoryHandlers {
    async fn handle(&self, request: UpdateSalaryHistory) -> AppResult<SalaryHistory> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let histories = uow.repository::<SalaryHistory>();
                let mut entry = histories
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Salary history"))?;

                entry.employee_id = request.input.employee_id;
                entry.salary = money(request.input.salary);
                entry.effective_date = request.input.effective_date;

                histories.update(entry.clone());
                Ok(entry)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeleteSalaryHistory> for SalaryHistoryHandlers {
    async fn handle(&self, request: DeleteSalaryHistory) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let histories = uow.repository::<SalaryHistory>();
                let entry = histories
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Salary history"))?;
                histories.delete(&entry);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl Handler<GetSalaryHistory> for SalaryHistoryHandlers {
    async fn handle(&self, request: GetSalaryHistory) -> AppResult<SalaryHistory> {
        UnitOfWork::new(self.pool.clone())
            .repository::<SalaryHistory>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Salary history"))
    }
}

#[async_trait]
impl Handler<ListSalaryHistories> for SalaryHistoryHandlers {
    async fn handle(&self, request: ListSalaryHistories) -> AppResult<Paged<SalaryHistory>> {
        let (items, total) =
            db::salary_histories::list(&self.pool, request.employee_id, &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = SalaryHistoryHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateSalaryHistory>::new(handlers.clone())
            .validate(SalaryHistoryValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateSalaryHistory>::new(handlers.clone())
            .validate(SalaryHistoryValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteSalaryHistory>::new(handlers.clone()));
    mediator.register(Registration::<GetSalaryHistory>::new(handlers.clone()));
    mediator.register(
        Registration::<ListSalaryHistories>::new(handlers).validate(PageValidator::new()),
    );
}
