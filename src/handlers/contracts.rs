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
use crate::db::{self, ReadStore, Reference, UnitOfWork};
use crate::handlers::money;
use crate::models::{CONTRACT_STATUSES, CONTRACT_TYPES, Contract};

#[derive(Debug, Clone, Deserialize)]
pub struct ContractInput {
    pub employee_id: Uuid,
    pub contract_type: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub salary: Decimal,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct CreateContract(pub ContractInput);

impl Request for CreateContract {
    type Response = Contract;
}

#[derive(Debug, Clone)]
pub struct UpdateContract {
    pub id: Uuid,
    pub input: ContractInput,
}

impl Request for UpdateContract {
    type Response = Contract;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteContract {
    pub id: Uuid,
}

impl Request for DeleteContract {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetContract {
    pub id: Uuid,
}

impl Request for GetContract {
    type Response = Contract;
}

#[derive(Debug, Clone, Default)]
pub struct ListContracts {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
    pub page: PageRequest,
}

impl Request for ListContracts {
    type Response = Paged<Contract>;
}

impl Paginated for ListContracts {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct ContractValidator {
    store: Arc<dyn ReadStore>,
}

impl ContractValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &ContractInput) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        rules.check(
            self.store.exists(Reference::Employee, input.employee_id).await?,
            "employee_id",
            "Employee does not exist.",
        );
        rules.one_of("contract_type", &input.contract_type, CONTRACT_TYPES, "Contract type");
        rules.one_of("status", &input.status, CONTRACT_STATUSES, "Status");
        rules.money("salary", input.salary, "Salary");
        if let Some(end_date) = input.end_date {
            rules.check(
                end_date >= input.start_date,
                "end_date",
                "End date must not be before the start date.",
            );
        }

        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreateContract> for ContractValidator {
    async fn validate(&self, request: &CreateContract) -> AppResult<Vec<Violation>> {
        self.check(&request.0).await
    }
}

#[async_trait]
impl Validator<UpdateContract> for ContractValidator {
    async fn validate(&self, request: &UpdateContract) -> AppResult<Vec<Violation>> {
        self.check(&request.input).await
    }
}

/// Rejects unknown status filters instead of silently returning nothing.
pub struct ListContractsValidator;

#[async_trait]
impl Validator<ListContracts> for ListContractsValidator {
    async fn validate(&self, request: &ListContracts) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();
        if let Some(status) = &request.status {
            rules.one_of("status", status, CONTRACT_STATUSES, "Status");
        }
        Ok(rules.into_violations())
    }
}

#[derive(Clone)]
pub struct ContractHandlers {
    pool: PgPool,
}

impl ContractHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreateContract> for ContractHandlers {
    async fn handle(&self, request: CreateContract) -> AppResult<Contract> {
        let CreateContract(input) = request;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let now = Utc::now();
                let contract = Contract {
                    id: Uuid::now_v7(),
                    employee_id: input.employee_id,
                    contract_type: input.contract_type,
                    start_date: input.start_date,
                    end_date: input.end_date,
                    salary: money(input.salary),
                    status: input.status,
                    created_at: now,
                    updated_at: now,
                };
                uow.repository::<Contract>().add(contract.clone());
                Ok(contract)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdateContract> for ContractHandlers {
    async fn handle(&self, request: UpdateContract) -> AppResult<Contract> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let contracts = uow.repository::<Contract>();
                let mut contract = contracts
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Contract"))?;

                let input = request.input;
                contract.employee_id = input.employee_id;
                contract.contract_type = input.contract_type;
                contract.start_date = input.start_date;
                contract.end_date = input.end_date;
                contract.salary = money(input.salary);
                contract.status = input.status;
                contract.updated_at = Utc::now();

                contracts.update(contract.clone());
                Ok(contract)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeleteContract> for ContractHandlers {
    async fn handle(&self, request: DeleteContract) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let contracts = uow.repository::<Contract>();
                let contract = contracts
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Contract"))?;
                contracts.delete(&contract);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl Handler<GetContract> for ContractHandlers {
    async fn handle(&self, request: GetContract) -> AppResult<Contract> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Contract>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Contract"))
    }
}

#[async_trait]
impl Handler<ListContracts> for ContractHandlers {
    async fn handle(&self, request: ListContracts) -> AppResult<Paged<Contract>> {
        let (items, total) = db::contracts::list(
            &self.pool,
            request.employee_id,
            request.status.as_deref(),
            &request.page,
        )
        .await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = ContractHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateContract>::new(handlers.clone())
            .validate(ContractValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateContract>::new(handlers.clone())
            .validate(ContractValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteContract>::new(handlers.clone()));
    mediator.register(Registration::<GetContract>::new(handlers.clone()));
    mediator.register(
        Registration::<ListContracts>::new(handlers)
            .validate(PageValidator::new())
            .validate(ListContractsValidator),
    );
}
