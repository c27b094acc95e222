use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::pagination::{PageRequest, Paged};
use crate::app::result::{AppResult, Failure};
use crate::app::validation::{PageValidator, Paginated, Rules, Validator, Violation};
use crate::app::{Handler, Mediator, Registration, Request};
use crate::db::{self, ReadStore, Unique, UnitOfWork};
use crate::handlers::money;
use crate::models::Position;

#[derive(Debug, Clone, Deserialize)]
pub struct PositionInput {
    pub position_name: String,
    pub description: Option<String>,
    pub base_salary: Decimal,
}

#[derive(Debug, Clone)]
pub struct CreatePosition(pub PositionInput);

impl Request for CreatePosition {
    type Response = Position;
}

#[derive(Debug, Clone)]
pub struct UpdatePosition {
    pub id: Uuid,
    pub input: PositionInput,
}

impl Request for UpdatePosition {
    type Response = Position;
}

#[derive(Debug, Clone, Copy)]
pub struct DeletePosition {
    pub id: Uuid,
}

impl Request for DeletePosition {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetPosition {
    pub id: Uuid,
}

impl Request for GetPosition {
    type Response = Position;
}

#[derive(Debug, Clone, Default)]
pub struct ListPositions {
    pub search: Option<String>,
    pub page: PageRequest,
}

impl Request for ListPositions {
    type Response = Paged<Position>;
}

impl Paginated for ListPositions {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct PositionValidator {
    store: Arc<dyn ReadStore>,
}

impl PositionValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &PositionInput, current: Option<Uuid>) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        if rules.text("position_name", &input.position_name, 100, "Position name")
            && self
                .store
                .is_taken(&Unique::PositionName(input.position_name.clone()), current)
                .await?
        {
            rules.push("position_name", "Position name already exists.");
        }

        rules.optional_text("description", input.description.as_deref(), 500, "Description");
        rules.money("base_salary", input.base_salary, "Base salary");

        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreatePosition> for PositionValidator {
    async fn validate(&self, request: &CreatePosition) -> AppResult<Vec<Violation>> {
        self.check(&request.0, None).await
    }
}

#[async_trait]
impl Validator<UpdatePosition> for PositionValidator {
    async fn validate(&self, request: &UpdatePosition) -> AppResult<Vec<Violation>> {
        self.check(&request.input, Some(request.id)).await
    }
}

#[derive(Clone)]
pub struct PositionHandlers {
    pool: PgPool,
}

impl PositionHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreatePosition> for PositionHandlers {
    async fn handle(&self, request: CreatePosition) -> AppResult<Position> {
        let CreatePosition(input) = request;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let position = Position::new(
                    input.position_name.trim().to_string(),
                    input.description,
                    money(input.base_salary),
                );
                uow.repository::<Position>().add(position.clone());
                Ok(position)
            })
            .await
    }
}

#[async_trait]
impl Handler<UpdatePosition> for PositionHandlers {
    async fn handle(&self, request: UpdatePosition) -> AppResult<Position> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let positions = uow.repository::<Position>();
                let mut position = positions
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Position"))?;

                position.position_name = request.input.position_name.trim().to_string();
                position.description = request.input.description;
                position.base_salary = money(request.input.base_salary);
                position.updated_at = Utc::now();

                positions.update(position.clone());
                Ok(position)
            })
            .await
    }
}

#[async_trait]
impl Handler<DeletePosition> for PositionHandlers {
    async fn handle(&self, request: DeletePosition) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let positions = uow.repository::<Position>();
                let position = positions
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Position"))?;
                positions.delete(&position);
                Ok(())
            })
            .await
            .map_err(|f| f.on_conflict("Cannot delete a position that is held by employees."))
    }
}

#[async_trait]
impl Handler<GetPosition> for PositionHandlers {
    async fn handle(&self, request: GetPosition) -> AppResult<Position> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Position>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Position"))
    }
}

#[async_trait]
impl Handler<ListPositions> for PositionHandlers {
    async fn handle(&self, request: ListPositions) -> AppResult<Paged<Position>> {
        let (items, total) =
            db::positions::list(&self.pool, request.search.as_deref(), &request.page).await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = PositionHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreatePosition>::new(handlers.clone())
            .validate(PositionValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdatePosition>::new(handlers.clone())
            .validate(PositionValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeletePosition>::new(handlers.clone()));
    mediator.register(Registration::<GetPosition>::new(handlers.clone()));
    mediator.register(Registration::<ListPositions>::new(handlers).validate(PageValidator::new()));
}
