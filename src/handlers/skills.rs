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
use crate::models::Skill;

pub const DUPLICATE_SKILL: &str = "Employee already has this skill.";

#[derive(Debug, Clone, Deserialize)]
pub struct SkillInput {
    pub employee_id: Uuid,
    pub skill_name: String,
    pub proficiency_level: i16,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateSkill(pub SkillInput);

impl Request for CreateSkill {
    type Response = Skill;
}

#[derive(Debug, Clone)]
pub struct UpdateSkill {
    pub id: Uuid,
    pub input: SkillInput,
}

impl Request for UpdateSkill {
    type Response = Skill;
}

#[derive(Debug, Clone, Copy)]
pub struct DeleteSkill {
    pub id: Uuid,
}

impl Request for DeleteSkill {
    type Response = ();
}

#[derive(Debug, Clone, Copy)]
pub struct GetSkill {
    pub id: Uuid,
}

impl Request for GetSkill {
    type Response = Skill;
}

#[derive(Debug, Clone, Default)]
pub struct ListSkills {
    pub employee_id: Option<Uuid>,
    pub search: Option<String>,
    pub page: PageRequest,
}

impl Request for ListSkills {
    type Response = Paged<Skill>;
}

impl Paginated for ListSkills {
    fn page(&self) -> &PageRequest {
        &self.page
    }
}

pub struct SkillValidator {
    store: Arc<dyn ReadStore>,
}

impl SkillValidator {
    pub fn new(store: Arc<dyn ReadStore>) -> Self {
        Self { store }
    }

    async fn check(&self, input: &SkillInput, current: Option<Uuid>) -> AppResult<Vec<Violation>> {
        let mut rules = Rules::new();

        let employee_exists = rules.check(
            self.store.exists(Reference::Employee, input.employee_id).await?,
            "employee_id",
            "Employee does not exist.",
        );

        if rules.text("skill_name", &input.skill_name, 100, "Skill name") && employee_exists {
            let unique = Unique::EmployeeSkill {
                employee_id: input.employee_id,
                skill_name: input.skill_name.clone(),
            };
            rules.check(
                !self.store.is_taken(&unique, current).await?,
                "skill_name",
                DUPLICATE_SKILL,
            );
        }

        rules.check(
            (1..=5).contains(&input.proficiency_level),
            "proficiency_level",
            "Proficiency level must be between 1 and 5.",
        );
        rules.optional_text("description", input.description.as_deref(), 500, "Description");

        Ok(rules.into_violations())
    }
}

#[async_trait]
impl Validator<CreateSkill> for SkillValidator {
    async fn validate(&self, request: &CreateSkill) -> AppResult<Vec<Violation>> {
        self.check(&request.0, None).await
    }
}

#[async_trait]
impl Validator<UpdateSkill> for SkillValidator {
    async fn validate(&self, request: &UpdateSkill) -> AppResult<Vec<Violation>> {
        self.check(&request.input, Some(request.id)).await
    }
}

#[derive(Clone)]
pub struct SkillHandlers {
    pool: PgPool,
}

impl SkillHandlers {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Handler<CreateSkill> for SkillHandlers {
    async fn handle(&self, request: CreateSkill) -> AppResult<Skill> {
        let CreateSkill(input) = request;
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let now = Utc::now();
                let skill = Skill {
                    id: Uuid::now_v7(),
                    employee_id: input.employee_id,
                    skill_name: input.skill_name.trim().to_string(),
                    proficiency_level: input.proficiency_level,
                    description: input.description,
                    created_at: now,
                    updated_at: now,
                };
                uow.repository::<Skill>().add(skill.clone());
                Ok(skill)
            })
            .await
            .map_err(|f| f.on_conflict(DUPLICATE_SKILL))
    }
}

#[async_trait]
impl Handler<UpdateSkill> for SkillHandlers {
    async fn handle(&self, request: UpdateSkill) -> AppResult<Skill> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let skills = uow.repository::<Skill>();
                let mut skill = skills
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Skill"))?;

                let input = request.input;
                skill.employee_id = input.employee_id;
                skill.skill_name = input.skill_name.trim().to_string();
                skill.proficiency_level = input.proficiency_level;
                skill.description = input.description;
                skill.updated_at = Utc::now();

                skills.update(skill.clone());
                Ok(skill)
            })
            .await
            .map_err(|f| f.on_conflict(DUPLICATE_SKILL))
    }
}

#[async_trait]
impl Handler<DeleteSkill> for SkillHandlers {
    async fn handle(&self, request: DeleteSkill) -> AppResult<()> {
        UnitOfWork::new(self.pool.clone())
            .execute(move |uow| async move {
                let skills = uow.repository::<Skill>();
                let skill = skills
                    .find(request.id)
                    .await?
                    .ok_or_else(|| Failure::not_found("Skill"))?;
                skills.delete(&skill);
                Ok(())
            })
            .await
    }
}

#[async_trait]
impl Handler<GetSkill> for SkillHandlers {
    async fn handle(&self, request: GetSkill) -> AppResult<Skill> {
        UnitOfWork::new(self.pool.clone())
            .repository::<Skill>()
            .find(request.id)
            .await?
            .ok_or_else(|| Failure::not_found("Skill"))
    }
}

#[async_trait]
impl Handler<ListSkills> for SkillHandlers {
    async fn handle(&self, request: ListSkills) -> AppResult<Paged<Skill>> {
        let (items, total) = db::skills::list(
            &self.pool,
            request.employee_id,
            request.search.as_deref(),
            &request.page,
        )
        .await?;
        Ok(Paged::new(items, total, &request.page))
    }
}

pub fn register(mediator: &mut Mediator, pool: &PgPool, store: &Arc<dyn ReadStore>) {
    let handlers = SkillHandlers::new(pool.clone());

    mediator.register(
        Registration::<CreateSkill>::new(handlers.clone()).validate(SkillValidator::new(store.clone())),
    );
    mediator.register(
        Registration::<UpdateSkill>::new(handlers.clone()).validate(SkillValidator::new(store.clone())),
    );
    mediator.register(Registration::<DeleteSkill>::new(handlers.clone()));
    mediator.register(Registration::<GetSkill>::new(handlers.clone()));
    mediator.register(Registration::<ListSkills>::new(handlers).validate(PageValidator::new()));
}
