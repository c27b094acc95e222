use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::Skill;

#[async_trait]
impl Entity for Skill {
    type Key = Uuid;
    const TABLE: &'static str = "skills";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Skill>("SELECT * FROM skills WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO skills (id, employee_id, skill_name, proficiency_level, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(self.id)
        .bind(self.employee_id)
        .bind(&self.skill_name)
        .bind(self.proficiency_level)
        .bind(&self.description)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE skills SET skill_name = $2, proficiency_level = $3, description = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.skill_name)
        .bind(self.proficiency_level)
        .bind(&self.description)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM skills WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

pub async fn list(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    search: Option<&str>,
    page: &PageRequest,
) -> Result<(Vec<Skill>, i64), sqlx::Error> {
    let pattern = search.map(|s| format!("%{}%", s.trim()));

    let skills = sqlx::query_as::<_, Skill>(
        "SELECT * FROM skills
         WHERE ($1::uuid IS NULL OR employee_id = $1) AND ($2::text IS NULL OR skill_name ILIKE $2)
         ORDER BY skill_name ASC, id ASC
         LIMIT $3 OFFSET $4",
    )
    .bind(employee_id)
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM skills
         WHERE ($1::uuid IS NULL OR employee_id = $1) AND ($2::text IS NULL OR skill_name ILIKE $2)",
    )
    .bind(employee_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((skills, total))
}
