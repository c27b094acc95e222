use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::Position;

#[async_trait]
impl Entity for Position {
    type Key = Uuid;
    const TABLE: &'static str = "positions";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Position>("SELECT * FROM positions WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO positions (id, position_name, description, base_salary, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(self.id)
        .bind(&self.position_name)
        .bind(&self.description)
        .bind(self.base_salary)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE positions SET position_name = $2, description = $3, base_salary = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.position_name)
        .bind(&self.description)
        .bind(self.base_salary)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM positions WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    page: &PageRequest,
) -> Result<(Vec<Position>, i64), sqlx::Error> {
    let pattern = search.map(|s| format!("%{}%", s.trim()));

    let positions = sqlx::query_as::<_, Position>(
        "SELECT * FROM positions
         WHERE ($1::text IS NULL OR position_name ILIKE $1)
         ORDER BY position_name ASC, id ASC
         LIMIT $2 OFFSET $3",
    )
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM positions WHERE ($1::text IS NULL OR position_name ILIKE $1)",
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((positions, total))
}
