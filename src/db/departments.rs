use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::Department;

#[async_trait]
impl Entity for Department {
    type Key = Uuid;
    const TABLE: &'static str = "departments";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Department>("SELECT * FROM departments WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO departments (id, department_name, location, manager_id, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(self.id)
        .bind(&self.department_name)
        .bind(&self.location)
        .bind(self.manager_id)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE departments SET department_name = $2, location = $3, manager_id = $4, updated_at = $5
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.department_name)
        .bind(&self.location)
        .bind(self.manager_id)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Departments ordered by name, then id.
pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    page: &PageRequest,
) -> Result<(Vec<Department>, i64), sqlx::Error> {
    let pattern = search.map(|s| format!("%{}%", s.trim()));

    let departments = sqlx::query_as::<_, Department>(
        "SELECT * FROM departments
         WHERE ($1::text IS NULL OR department_name ILIKE $1 OR location ILIKE $1)
         ORDER BY department_name ASC, id ASC
         LIMIT $2 OFFSET $3",
    )
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM departments
         WHERE ($1::text IS NULL OR department_name ILIKE $1 OR location ILIKE $1)",
    )
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    Ok((departments, total))
}
