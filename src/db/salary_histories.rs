use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::SalaryHistory;

#[async_trait]
impl Entity for SalaryHistory {
    type Key = Uuid;
    const TABLE: &'static str = "salary_histories";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, SalaryHistory>("SELECT * FROM salary_histories WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO salary_histories (id, employee_id, salary, effective_date, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(self.id)
        .bind(self.employee_id)
        .bind(self.salary)
        .bind(self.effective_date)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("UPDATE salary_histories SET salary = $2, effective_date = $3 WHERE id = $1")
                .bind(self.id)
                .bind(self.salary)
                .bind(self.effective_date)
                .execute(conn)
                .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM salary_histories WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Latest effective date first.
pub async fn list(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    page: &PageRequest,
) -> Result<(Vec<SalaryHistory>, i64), sqlx::Error> {
    let rows = sqlx::query_as::<_, SalaryHistory>(
        "SELECT * FROM salary_histories
         WHERE ($1::uuid IS NULL OR employee_id = $1)
         ORDER BY effective_date DESC, id ASC
         LIMIT $2 OFFSET $3",
    )
    .bind(employee_id)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM salary_histories WHERE ($1::uuid IS NULL OR employee_id = $1)",
    )
    .bind(employee_id)
    .fetch_one(pool)
    .await?;

    Ok((rows, total))
}
