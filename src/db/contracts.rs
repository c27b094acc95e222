use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::Contract;

#[async_trait]
impl Entity for Contract {
    type Key = Uuid;
    const TABLE: &'static str = "contracts";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Contract>("SELECT * FROM contracts WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO contracts (id, employee_id, contract_type, start_date, end_date, salary, status,
                                    created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
        )
        .bind(self.id)
        .bind(self.employee_id)
        .bind(&self.contract_type)
        .bind(self.start_date)
        .bind(self.end_date)
        .bind(self.salary)
        .bind(&self.status)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE contracts SET contract_type = $2, start_date = $3, end_date = $4, salary = $5,
                    status = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.contract_type)
        .bind(self.start_date)
        .bind(self.end_date)
        .bind(self.salary)
        .bind(&self.status)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM contracts WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

/// Newest contracts first.
pub async fn list(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    status: Option<&str>,
    page: &PageRequest,
) -> Result<(Vec<Contract>, i64), sqlx::Error> {
    let contracts = sqlx::query_as::<_, Contract>(
        "SELECT * FROM contracts
         WHERE ($1::uuid IS NULL OR employee_id = $1) AND ($2::text IS NULL OR status = $2)
         ORDER BY start_date DESC, id ASC
         LIMIT $3 OFFSET $4",
    )
    .bind(employee_id)
    .bind(status)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM contracts
         WHERE ($1::uuid IS NULL OR employee_id = $1) AND ($2::text IS NULL OR status = $2)",
    )
    .bind(employee_id)
    .bind(status)
    .fetch_one(pool)
    .await?;

    Ok((contracts, total))
}
