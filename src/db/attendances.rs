use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::Attendance;

#[async_trait]
impl Entity for Attendance {
    type Key = Uuid;
    const TABLE: &'static str = "attendances";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Attendance>("SELECT * FROM attendances WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO attendances (id, employee_id, check_in, check_out, status, notes, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(self.id)
        .bind(self.employee_id)
        .bind(self.check_in)
        .bind(self.check_out)
        .bind(&self.status)
        .bind(&self.notes)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE attendances SET check_in = $2, check_out = $3, status = $4, notes = $5, updated_at = $6
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(self.check_in)
        .bind(self.check_out)
        .bind(&self.status)
        .bind(&self.notes)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM attendances WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub employee_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

/// Most recent check-ins first.
pub async fn list(
    pool: &PgPool,
    filter: &ListFilter,
    page: &PageRequest,
) -> Result<(Vec<Attendance>, i64), sqlx::Error> {
    let attendances = sqlx::query_as::<_, Attendance>(
        "SELECT * FROM attendances
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::timestamptz IS NULL OR check_in >= $2)
           AND ($3::timestamptz IS NULL OR check_in < $3)
         ORDER BY check_in DESC, id ASC
         LIMIT $4 OFFSET $5",
    )
    .bind(filter.employee_id)
    .bind(filter.from)
    .bind(filter.to)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM attendances
         WHERE ($1::uuid IS NULL OR employee_id = $1)
           AND ($2::timestamptz IS NULL OR check_in >= $2)
           AND ($3::timestamptz IS NULL OR check_in < $3)",
    )
    .bind(filter.employee_id)
    .bind(filter.from)
    .bind(filter.to)
    .fetch_one(pool)
    .await?;

    Ok((attendances, total))
}
