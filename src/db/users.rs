use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::User;

#[async_trait]
impl Entity for User {
    type Key = Uuid;
    const TABLE: &'static str = "users";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO users (id, employee_id, username, password_hash, password_salt, is_active,
                                created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(self.id)
        .bind(self.employee_id)
        .bind(&self.username)
        .bind(&self.password_hash)
        .bind(&self.password_salt)
        .bind(self.is_active)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET employee_id = $2, username = $3, password_hash = $4, password_salt = $5,
                    is_active = $6, updated_at = $7
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(self.employee_id)
        .bind(&self.username)
        .bind(&self.password_hash)
        .bind(&self.password_salt)
        .bind(self.is_active)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

pub async fn find_by_username(pool: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE lower(username) = lower($1)")
        .bind(username.trim())
        .fetch_optional(pool)
        .await
}

pub async fn list(
    pool: &PgPool,
    search: Option<&str>,
    page: &PageRequest,
) -> Result<(Vec<User>, i64), sqlx::Error> {
    let pattern = search.map(|s| format!("%{}%", s.trim()));

    let users = sqlx::query_as::<_, User>(
        "SELECT * FROM users
         WHERE ($1::text IS NULL OR username ILIKE $1)
         ORDER BY username ASC, id ASC
         LIMIT $2 OFFSET $3",
    )
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE ($1::text IS NULL OR username ILIKE $1)")
            .bind(&pattern)
            .fetch_one(pool)
            .await?;

    Ok((users, total))
}
