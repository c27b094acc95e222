use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::db::entity::Entity;
use crate::models::UserToken;

#[async_trait]
impl Entity for UserToken {
    type Key = Uuid;
    const TABLE: &'static str = "user_tokens";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, UserToken>("SELECT * FROM user_tokens WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO user_tokens (id, user_id, access_token_hash, access_expires_at,
                                      refresh_token_hash, refresh_expires_at, created_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(self.id)
        .bind(self.user_id)
        .bind(&self.access_token_hash)
        .bind(self.access_expires_at)
        .bind(&self.refresh_token_hash)
        .bind(self.refresh_expires_at)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_tokens SET access_token_hash = $2, access_expires_at = $3,
                    refresh_token_hash = $4, refresh_expires_at = $5
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.access_token_hash)
        .bind(self.access_expires_at)
        .bind(&self.refresh_token_hash)
        .bind(self.refresh_expires_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

pub async fn find_by_access_hash(
    pool: &PgPool,
    access_token_hash: &str,
) -> Result<Option<UserToken>, sqlx::Error> {
    sqlx::query_as::<_, UserToken>("SELECT * FROM user_tokens WHERE access_token_hash = $1")
        .bind(access_token_hash)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_refresh_hash(
    pool: &PgPool,
    refresh_token_hash: &str,
) -> Result<Option<UserToken>, sqlx::Error> {
    sqlx::query_as::<_, UserToken>("SELECT * FROM user_tokens WHERE refresh_token_hash = $1")
        .bind(refresh_token_hash)
        .fetch_optional(pool)
        .await
}

/// Signs the user out everywhere. Returns the number of revoked pairs.
pub async fn delete_for_user(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
