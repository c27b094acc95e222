use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::{Role, UserRole};

#[async_trait]
impl Entity for Role {
    type Key = Uuid;
    const TABLE: &'static str = "roles";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO roles (id, role_name, description, created_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(self.id)
        .bind(&self.role_name)
        .bind(&self.description)
        .bind(self.created_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE roles SET role_name = $2, description = $3 WHERE id = $1")
            .bind(self.id)
            .bind(&self.role_name)
            .bind(&self.description)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl Entity for UserRole {
    type Key = (Uuid, Uuid);
    const TABLE: &'static str = "user_roles";

    fn key(&self) -> (Uuid, Uuid) {
        (self.user_id, self.role_id)
    }

    async fn find(conn: &mut PgConnection, key: (Uuid, Uuid)) -> Result<Option<Self>, sqlx::Error> {
        let (user_id, role_id) = key;
        sqlx::query_as::<_, UserRole>("SELECT * FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES ($1, $2)")
            .bind(self.user_id)
            .bind(self.role_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// The key is the whole row; an existing assignment has nothing to change.
    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let found = Self::find(conn, self.key()).await?;
        Ok(u64::from(found.is_some()))
    }

    async fn delete(conn: &mut PgConnection, key: (Uuid, Uuid)) -> Result<u64, sqlx::Error> {
        let (user_id, role_id) = key;
        let result = sqlx::query("DELETE FROM user_roles WHERE user_id = $1 AND role_id = $2")
            .bind(user_id)
            .bind(role_id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

pub async fn find_by_name(pool: &PgPool, role_name: &str) -> Result<Option<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>("SELECT * FROM roles WHERE role_name = $1")
        .bind(role_name)
        .fetch_optional(pool)
        .await
}

pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Role>, sqlx::Error> {
    sqlx::query_as::<_, Role>(
        "SELECT r.* FROM roles r
         JOIN user_roles ur ON ur.role_id = r.id
         WHERE ur.user_id = $1
         ORDER BY r.role_name ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn list(pool: &PgPool, page: &PageRequest) -> Result<(Vec<Role>, i64), sqlx::Error> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT * FROM roles ORDER BY role_name ASC, id ASC LIMIT $1 OFFSET $2",
    )
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM roles")
        .fetch_one(pool)
        .await?;

    Ok((roles, total))
}
