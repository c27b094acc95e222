use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::app::pagination::PageRequest;
use crate::db::entity::Entity;
use crate::models::{Employee, EmployeeListItem};

#[async_trait]
impl Entity for Employee {
    type Key = Uuid;
    const TABLE: &'static str = "employees";

    fn key(&self) -> Uuid {
        self.id
    }

    async fn find(conn: &mut PgConnection, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    async fn insert(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO employees (id, first_name, last_name, email, phone, date_of_birth, hire_date,
                                    department_id, position_id, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(self.date_of_birth)
        .bind(self.hire_date)
        .bind(self.department_id)
        .bind(self.position_id)
        .bind(self.is_active)
        .bind(self.created_at)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn update(&self, conn: &mut PgConnection) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE employees SET first_name = $2, last_name = $3, email = $4, phone = $5,
                    date_of_birth = $6, hire_date = $7, department_id = $8, position_id = $9,
                    is_active = $10, updated_at = $11
             WHERE id = $1",
        )
        .bind(self.id)
        .bind(&self.first_name)
        .bind(&self.last_name)
        .bind(&self.email)
        .bind(&self.phone)
        .bind(self.date_of_birth)
        .bind(self.hire_date)
        .bind(self.department_id)
        .bind(self.position_id)
        .bind(self.is_active)
        .bind(self.updated_at)
        .execute(conn)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete(conn: &mut PgConnection, id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM employees WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    pub department_id: Option<Uuid>,
    pub position_id: Option<Uuid>,
    pub is_active: Option<bool>,
    pub search: Option<String>,
}

const FILTER: &str = "($1::uuid IS NULL OR e.department_id = $1)
       AND ($2::uuid IS NULL OR e.position_id = $2)
       AND ($3::boolean IS NULL OR e.is_active = $3)
       AND ($4::text IS NULL OR e.first_name ILIKE $4 OR e.last_name ILIKE $4 OR e.email ILIKE $4)";

/// Employees with department and position names, ordered by last name,
/// first name, then id.
pub async fn list(
    pool: &PgPool,
    filter: &ListFilter,
    page: &PageRequest,
) -> Result<(Vec<EmployeeListItem>, i64), sqlx::Error> {
    let pattern = filter.search.as_deref().map(|s| format!("%{}%", s.trim()));

    let employees = sqlx::query_as::<_, EmployeeListItem>(&format!(
        "SELECT e.id, e.first_name, e.last_name, e.email, e.phone, e.hire_date, e.is_active,
                e.department_id, d.department_name, e.position_id, p.position_name
         FROM employees e
         LEFT JOIN departments d ON d.id = e.department_id
         LEFT JOIN positions p ON p.id = e.position_id
         WHERE {FILTER}
         ORDER BY e.last_name ASC, e.first_name ASC, e.id ASC
         LIMIT $5 OFFSET $6"
    ))
    .bind(filter.department_id)
    .bind(filter.position_id)
    .bind(filter.is_active)
    .bind(&pattern)
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM employees e WHERE {FILTER}"))
        .bind(filter.department_id)
        .bind(filter.position_id)
        .bind(filter.is_active)
        .bind(&pattern)
        .fetch_one(pool)
        .await?;

    Ok((employees, total))
}
