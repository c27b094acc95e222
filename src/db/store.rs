use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::app::result::AppResult;

/// Parent tables a request may reference by id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reference {
    Employee,
    Department,
    Position,
    User,
    Role,
}

impl Reference {
    fn table(self) -> &'static str {
        match self {
            Reference::Employee => "employees",
            Reference::Department => "departments",
            Reference::Position => "positions",
            Reference::User => "users",
            Reference::Role => "roles",
        }
    }
}

/// Values that must not be held by more than one row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Unique {
    DepartmentName(String),
    PositionName(String),
    EmployeeEmail(String),
    Username(String),
    RoleName(String),
    EmployeeSkill { employee_id: Uuid, skill_name: String },
    UserRole { user_id: Uuid, role_id: Uuid },
    /// At most one attendance without check-out per employee.
    OpenAttendance { employee_id: Uuid },
}

/// Read-only view of stored state, used by validators.
#[async_trait]
pub trait ReadStore: Send + Sync {
    async fn exists(&self, reference: Reference, id: Uuid) -> AppResult<bool>;

    /// Whether another row already holds `unique`. The row `excluding`
    /// (the one being updated) does not count.
    async fn is_taken(&self, unique: &Unique, excluding: Option<Uuid>) -> AppResult<bool>;
}

pub struct PgReadStore {
    pool: PgPool,
}

impl PgReadStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReadStore for PgReadStore {
    async fn exists(&self, reference: Reference, id: Uuid) -> AppResult<bool> {
        let sql = format!("SELECT EXISTS(SELECT 1 FROM {} WHERE id = $1)", reference.table());
        let found: bool = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(found)
    }

    async fn is_taken(&self, unique: &Unique, excluding: Option<Uuid>) -> AppResult<bool> {
        let taken: bool = match unique {
            Unique::DepartmentName(name) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM departments
                     WHERE lower(department_name) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
                )
                .bind(name.trim())
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::PositionName(name) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM positions
                     WHERE lower(position_name) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
                )
                .bind(name.trim())
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::EmployeeEmail(email) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM employees
                     WHERE lower(email) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
                )
                .bind(email.trim())
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::Username(username) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM users
                     WHERE lower(username) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
                )
                .bind(username.trim())
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::RoleName(name) => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM roles
                     WHERE lower(role_name) = lower($1) AND ($2::uuid IS NULL OR id <> $2))",
                )
                .bind(name.trim())
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::EmployeeSkill {
                employee_id,
                skill_name,
            } => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM skills
                     WHERE employee_id = $1 AND lower(skill_name) = lower($2)
                       AND ($3::uuid IS NULL OR id <> $3))",
                )
                .bind(employee_id)
                .bind(skill_name.trim())
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::UserRole { user_id, role_id } => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM user_roles WHERE user_id = $1 AND role_id = $2)",
                )
                .bind(user_id)
                .bind(role_id)
                .fetch_one(&self.pool)
                .await?
            }
            Unique::OpenAttendance { employee_id } => {
                sqlx::query_scalar(
                    "SELECT EXISTS(SELECT 1 FROM attendances
                     WHERE employee_id = $1 AND check_out IS NULL
                       AND ($2::uuid IS NULL OR id <> $2))",
                )
                .bind(employee_id)
                .bind(excluding)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(taken)
    }
}
