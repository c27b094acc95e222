use crate::app::validation::{self, Violation};

/// Outcome of every command and query. `Ok` is success, `Err` carries the failure.
pub type AppResult<T> = Result<T, Failure>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Failure {
    #[error("{}", validation::join(.0))]
    Validation(Vec<Violation>),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("No changes were made.")]
    NoChanges,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl Failure {
    pub fn not_found(entity: &str) -> Self {
        Failure::NotFound(format!("{entity} not found."))
    }

    /// A single-violation validation failure.
    pub fn invalid(field: &str, message: impl Into<String>) -> Self {
        Failure::Validation(vec![Violation::new(field, message)])
    }

    /// Replace the generic message of a storage conflict with a domain one.
    pub fn on_conflict(self, message: &str) -> Self {
        match self {
            Failure::Conflict(_) => Failure::Conflict(message.to_string()),
            other => other,
        }
    }
}

impl From<sqlx::Error> for Failure {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => Failure::NotFound("Record not found.".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_foreign_key_violation() => {
                Failure::Conflict(format!(
                    "The operation conflicts with related records ({}).",
                    db_err.constraint().unwrap_or("foreign key")
                ))
            }
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Failure::Conflict(format!(
                    "A record with the same unique value already exists ({}).",
                    db_err.constraint().unwrap_or("unique")
                ))
            }
            _ => {
                tracing::error!("Database error: {err}");
                Failure::Unexpected(err.to_string())
            }
        }
    }
}
