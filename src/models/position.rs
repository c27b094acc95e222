use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Position {
    pub id: Uuid,
    pub position_name: String,
    pub description: Option<String>,
    pub base_salary: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Position {
    pub fn new(position_name: String, description: Option<String>, base_salary: Decimal) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            position_name,
            description,
            base_salary,
            created_at: now,
            updated_at: now,
        }
    }
}
