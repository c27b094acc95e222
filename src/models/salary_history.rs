use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct SalaryHistory {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub salary: Decimal,
    pub effective_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl SalaryHistory {
    pub fn new(employee_id: Uuid, salary: Decimal, effective_date: NaiveDate) -> Self {
        Self {
            id: Uuid::now_v7(),
            employee_id,
            salary,
            effective_date,
            created_at: Utc::now(),
        }
    }
}
