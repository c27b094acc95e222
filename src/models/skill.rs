use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Skill {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub skill_name: String,
    /// 1 (beginner) to 5 (expert).
    pub proficiency_level: i16,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
