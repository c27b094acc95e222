use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ATTENDANCE_STATUSES: &[&str] = &["Present", "Late", "Absent", "Leave"];

#[derive(Debug, Clone, PartialEq, sqlx::FromRow, Serialize, Deserialize)]
pub struct Attendance {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub check_in: DateTime<Utc>,
    pub check_out: Option<DateTime<Utc>>,
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorkHours {
    pub attendance_id: Uuid,
    pub hours: f64,
}

impl Attendance {
    /// Hours between check-in and check-out; `None` until checked out.
    pub fn work_hours(&self) -> Option<f64> {
        self.check_out
            .map(|out| (out - self.check_in).num_milliseconds() as f64 / 3_600_000.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn attendance(check_out: Option<DateTime<Utc>>) -> Attendance {
        let check_in = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        Attendance {
            id: Uuid::now_v7(),
            employee_id: Uuid::now_v7(),
            check_in,
            check_out,
            status: "Present".to_string(),
            notes: None,
            created_at: check_in,
            updated_at: check_in,
        }
    }

    #[test]
    fn full_day_is_nine_hours() {
        let out = Utc.with_ymd_and_hms(2024, 3, 1, 17, 0, 0).unwrap();
        assert_eq!(attendance(Some(out)).work_hours(), Some(9.0));
    }

    #[test]
    fn partial_hours_are_fractional() {
        let out = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        assert_eq!(attendance(Some(out)).work_hours(), Some(4.5));
    }

    #[test]
    fn sub_second_precision_is_kept() {
        let out = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
            + chrono::Duration::milliseconds(1_800_500);
        let hours = attendance(Some(out)).work_hours().unwrap();
        assert!((hours - 1_800.5 / 3_600.0).abs() < 1e-12);
    }

    #[test]
    fn open_attendance_has_no_hours() {
        assert_eq!(attendance(None).work_hours(), None);
    }
}
