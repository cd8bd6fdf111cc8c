use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One attendance record per (employee, date). Absent employees have no
/// row at all for the day.
///
/// The two notification flags are monotonic: they move false -> true
/// exactly once, via the conditional claim in the compliance store, and
/// are never reset.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Attendance {
    pub id: u64,
    pub employee_id: u64,
    pub company_id: u64,
    pub date: NaiveDate,
    pub check_in: Option<NaiveDateTime>,
    pub check_out: Option<NaiveDateTime>,
    pub is_late: bool,
    pub late_minutes: i32,
    pub late_notification_sent: bool,
    pub incomplete_notification_sent: bool,
}
