use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Compliance notification categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum NotificationKind {
    #[serde(rename = "attendance_late")]
    Late,
    #[serde(rename = "attendance_missing")]
    Missing,
    #[serde(rename = "attendance_incomplete")]
    Incomplete,
}

impl NotificationKind {
    pub fn as_str(&self) -> &str {
        match self {
            NotificationKind::Late => "attendance_late",
            NotificationKind::Missing => "attendance_missing",
            NotificationKind::Incomplete => "attendance_incomplete",
        }
    }
}

/// Notification row as read by the inbox.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "employee_id": 1000,
        "company_id": 1,
        "title": "Tardiness Justification Required",
        "message": "You arrived 30 minutes late today.",
        "kind": "attendance_late",
        "related_id": 42,
        "is_read": false,
        "created_at": "2026-01-01T10:00:00"
    })
)]
pub struct Notification {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1000)]
    pub employee_id: u64,
    #[schema(example = 1)]
    pub company_id: u64,
    #[schema(example = "Tardiness Justification Required")]
    pub title: String,
    pub message: String,
    #[schema(example = "attendance_late")]
    pub kind: String,
    #[schema(example = 42, nullable = true)]
    pub related_id: Option<u64>,
    #[schema(example = false)]
    pub is_read: bool,
    #[schema(example = "2026-01-01T10:00:00", format = "date-time", value_type = String)]
    pub created_at: NaiveDateTime,
}

/// A notification about to be appended. Rows are insert-only from the
/// compliance engine's side; only the inbox flips the read marker.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub employee_id: u64,
    pub company_id: u64,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub related_id: Option<u64>,
    pub created_at: NaiveDateTime,
}
