use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

use crate::model::notification::Notification;

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct NotificationQuery {
    #[schema(example = 1000)]
    /// Inbox owner
    pub employee_id: u64,
    /// Only unread rows
    pub unread_only: Option<bool>,
    #[schema(example = 1)]
    /// Pagination page number (start with 1)
    pub page: Option<u32>,
    #[schema(example = 20)]
    /// Pagination per page number
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct UnreadCountQuery {
    #[schema(example = 1000)]
    pub employee_id: u64,
    /// Company scope, for admins reading across employees
    pub company_id: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct NotificationListResponse {
    pub data: Vec<Notification>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 3)]
    pub total: i64,
}

/// Notification inbox for one employee
#[utoipa::path(
    get,
    path = "/api/v1/notifications",
    params(NotificationQuery),
    responses(
        (status = 200, description = "Paginated notification list", body = NotificationListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Notification"
)]
pub async fn list_notifications(
    pool: web::Data<MySqlPool>,
    query: web::Query<NotificationQuery>,
) -> actix_web::Result<impl Responder> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let unread_filter = if query.unread_only.unwrap_or(false) {
        " AND is_read = FALSE"
    } else {
        ""
    };

    let count_sql = format!(
        "SELECT COUNT(*) as total FROM notifications WHERE employee_id = ?{}",
        unread_filter
    );
    debug!(sql = %count_sql, employee_id = query.employee_id, "Counting notifications");

    let total = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(query.employee_id)
        .fetch_one(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to count notifications");
            ErrorInternalServerError("Database error")
        })?;

    let data_sql = format!(
        "SELECT * FROM notifications WHERE employee_id = ?{} ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?",
        unread_filter
    );

    let notifications = sqlx::query_as::<_, Notification>(&data_sql)
        .bind(query.employee_id)
        .bind(per_page as i64)
        .bind(offset as i64)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to fetch notifications");
            ErrorInternalServerError("Database error")
        })?;

    Ok(HttpResponse::Ok().json(NotificationListResponse {
        data: notifications,
        page,
        per_page,
        total,
    }))
}

/// Unread notification count
#[utoipa::path(
    get,
    path = "/api/v1/notifications/unread-count",
    params(UnreadCountQuery),
    responses(
        (status = 200, description = "Unread count", body = Object, example = json!({
            "count": 2
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Notification"
)]
pub async fn unread_count(
    pool: web::Data<MySqlPool>,
    query: web::Query<UnreadCountQuery>,
) -> actix_web::Result<impl Responder> {
    let count = if let Some(company_id) = query.company_id {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM notifications
            WHERE employee_id = ? AND company_id = ? AND is_read = FALSE
            "#,
        )
        .bind(query.employee_id)
        .bind(company_id)
        .fetch_one(pool.get_ref())
        .await
    } else {
        sqlx::query_scalar::<_, i64>(
            r#"SELECT COUNT(*) FROM notifications WHERE employee_id = ? AND is_read = FALSE"#,
        )
        .bind(query.employee_id)
        .fetch_one(pool.get_ref())
        .await
    }
    .map_err(|e| {
        error!(error = %e, employee_id = query.employee_id, "Failed to count unread notifications");
        ErrorInternalServerError("Database error")
    })?;

    Ok(HttpResponse::Ok().json(json!({ "count": count })))
}

/// Mark a notification as read
#[utoipa::path(
    put,
    path = "/api/v1/notifications/{notification_id}/read",
    params(
        ("notification_id", Path, description = "Notification ID")
    ),
    responses(
        (status = 200, description = "Marked as read", body = Object, example = json!({
            "message": "Notification marked as read"
        })),
        (status = 404, description = "Notification not found", body = Object, example = json!({
            "message": "Notification not found"
        })),
        (status = 500, description = "Internal server error")
    ),
    tag = "Notification"
)]
pub async fn mark_read(
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let notification_id = path.into_inner();

    let result = sqlx::query(r#"UPDATE notifications SET is_read = TRUE WHERE id = ?"#)
        .bind(notification_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, notification_id, "Failed to mark notification as read");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Notification not found"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Notification marked as read"
    })))
}
