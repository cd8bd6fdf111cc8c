use actix_web::{HttpResponse, Responder, web};
use sqlx::MySqlPool;
use tracing::error;

use crate::compliance::clock::SystemClock;
use crate::compliance::engine::run_tick;
use crate::compliance::store::MySqlAttendanceStore;
use crate::config::Config;

/// Scheduler-facing trigger for the attendance compliance checks.
///
/// Invoked by an external cron-like caller every few minutes; which of
/// the three checks actually run is decided by the time window gate.
#[utoipa::path(
    get,
    path = "/cron/check-attendance",
    responses(
        (status = 200, description = "Attendance checks evaluated", body = Object, example = json!({
            "message": "Attendance notifications checked successfully",
            "timestamp": "2026-01-01T10:00:00",
            "rules": [{"rule": "late", "dispatched": 1}]
        })),
        (status = 500, description = "Tick failed", body = Object, example = json!({
            "error": "late check window is empty: 18:00:00 >= 18:00:00"
        }))
    ),
    tag = "Compliance"
)]
pub async fn check_attendance(
    pool: web::Data<MySqlPool>,
    config: web::Data<Config>,
) -> impl Responder {
    let store = MySqlAttendanceStore::new(pool.get_ref().clone());

    match run_tick(&SystemClock, &store, &config.compliance).await {
        Ok(summary) => HttpResponse::Ok().json(serde_json::json!({
            "message": "Attendance notifications checked successfully",
            "timestamp": summary.timestamp,
            "rules": summary.reports,
        })),
        Err(e) => {
            error!(error = %e, "attendance compliance tick failed");
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": e.to_string()
            }))
        }
    }
}
