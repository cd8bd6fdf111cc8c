use chrono::{Duration, NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::model::notification::{NewNotification, NotificationKind};

use super::config::ComplianceConfig;
use super::store::AttendanceStore;

const DEADLINE_FORMAT: &str = "%d/%m/%Y at %H:%M";

/// Notify employees whose check-in today was flagged late.
///
/// Each record's `late_notification_sent` flag is claimed before the
/// notification row is written, so overlapping ticks dispatch at most
/// once per record. Returns the number of notifications dispatched.
pub async fn run_late_rule(
    store: &dyn AttendanceStore,
    cfg: &ComplianceConfig,
    today: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<u32> {
    let candidates = store.find_late_unnotified(today).await?;
    if candidates.is_empty() {
        info!("no new late arrivals found");
        return Ok(0);
    }

    let mut dispatched = 0;
    for record in candidates {
        // A late record must carry a check-in; lateness is derived from it
        // upstream. Treat the contrary as bad data, not a crash.
        let Some(check_in) = record.check_in else {
            warn!(
                record_id = record.id,
                employee_id = record.employee_id,
                "late attendance record has no check-in time, skipping"
            );
            continue;
        };

        if !store.claim_late_flag(record.id).await? {
            continue;
        }

        let deadline = check_in + Duration::hours(cfg.deadline_offset_hours);
        let notification = NewNotification {
            employee_id: record.employee_id,
            company_id: record.company_id,
            title: "Tardiness Justification Required".to_string(),
            message: format!(
                "You arrived {} minutes late today. You must submit a tardiness justification before {} ({} hours from your arrival).",
                record.late_minutes,
                deadline.format(DEADLINE_FORMAT),
                cfg.deadline_offset_hours,
            ),
            kind: NotificationKind::Late,
            related_id: Some(record.id),
            created_at: now,
        };
        store.insert_notifications(&[notification]).await?;
        info!(
            employee_id = record.employee_id,
            "late arrival notification sent"
        );
        dispatched += 1;
    }

    Ok(dispatched)
}

/// Notify active non-admin employees with no check-in for today.
///
/// Absent employees have no attendance row to claim, so this rule has no
/// per-record idempotency flag; the gate's once-a-day window is what
/// keeps it from repeating. Roster and check-ins are read fresh here,
/// not passed in, so a check-in landing just before execution counts.
pub async fn run_missing_rule(
    store: &dyn AttendanceStore,
    cfg: &ComplianceConfig,
    today: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<u32> {
    let roster = store.find_active_roster().await?;
    if roster.is_empty() {
        info!("no active employees found");
        return Ok(0);
    }

    let checked_in = store.find_todays_checkins(today).await?;

    // One cutoff-anchored deadline, identical for every absentee.
    let cutoff = today.and_time(cfg.missing_window.start);
    let deadline = cutoff + Duration::hours(cfg.deadline_offset_hours);

    let notifications: Vec<NewNotification> = roster
        .iter()
        .filter(|employee| !checked_in.contains(&employee.id))
        .map(|employee| NewNotification {
            employee_id: employee.id,
            company_id: employee.company_id,
            title: "Absence Justification Required".to_string(),
            message: format!(
                "No attendance was recorded for you today. You must submit an absence justification before {} ({} hours from the {} cutoff).",
                deadline.format(DEADLINE_FORMAT),
                cfg.deadline_offset_hours,
                cfg.missing_window.start.format("%H:%M"),
            ),
            kind: NotificationKind::Missing,
            related_id: None,
            created_at: now,
        })
        .collect();

    if notifications.is_empty() {
        info!("all active employees checked in today");
        return Ok(0);
    }

    store.insert_notifications(&notifications).await?;
    info!(count = notifications.len(), "absence notifications sent");
    Ok(notifications.len() as u32)
}

/// Remind employees who checked in but never checked out.
///
/// Same claim-then-insert shape as the late rule, on the other flag.
/// The reminder carries no deadline.
pub async fn run_incomplete_rule(
    store: &dyn AttendanceStore,
    _cfg: &ComplianceConfig,
    today: NaiveDate,
    now: NaiveDateTime,
) -> anyhow::Result<u32> {
    let candidates = store.find_incomplete_unnotified(today).await?;
    if candidates.is_empty() {
        info!("no incomplete attendance records found");
        return Ok(0);
    }

    let mut dispatched = 0;
    for record in candidates {
        if !store.claim_incomplete_flag(record.id).await? {
            continue;
        }

        let notification = NewNotification {
            employee_id: record.employee_id,
            company_id: record.company_id,
            title: "Reminder: Check Out".to_string(),
            message: "You checked in today but have not checked out. Remember to check out at the end of your workday.".to_string(),
            kind: NotificationKind::Incomplete,
            related_id: Some(record.id),
            created_at: now,
        };
        store.insert_notifications(&[notification]).await?;
        info!(
            employee_id = record.employee_id,
            "incomplete attendance reminder sent"
        );
        dispatched += 1;
    }

    Ok(dispatched)
}
