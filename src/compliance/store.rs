use std::collections::HashSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;

use crate::model::attendance::Attendance;
use crate::model::notification::NewNotification;
use crate::model::role::Role;

/// Roster read model for the missing-attendance sweep.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RosterEntry {
    pub id: u64,
    pub company_id: u64,
}

/// Persistence contract for the compliance engine.
///
/// Keeps the store technology swappable and the rules testable against
/// an in-memory implementation with identical claim semantics.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    /// Today's records flagged late whose notification has not gone out.
    async fn find_late_unnotified(&self, date: NaiveDate) -> anyhow::Result<Vec<Attendance>>;

    /// Today's records with a check-in but no check-out, not yet reminded.
    async fn find_incomplete_unnotified(&self, date: NaiveDate) -> anyhow::Result<Vec<Attendance>>;

    /// Active employees subject to attendance tracking (admins excluded).
    async fn find_active_roster(&self) -> anyhow::Result<Vec<RosterEntry>>;

    /// Employee ids with a recorded check-in for the date.
    async fn find_todays_checkins(&self, date: NaiveDate) -> anyhow::Result<HashSet<u64>>;

    /// Flip `late_notification_sent` from false to true as a single
    /// conditional write. Returns whether this caller won the transition;
    /// losers must not dispatch.
    async fn claim_late_flag(&self, record_id: u64) -> anyhow::Result<bool>;

    /// Same contract as `claim_late_flag`, for the check-out reminder flag.
    async fn claim_incomplete_flag(&self, record_id: u64) -> anyhow::Result<bool>;

    /// Append notification rows.
    async fn insert_notifications(&self, rows: &[NewNotification]) -> anyhow::Result<()>;
}

pub struct MySqlAttendanceStore {
    pool: MySqlPool,
}

impl MySqlAttendanceStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn claim_flag(&self, column: &str, record_id: u64) -> anyhow::Result<bool> {
        // Conditional update; the affected-row count decides the winner.
        let sql = format!(
            "UPDATE attendance SET {col} = TRUE WHERE id = ? AND {col} = FALSE",
            col = column
        );
        let result = sqlx::query(&sql)
            .bind(record_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl AttendanceStore for MySqlAttendanceStore {
    async fn find_late_unnotified(&self, date: NaiveDate) -> anyhow::Result<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, company_id, date, check_in, check_out,
                   is_late, late_minutes, late_notification_sent, incomplete_notification_sent
            FROM attendance
            WHERE date = ? AND is_late = TRUE AND late_notification_sent = FALSE
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_incomplete_unnotified(&self, date: NaiveDate) -> anyhow::Result<Vec<Attendance>> {
        let rows = sqlx::query_as::<_, Attendance>(
            r#"
            SELECT id, employee_id, company_id, date, check_in, check_out,
                   is_late, late_minutes, late_notification_sent, incomplete_notification_sent
            FROM attendance
            WHERE date = ?
              AND check_in IS NOT NULL
              AND check_out IS NULL
              AND incomplete_notification_sent = FALSE
            "#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_active_roster(&self) -> anyhow::Result<Vec<RosterEntry>> {
        let rows = sqlx::query_as::<_, RosterEntry>(
            r#"SELECT id, company_id FROM employees WHERE status = 'active' AND role <> ?"#,
        )
        .bind(Role::Admin.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_todays_checkins(&self, date: NaiveDate) -> anyhow::Result<HashSet<u64>> {
        let ids = sqlx::query_scalar::<_, u64>(
            r#"SELECT employee_id FROM attendance WHERE date = ? AND check_in IS NOT NULL"#,
        )
        .bind(date)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids.into_iter().collect())
    }

    async fn claim_late_flag(&self, record_id: u64) -> anyhow::Result<bool> {
        self.claim_flag("late_notification_sent", record_id).await
    }

    async fn claim_incomplete_flag(&self, record_id: u64) -> anyhow::Result<bool> {
        self.claim_flag("incomplete_notification_sent", record_id)
            .await
    }

    async fn insert_notifications(&self, rows: &[NewNotification]) -> anyhow::Result<()> {
        for row in rows {
            sqlx::query(
                r#"
                INSERT INTO notifications
                (employee_id, company_id, title, message, kind, related_id, is_read, created_at)
                VALUES (?, ?, ?, ?, ?, ?, FALSE, ?)
                "#,
            )
            .bind(row.employee_id)
            .bind(row.company_id)
            .bind(&row.title)
            .bind(&row.message)
            .bind(row.kind.as_str())
            .bind(row.related_id)
            .bind(row.created_at)
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use async_trait::async_trait;
    use chrono::NaiveDate;

    use crate::model::attendance::Attendance;
    use crate::model::notification::NewNotification;

    use super::{AttendanceStore, RosterEntry};

    /// In-memory store with the same claim semantics as the SQL one:
    /// each claim is a compare-and-set under one lock acquisition.
    #[derive(Default)]
    pub struct MemoryStore {
        pub records: Mutex<Vec<Attendance>>,
        pub roster: Mutex<Vec<RosterEntry>>,
        pub notifications: Mutex<Vec<NewNotification>>,
        pub fail_roster: AtomicBool,
    }

    impl MemoryStore {
        pub fn with_records(records: Vec<Attendance>) -> Self {
            Self {
                records: Mutex::new(records),
                ..Default::default()
            }
        }

        pub fn sent(&self) -> Vec<NewNotification> {
            self.notifications.lock().unwrap().clone()
        }
    }

    /// Blank record for tests; callers set the fields under test.
    pub fn record(id: u64, employee_id: u64, date: NaiveDate) -> Attendance {
        Attendance {
            id,
            employee_id,
            company_id: 1,
            date,
            check_in: None,
            check_out: None,
            is_late: false,
            late_minutes: 0,
            late_notification_sent: false,
            incomplete_notification_sent: false,
        }
    }

    #[async_trait]
    impl AttendanceStore for MemoryStore {
        async fn find_late_unnotified(&self, date: NaiveDate) -> anyhow::Result<Vec<Attendance>> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|r| r.date == date && r.is_late && !r.late_notification_sent)
                .cloned()
                .collect())
        }

        async fn find_incomplete_unnotified(
            &self,
            date: NaiveDate,
        ) -> anyhow::Result<Vec<Attendance>> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|r| {
                    r.date == date
                        && r.check_in.is_some()
                        && r.check_out.is_none()
                        && !r.incomplete_notification_sent
                })
                .cloned()
                .collect())
        }

        async fn find_active_roster(&self) -> anyhow::Result<Vec<RosterEntry>> {
            if self.fail_roster.load(Ordering::SeqCst) {
                anyhow::bail!("roster query failed");
            }
            Ok(self.roster.lock().unwrap().clone())
        }

        async fn find_todays_checkins(&self, date: NaiveDate) -> anyhow::Result<HashSet<u64>> {
            let records = self.records.lock().unwrap();
            Ok(records
                .iter()
                .filter(|r| r.date == date && r.check_in.is_some())
                .map(|r| r.employee_id)
                .collect())
        }

        async fn claim_late_flag(&self, record_id: u64) -> anyhow::Result<bool> {
            let mut records = self.records.lock().unwrap();
            match records
                .iter_mut()
                .find(|r| r.id == record_id && !r.late_notification_sent)
            {
                Some(r) => {
                    r.late_notification_sent = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn claim_incomplete_flag(&self, record_id: u64) -> anyhow::Result<bool> {
            let mut records = self.records.lock().unwrap();
            match records
                .iter_mut()
                .find(|r| r.id == record_id && !r.incomplete_notification_sent)
            {
                Some(r) => {
                    r.incomplete_notification_sent = true;
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn insert_notifications(&self, rows: &[NewNotification]) -> anyhow::Result<()> {
            self.notifications.lock().unwrap().extend_from_slice(rows);
            Ok(())
        }
    }
}
