use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Serialize;
use tokio::time::timeout;
use tracing::{error, info};

use super::clock::Clock;
use super::config::ComplianceConfig;
use super::rules;
use super::store::AttendanceStore;
use super::window::{RuleKind, TimeWindowGate};

/// Per-rule outcome reported back to the scheduler.
#[derive(Debug, Serialize)]
pub struct RuleReport {
    pub rule: RuleKind,
    pub dispatched: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TickSummary {
    pub timestamp: NaiveDateTime,
    pub reports: Vec<RuleReport>,
}

impl TickSummary {
    pub fn report(&self, rule: RuleKind) -> Option<&RuleReport> {
        self.reports.iter().find(|r| r.rule == rule)
    }
}

/// One scheduler-triggered evaluation pass.
///
/// The tick owns no state of its own: everything is derived from the
/// store and the clock, so overlapping or retried invocations are safe
/// wherever a claim flag exists. Each eligible rule runs under its own
/// timeout and failure boundary; a store error in one rule is recorded
/// in its report and the remaining rules still run. Only configuration
/// problems abort the whole tick.
pub async fn run_tick(
    clock: &dyn Clock,
    store: &dyn AttendanceStore,
    cfg: &ComplianceConfig,
) -> anyhow::Result<TickSummary> {
    cfg.validate()?;

    let now = cfg.local_now(clock);
    let today = now.date();

    let eligible = TimeWindowGate::new(cfg).eligible(now.time());
    info!(%now, ?eligible, "attendance compliance tick");

    let mut reports = Vec::with_capacity(eligible.len());
    for rule in eligible {
        let run = async {
            match rule {
                RuleKind::Late => rules::run_late_rule(store, cfg, today, now).await,
                RuleKind::Missing => rules::run_missing_rule(store, cfg, today, now).await,
                RuleKind::Incomplete => rules::run_incomplete_rule(store, cfg, today, now).await,
            }
        };

        let report = match timeout(Duration::from_secs(cfg.rule_timeout_secs), run).await {
            Ok(Ok(dispatched)) => RuleReport {
                rule,
                dispatched,
                error: None,
            },
            Ok(Err(e)) => {
                error!(%rule, error = %e, "compliance rule failed");
                RuleReport {
                    rule,
                    dispatched: 0,
                    error: Some(e.to_string()),
                }
            }
            Err(_) => {
                error!(%rule, "compliance rule timed out");
                RuleReport {
                    rule,
                    dispatched: 0,
                    error: Some(format!("timed out after {}s", cfg.rule_timeout_secs)),
                }
            }
        };
        reports.push(report);
    }

    Ok(TickSummary {
        timestamp: now,
        reports,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::clock::FixedClock;
    use crate::compliance::config::test_config;
    use crate::compliance::store::RosterEntry;
    use crate::compliance::store::testing::{MemoryStore, record};
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::sync::atomic::Ordering;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 4).unwrap()
    }

    fn clock_at(hour: u32, min: u32) -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2024, 3, 4, hour, min, 0).unwrap())
    }

    fn late_record(id: u64, employee_id: u64) -> crate::model::attendance::Attendance {
        let mut r = record(id, employee_id, day());
        r.check_in = Some(day().and_hms_opt(9, 45, 0).unwrap());
        r.is_late = true;
        r.late_minutes = 30;
        r
    }

    #[tokio::test]
    async fn tick_runs_only_gated_rules() {
        let store = MemoryStore::with_records(vec![late_record(1, 10)]);
        let cfg = test_config();

        let summary = run_tick(&clock_at(10, 0), &store, &cfg).await.unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.report(RuleKind::Late).unwrap().dispatched, 1);
        assert!(summary.report(RuleKind::Missing).is_none());
        assert!(summary.report(RuleKind::Incomplete).is_none());
    }

    #[tokio::test]
    async fn rerunning_a_tick_dispatches_nothing_new() {
        let store = MemoryStore::with_records(vec![late_record(1, 10)]);
        let cfg = test_config();

        let first = run_tick(&clock_at(10, 0), &store, &cfg).await.unwrap();
        let second = run_tick(&clock_at(10, 5), &store, &cfg).await.unwrap();

        assert_eq!(first.report(RuleKind::Late).unwrap().dispatched, 1);
        assert_eq!(second.report(RuleKind::Late).unwrap().dispatched, 0);
        assert_eq!(store.sent().len(), 1);
    }

    #[tokio::test]
    async fn failing_rule_does_not_stop_the_others() {
        // At 17:32 both the late and missing checks are eligible. Break the
        // roster read: the missing rule must report the failure while the
        // late rule still dispatches.
        let store = MemoryStore::with_records(vec![late_record(1, 10)]);
        store.fail_roster.store(true, Ordering::SeqCst);
        let cfg = test_config();

        let summary = run_tick(&clock_at(17, 32), &store, &cfg).await.unwrap();

        assert_eq!(summary.reports.len(), 2);
        assert_eq!(summary.report(RuleKind::Late).unwrap().dispatched, 1);
        let missing = summary.report(RuleKind::Missing).unwrap();
        assert_eq!(missing.dispatched, 0);
        assert!(missing.error.as_deref().unwrap().contains("roster"));
    }

    #[tokio::test]
    async fn incomplete_window_runs_the_checkout_reminder() {
        let mut open_day = record(2, 20, day());
        open_day.check_in = Some(day().and_hms_opt(8, 5, 0).unwrap());
        let store = MemoryStore::with_records(vec![open_day]);
        let cfg = test_config();

        let summary = run_tick(&clock_at(18, 2), &store, &cfg).await.unwrap();

        assert_eq!(summary.reports.len(), 1);
        assert_eq!(summary.report(RuleKind::Incomplete).unwrap().dispatched, 1);
    }

    #[tokio::test]
    async fn missing_rule_sees_checkins_from_the_same_window() {
        // An employee who checked in moments before the sweep must not be
        // flagged absent: attendance is read inside the rule invocation.
        let store = MemoryStore::default();
        *store.roster.lock().unwrap() = vec![
            RosterEntry { id: 1, company_id: 1 },
            RosterEntry { id: 2, company_id: 1 },
        ];
        let mut just_checked_in = record(9, 1, day());
        just_checked_in.check_in = Some(day().and_hms_opt(17, 31, 0).unwrap());
        store.records.lock().unwrap().push(just_checked_in);

        let cfg = test_config();
        let summary = run_tick(&clock_at(17, 32), &store, &cfg).await.unwrap();

        assert_eq!(summary.report(RuleKind::Missing).unwrap().dispatched, 1);
        assert_eq!(store.sent()[0].employee_id, 2);
    }

    #[tokio::test]
    async fn invalid_configuration_fails_the_whole_tick() {
        let store = MemoryStore::default();
        let mut cfg = test_config();
        cfg.late_window.end = cfg.late_window.start;

        assert!(run_tick(&clock_at(10, 0), &store, &cfg).await.is_err());
    }

    #[tokio::test]
    async fn summary_timestamp_is_the_evaluation_instant() {
        let store = MemoryStore::default();
        let cfg = test_config();

        let summary = run_tick(&clock_at(10, 0), &store, &cfg).await.unwrap();

        assert_eq!(
            summary.timestamp,
            day().and_hms_opt(10, 0, 0).unwrap()
        );
    }
}
