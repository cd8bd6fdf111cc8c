use chrono::NaiveTime;
use serde::Serialize;
use strum_macros::Display;

use super::config::ComplianceConfig;

/// The three compliance checks, gated independently by time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RuleKind {
    Late,
    Missing,
    Incomplete,
}

/// Decides which checks may run at a given local wall-clock time.
///
/// The late check stays open across business hours since a late check-in
/// can land at any point of the day and each record carries its own
/// dispatch flag. The missing and incomplete checks compare whole-roster
/// state, so they run inside short once-a-day windows instead. Windows
/// must stay wider than the scheduler's tick interval or a day's run can
/// be skipped entirely.
pub struct TimeWindowGate<'a> {
    cfg: &'a ComplianceConfig,
}

impl<'a> TimeWindowGate<'a> {
    pub fn new(cfg: &'a ComplianceConfig) -> Self {
        Self { cfg }
    }

    pub fn eligible(&self, at: NaiveTime) -> Vec<RuleKind> {
        let mut rules = Vec::new();
        if self.cfg.late_window.contains(at) {
            rules.push(RuleKind::Late);
        }
        if self.cfg.missing_window.contains(at) {
            rules.push(RuleKind::Missing);
        }
        if self.cfg.incomplete_window.contains(at) {
            rules.push(RuleKind::Incomplete);
        }
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compliance::config::test_config;

    fn at(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    #[test]
    fn mid_morning_runs_only_the_late_check() {
        let cfg = test_config();
        let gate = TimeWindowGate::new(&cfg);

        assert_eq!(gate.eligible(at(10, 0)), vec![RuleKind::Late]);
    }

    #[test]
    fn missing_window_excludes_incomplete() {
        let cfg = test_config();
        let gate = TimeWindowGate::new(&cfg);

        assert_eq!(
            gate.eligible(at(17, 32)),
            vec![RuleKind::Late, RuleKind::Missing]
        );
    }

    #[test]
    fn incomplete_window_excludes_missing() {
        let cfg = test_config();
        let gate = TimeWindowGate::new(&cfg);

        assert_eq!(gate.eligible(at(18, 2)), vec![RuleKind::Incomplete]);
    }

    #[test]
    fn outside_business_hours_nothing_runs() {
        let cfg = test_config();
        let gate = TimeWindowGate::new(&cfg);

        assert!(gate.eligible(at(7, 59)).is_empty());
        assert!(gate.eligible(at(22, 0)).is_empty());
    }

    #[test]
    fn window_boundaries_are_half_open() {
        let cfg = test_config();
        let gate = TimeWindowGate::new(&cfg);

        // 08:00 opens the late window; 18:00 closes it and opens incomplete.
        assert_eq!(gate.eligible(at(8, 0)), vec![RuleKind::Late]);
        assert_eq!(gate.eligible(at(18, 0)), vec![RuleKind::Incomplete]);
        assert!(!gate.eligible(at(17, 35)).contains(&RuleKind::Missing));
    }
}
