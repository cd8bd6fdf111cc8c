use anyhow::{Context, bail};
use chrono::NaiveTime;
use std::env;

/// Business-day boundaries for the attendance compliance checks.
///
/// All times are wall-clock in the company's local time zone. Deployments
/// with different work schedules override these through the environment.
#[derive(Clone, Debug)]
pub struct ComplianceConfig {
    /// Minutes east of UTC for the business time zone.
    pub tz_offset_minutes: i32,

    /// Start of the workday; check-ins are measured against it.
    pub workday_start: NaiveTime,
    /// Minutes past `workday_start` before a check-in counts as late.
    pub late_grace_minutes: u32,

    /// Late arrivals can happen at any check-in, so this window spans
    /// the whole business day.
    pub late_window: TimeWindow,
    /// The missing check sweeps the entire roster; it gets a short
    /// once-a-day window anchored at the end-of-day cutoff.
    pub missing_window: TimeWindow,
    /// Check-out reminder window, shortly after the missing cutoff.
    pub incomplete_window: TimeWindow,

    /// Hours an employee has to submit a justification.
    pub deadline_offset_hours: i64,

    /// Upper bound on a single rule's execution within one tick.
    pub rule_timeout_secs: u64,
}

/// Half-open `[start, end)` slice of the local day.
#[derive(Clone, Copy, Debug)]
pub struct TimeWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl TimeWindow {
    pub fn contains(&self, at: NaiveTime) -> bool {
        self.start <= at && at < self.end
    }
}

impl ComplianceConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let cfg = Self {
            tz_offset_minutes: parse_env("TZ_OFFSET_MINUTES", "0")?,
            workday_start: parse_time_env("WORKDAY_START", "08:00")?,
            late_grace_minutes: parse_env("LATE_GRACE_MINUTES", "30")?,
            late_window: TimeWindow {
                start: parse_time_env("LATE_WINDOW_START", "08:00")?,
                end: parse_time_env("LATE_WINDOW_END", "18:00")?,
            },
            missing_window: TimeWindow {
                start: parse_time_env("MISSING_WINDOW_START", "17:30")?,
                end: parse_time_env("MISSING_WINDOW_END", "17:35")?,
            },
            incomplete_window: TimeWindow {
                start: parse_time_env("INCOMPLETE_WINDOW_START", "18:00")?,
                end: parse_time_env("INCOMPLETE_WINDOW_END", "18:05")?,
            },
            deadline_offset_hours: parse_env("DEADLINE_OFFSET_HOURS", "24")?,
            rule_timeout_secs: parse_env("RULE_TIMEOUT_SECS", "60")?,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Rejects configurations no tick can run under. Checked again at the
    /// start of every tick so a bad config is a top-level failure, not a
    /// silently skipped rule.
    pub fn validate(&self) -> anyhow::Result<()> {
        let windows = [
            ("late", &self.late_window),
            ("missing", &self.missing_window),
            ("incomplete", &self.incomplete_window),
        ];
        for (name, window) in windows {
            if window.start >= window.end {
                bail!(
                    "{} check window is empty: {} >= {}",
                    name,
                    window.start,
                    window.end
                );
            }
        }
        if self.deadline_offset_hours <= 0 {
            bail!(
                "deadline offset must be positive, got {}",
                self.deadline_offset_hours
            );
        }
        Ok(())
    }
}

fn parse_env<T>(key: &str, default: &str) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    raw.parse()
        .map_err(|e| anyhow::anyhow!("{} is invalid ({}): {}", key, raw, e))
}

fn parse_time_env(key: &str, default: &str) -> anyhow::Result<NaiveTime> {
    let raw = env::var(key).unwrap_or_else(|_| default.to_string());
    NaiveTime::parse_from_str(&raw, "%H:%M")
        .with_context(|| format!("{} must be HH:MM, got {}", key, raw))
}

/// Defaults mirroring the production schedule, shared by the compliance
/// test modules.
#[cfg(test)]
pub(crate) fn test_config() -> ComplianceConfig {
    fn t(hour: u32, min: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(hour, min, 0).unwrap()
    }

    ComplianceConfig {
        tz_offset_minutes: 0,
        workday_start: t(8, 0),
        late_grace_minutes: 30,
        late_window: TimeWindow {
            start: t(8, 0),
            end: t(18, 0),
        },
        missing_window: TimeWindow {
            start: t(17, 30),
            end: t(17, 35),
        },
        incomplete_window: TimeWindow {
            start: t(18, 0),
            end: t(18, 5),
        },
        deadline_offset_hours: 24,
        rule_timeout_secs: 60,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_membership_is_half_open() {
        let window = TimeWindow {
            start: NaiveTime::from_hms_opt(17, 30, 0).unwrap(),
            end: NaiveTime::from_hms_opt(17, 35, 0).unwrap(),
        };

        assert!(window.contains(NaiveTime::from_hms_opt(17, 30, 0).unwrap()));
        assert!(window.contains(NaiveTime::from_hms_opt(17, 34, 59).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(17, 35, 0).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(17, 29, 59).unwrap()));
    }

    #[test]
    fn validate_rejects_empty_window() {
        let mut cfg = test_config();
        cfg.missing_window.end = cfg.missing_window.start;

        assert!(cfg.validate().is_err());
    }

    #[test]
    fn validate_rejects_non_positive_deadline() {
        let mut cfg = test_config();
        cfg.deadline_offset_hours = 0;

        assert!(cfg.validate().is_err());
    }
}
