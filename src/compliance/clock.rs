use chrono::{DateTime, Duration, NaiveDateTime, Utc};

use super::config::ComplianceConfig;

/// Source of the current instant.
///
/// Injected rather than read ad hoc so window gating and deadline
/// arithmetic are testable without real time passing.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

/// Wall clock used in production.
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl ComplianceConfig {
    /// Current wall-clock time in the business time zone.
    pub fn local_now(&self, clock: &dyn Clock) -> NaiveDateTime {
        (clock.now_utc() + Duration::minutes(self.tz_offset_minutes as i64)).naive_utc()
    }
}

/// Clock pinned to one instant.
#[cfg(test)]
pub struct FixedClock(pub DateTime<Utc>);

#[cfg(test)]
impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn local_now_applies_configured_offset() {
        let mut cfg = super::super::config::test_config();
        cfg.tz_offset_minutes = -300; // UTC-5

        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 3, 4, 14, 15, 0).unwrap());

        assert_eq!(
            cfg.local_now(&clock),
            chrono::NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap()
        );
    }
}
