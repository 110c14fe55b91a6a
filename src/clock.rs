//! Clock seam for eta and age computations.
//!
//! Adapters and alert filters never call `Local::now()` directly — they take
//! a [`Clock`] so arrival times and feed ages are deterministic under test.

use chrono::{DateTime, Duration, Local};

/// Source of "now" for everything time-dependent in the core.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// Production clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format an arrival time `minutes` from now as 24-hour `HH:mm` local time.
pub fn eta_from_now(clock: &dyn Clock, minutes: u32) -> String {
    let arrival = clock.now() + Duration::minutes(i64::from(minutes));
    arrival.format("%H:%M").to_string()
}

/// Render an age as `"<n>h"` when at least one full hour has passed,
/// otherwise `"<n>min"`.
pub fn age_hours_or_minutes(now: DateTime<Local>, then: DateTime<Local>) -> String {
    let elapsed = now - then;
    if elapsed.num_hours() >= 1 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}min", elapsed.num_minutes())
    }
}

/// Render an age as days when at least one full day has passed, then hours,
/// then minutes.
pub fn age_days_hours_or_minutes(now: DateTime<Local>, then: DateTime<Local>) -> String {
    let elapsed = now - then;
    if elapsed.num_days() >= 1 {
        format!("{}d", elapsed.num_days())
    } else if elapsed.num_hours() >= 1 {
        format!("{}h", elapsed.num_hours())
    } else {
        format!("{}min", elapsed.num_minutes())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::FixedClock;
    use super::*;
    use chrono::{NaiveTime, TimeZone, Timelike};

    fn at(h: u32, m: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 9, h, m, 0).unwrap()
    }

    #[test]
    fn eta_is_now_plus_minutes() {
        let clock = FixedClock(at(8, 15));
        assert_eq!(eta_from_now(&clock, 30), "08:45");
    }

    #[test]
    fn eta_rolls_over_midnight() {
        let clock = FixedClock(at(23, 50));
        assert_eq!(eta_from_now(&clock, 25), "00:15");
    }

    #[test]
    fn eta_round_trips_modulo_day() {
        let clock = FixedClock(at(17, 5));
        let minutes = 70u32;
        let eta = eta_from_now(&clock, minutes);
        let parsed = NaiveTime::parse_from_str(&eta, "%H:%M").unwrap();
        let recovered = (parsed.hour() * 60 + parsed.minute() + 24 * 60
            - (clock.0.hour() * 60 + clock.0.minute()))
            % (24 * 60);
        assert_eq!(recovered, minutes);
    }

    #[test]
    fn ages_switch_units() {
        let now = at(12, 0);
        assert_eq!(age_hours_or_minutes(now, at(10, 0)), "2h");
        assert_eq!(age_hours_or_minutes(now, at(11, 35)), "25min");
        assert_eq!(age_days_hours_or_minutes(now, at(11, 0)), "1h");
        assert_eq!(age_days_hours_or_minutes(now, at(11, 59)), "1min");
        let two_days_ago = now - Duration::days(2);
        assert_eq!(age_days_hours_or_minutes(now, two_days_ago), "2d");
    }
}
