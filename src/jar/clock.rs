//! Time-of-day source for history entries.
//!
//! Entries carry display text, not timestamps: the time is formatted once,
//! when the entry is written, and stored as plain text.

use chrono::{DateTime, Local, NaiveTime, TimeZone};

/// `3:07:09 PM` style, no leading zero on the hour.
pub const TIME_FORMAT: &str = "%-I:%M:%S %p";

/// Supplies the current local time already formatted for display.
pub trait Clock: Send + Sync {
    fn time_of_day(&self) -> String;
}

/// Wall clock in the server's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalClock;

impl Clock for LocalClock {
    fn time_of_day(&self) -> String {
        format_time(&Local::now())
    }
}

/// Always reports the same time.
#[derive(Debug, Clone)]
pub struct FixedClock(String);

impl FixedClock {
    pub fn new(time: NaiveTime) -> Self {
        Self(time.format(TIME_FORMAT).to_string())
    }
}

impl Clock for FixedClock {
    fn time_of_day(&self) -> String {
        self.0.clone()
    }
}

pub fn format_time<Tz: TimeZone>(at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    at.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_format_matches_display_style() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 15, 7, 9).unwrap();
        assert_eq!(format_time(&at), "3:07:09 PM");

        let at = Utc.with_ymd_and_hms(2024, 3, 1, 0, 30, 0).unwrap();
        assert_eq!(format_time(&at), "12:30:00 AM");
    }

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::new(NaiveTime::from_hms_opt(9, 5, 0).unwrap());
        assert_eq!(clock.time_of_day(), "9:05:00 AM");
    }
}
