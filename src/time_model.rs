//! The weekly time axis the schedule store and wire codec share.
//!
//! A week is represented as the half-open range of minutes `[0, 10080)`
//! (`7 * 24 * 60`). `DateTime` is the human-facing `(day, hour, minute)`
//! triple used on the wire; `toMinutes` collapses it to the scalar the store
//! actually compares against.

use crate::error::{Error, Result};

/// Total minutes in one repeating week.
pub const MINUTES_PER_WEEK: i32 = 7 * 24 * 60;

/// A point in the repeating week, as `(day, hour, minute)`.
///
/// `day` is 1-indexed (`1` = Monday .. `7` = Sunday), matching
/// `original_source/shared/Protocol.h`'s `DayOfWeek` enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl DateTime {
    pub fn new(day: u8, hour: u8, minute: u8) -> Result<Self> {
        if !(1..=7).contains(&day) {
            return Err(Error::Config(format!("day {} out of range 1..=7", day)));
        }
        if hour > 23 {
            return Err(Error::Config(format!("hour {} out of range 0..=23", hour)));
        }
        if minute > 59 {
            return Err(Error::Config(format!("minute {} out of range 0..=59", minute)));
        }
        Ok(Self { day, hour, minute })
    }

    /// `((day-1)*24 + hour)*60 + minute`, a value in `[0, 10080)`.
    pub fn to_minutes(self) -> i32 {
        (((self.day as i32 - 1) * 24) + self.hour as i32) * 60 + self.minute as i32
    }

    /// Inverse of [`to_minutes`](Self::to_minutes). `week_minute` must be in
    /// `[0, 10080]` — the week boundary itself (`10080`) is accepted since it
    /// is a legal reservation *end*, just never a legal day/hour/minute to
    /// render on its own (callers should special-case it before calling).
    pub fn from_minutes(week_minute: i32) -> Self {
        let wrapped = week_minute.rem_euclid(MINUTES_PER_WEEK);
        let day = (wrapped / 1440) as u8 + 1;
        let rest = wrapped % 1440;
        let hour = (rest / 60) as u8;
        let minute = (rest % 60) as u8;
        Self { day, hour, minute }
    }

    pub fn format_clock(self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

pub fn day_name(day: u8) -> &'static str {
    match day {
        1 => "Monday",
        2 => "Tuesday",
        3 => "Wednesday",
        4 => "Thursday",
        5 => "Friday",
        6 => "Saturday",
        7 => "Sunday",
        _ => "Unknown",
    }
}

/// Renders a week-minute that may equal the week boundary (`10080`) as
/// `"24:00"` on the final day rather than wrapping back to Monday midnight.
pub fn format_boundary_aware(week_minute: i32) -> String {
    if week_minute == MINUTES_PER_WEEK {
        return "Sun 24:00".to_string();
    }
    let dt = DateTime::from_minutes(week_minute);
    format!("{} {}", day_name(dt.day), dt.format_clock())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_minutes_monday_midnight_is_zero() {
        let dt = DateTime::new(1, 0, 0).unwrap();
        assert_eq!(dt.to_minutes(), 0);
    }

    #[test]
    fn to_minutes_sunday_last_minute_is_week_minus_one() {
        let dt = DateTime::new(7, 23, 59).unwrap();
        assert_eq!(dt.to_minutes(), MINUTES_PER_WEEK - 1);
    }

    #[test]
    fn round_trip_minutes_to_datetime() {
        for m in [0, 59, 60, 1439, 1440, 10079] {
            let dt = DateTime::from_minutes(m);
            assert_eq!(dt.to_minutes(), m);
        }
    }

    #[test]
    fn rejects_out_of_range_fields() {
        assert!(DateTime::new(8, 0, 0).is_err());
        assert!(DateTime::new(1, 24, 0).is_err());
        assert!(DateTime::new(1, 0, 60).is_err());
        assert!(DateTime::new(0, 0, 0).is_err());
    }
}
