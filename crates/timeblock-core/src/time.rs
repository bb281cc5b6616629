//! Time types for scheduled events.
//!
//! This module provides [`EventDate`] and [`TimeOfDay`] for the wire
//! representations events are stored with (`DD-MM-YYYY` dates, `HH:MM`
//! times), and [`EventWindow`] for the half-open `[start, end)` interval a
//! booked event occupies on the wall clock.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

use crate::error::{DomainError, DomainResult};

/// Wire format for event dates.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Wire format for event times of day.
pub const TIME_FORMAT: &str = "%H:%M";

/// A calendar date, carried as `DD-MM-YYYY` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventDate(NaiveDate);

impl EventDate {
    /// Wraps a chrono date.
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a date from year/month/day, if the combination is valid.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Parses the wire form (`DD-MM-YYYY`).
    pub fn parse(input: &str) -> DomainResult<Self> {
        NaiveDate::parse_from_str(input, DATE_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("invalid date {input:?}, expected DD-MM-YYYY")))
    }

    /// Returns the underlying chrono date.
    pub fn as_naive(&self) -> NaiveDate {
        self.0
    }
}

impl fmt::Display for EventDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_FORMAT))
    }
}

impl FromStr for EventDate {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for EventDate {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Serialize for EventDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for EventDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

/// A time of day, carried as `HH:MM` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(NaiveTime);

impl TimeOfDay {
    /// Wraps a chrono time.
    pub fn new(time: NaiveTime) -> Self {
        Self(time)
    }

    /// Builds a time from hour/minute, if valid.
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// Parses the wire form (`HH:MM`).
    pub fn parse(input: &str) -> DomainResult<Self> {
        NaiveTime::parse_from_str(input, TIME_FORMAT)
            .map(Self)
            .map_err(|_| DomainError::validation(format!("invalid time {input:?}, expected HH:MM")))
    }

    /// Returns the underlying chrono time.
    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIME_FORMAT))
    }
}

impl FromStr for TimeOfDay {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(de::Error::custom)
    }
}

/// The half-open `[start, end)` wall-clock interval an event occupies.
///
/// Overlap checks combine the event date with its start and end times of
/// day, so events on different dates never collide, and an event ending at
/// the exact instant another starts does not collide either.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    start: NaiveDateTime,
    end: NaiveDateTime,
}

impl EventWindow {
    /// Builds the window for an event on `date` from `start` to `end`.
    pub fn new(date: EventDate, start: TimeOfDay, end: TimeOfDay) -> Self {
        let day = date.as_naive();
        Self {
            start: day.and_time(start.as_naive()),
            end: day.and_time(end.as_naive()),
        }
    }

    /// The inclusive start instant.
    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    /// The exclusive end instant.
    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    /// Whether two windows intersect.
    ///
    /// Standard half-open interval intersection: `S1 < E2 && S2 < E1`.
    /// Touching endpoints do not overlap.
    pub fn overlaps(&self, other: &EventWindow) -> bool {
        self.start < other.end && other.start < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> EventDate {
        EventDate::parse(s).unwrap()
    }

    fn time(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    mod event_date {
        use super::*;

        #[test]
        fn parse_and_display_roundtrip() {
            let d = date("10-06-2024");
            assert_eq!(d.as_naive(), NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
            assert_eq!(d.to_string(), "10-06-2024");
        }

        #[test]
        fn rejects_iso_order() {
            assert!(EventDate::parse("2024-06-10").is_err());
        }

        #[test]
        fn rejects_out_of_range() {
            assert!(matches!(
                EventDate::parse("32-01-2024"),
                Err(DomainError::Validation(_))
            ));
        }

        #[test]
        fn serde_uses_wire_form() {
            let d = date("01-02-2023");
            let json = serde_json::to_string(&d).unwrap();
            assert_eq!(json, "\"01-02-2023\"");
            let back: EventDate = serde_json::from_str(&json).unwrap();
            assert_eq!(back, d);
        }

        #[test]
        fn orders_chronologically() {
            // Lexicographic DD-MM-YYYY would put 02-01 after 01-02.
            assert!(date("02-01-2024") < date("01-02-2024"));
        }
    }

    mod time_of_day {
        use super::*;

        #[test]
        fn parse_and_display_roundtrip() {
            let t = time("09:05");
            assert_eq!(t.to_string(), "09:05");
        }

        #[test]
        fn rejects_seconds() {
            assert!(TimeOfDay::parse("09:00:00").is_err());
        }

        #[test]
        fn rejects_garbage() {
            assert!(TimeOfDay::parse("morning").is_err());
            assert!(TimeOfDay::parse("25:00").is_err());
        }
    }

    mod event_window {
        use super::*;

        fn window(d: &str, from: &str, to: &str) -> EventWindow {
            EventWindow::new(date(d), time(from), time(to))
        }

        #[test]
        fn overlapping_windows() {
            let a = window("10-06-2024", "09:00", "09:30");
            let b = window("10-06-2024", "09:15", "09:45");
            assert!(a.overlaps(&b));
            assert!(b.overlaps(&a));
        }

        #[test]
        fn touching_endpoints_do_not_overlap() {
            let a = window("10-06-2024", "09:00", "09:30");
            let b = window("10-06-2024", "09:30", "10:00");
            assert!(!a.overlaps(&b));
            assert!(!b.overlaps(&a));
        }

        #[test]
        fn containment_overlaps() {
            let outer = window("10-06-2024", "08:00", "12:00");
            let inner = window("10-06-2024", "09:00", "09:30");
            assert!(outer.overlaps(&inner));
            assert!(inner.overlaps(&outer));
        }

        #[test]
        fn different_dates_never_overlap() {
            let a = window("10-06-2024", "09:00", "17:00");
            let b = window("11-06-2024", "09:00", "17:00");
            assert!(!a.overlaps(&b));
        }
    }
}
