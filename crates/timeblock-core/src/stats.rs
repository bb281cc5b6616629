//! Statistics aggregation over the event collection.
//!
//! Everything here is computed in a single pass relative to an explicit
//! `today`, so callers (and tests) control the clock. The current week is
//! Monday through Sunday; the current month is a calendar-year/month match,
//! not a rolling 30-day window.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::event::Event;
use crate::time::EventDate;

/// Aggregated counts over the whole event collection.
///
/// `per_day` is keyed by [`EventDate`], so it iterates (and serializes)
/// in chronological order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statistics {
    pub total: usize,
    #[serde(rename = "total-current-week")]
    pub total_current_week: usize,
    #[serde(rename = "total-current-month")]
    pub total_current_month: usize,
    #[serde(rename = "per-days")]
    pub per_day: BTreeMap<EventDate, usize>,
}

/// The Monday..=Sunday window containing `today`.
fn current_week(today: NaiveDate) -> (NaiveDate, NaiveDate) {
    let monday = today - Days::new(u64::from(today.weekday().num_days_from_monday()));
    (monday, monday + Days::new(6))
}

/// Computes [`Statistics`] for the collection as seen from `today`.
pub fn aggregate(events: &[Event], today: NaiveDate) -> Statistics {
    let (week_start, week_end) = current_week(today);

    let mut stats = Statistics {
        total: events.len(),
        total_current_week: 0,
        total_current_month: 0,
        per_day: BTreeMap::new(),
    };

    for event in events {
        let date = event.date.as_naive();
        if (week_start..=week_end).contains(&date) {
            stats.total_current_week += 1;
        }
        if date.year() == today.year() && date.month() == today.month() {
            stats.total_current_month += 1;
        }
        *stats.per_day.entry(event.date).or_insert(0) += 1;
    }

    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, Location};
    use crate::time::TimeOfDay;
    use chrono::Utc;

    fn event_on(id: i64, date: &str) -> Event {
        EventDraft::new(
            "Standup",
            EventDate::parse(date).unwrap(),
            TimeOfDay::parse("09:00").unwrap(),
            TimeOfDay::parse("09:30").unwrap(),
            Location::new("1 George St", "Sydney", "NSW", "2000"),
        )
        .into_event(id, Utc::now())
    }

    #[test]
    fn week_window_starts_on_monday() {
        // 2024-06-12 is a Wednesday.
        let wednesday = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let (start, end) = current_week(wednesday);
        assert_eq!(start, NaiveDate::from_ymd_opt(2024, 6, 10).unwrap());
        assert_eq!(end, NaiveDate::from_ymd_opt(2024, 6, 16).unwrap());
    }

    #[test]
    fn week_window_on_a_monday_and_a_sunday() {
        let monday = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(current_week(monday).0, monday);

        let sunday = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        assert_eq!(current_week(sunday).0, monday);
    }

    #[test]
    fn counts_week_month_and_total() {
        let events = vec![
            event_on(1, "12-06-2024"), // same week, same month
            event_on(2, "16-06-2024"), // sunday of the same week
            event_on(3, "01-06-2024"), // same month, earlier week
            event_on(4, "12-06-2023"), // same calendar month, other year
            event_on(5, "03-01-2024"), // neither
        ];
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let stats = aggregate(&events, today);

        assert_eq!(stats.total, 5);
        assert_eq!(stats.total_current_week, 2);
        assert_eq!(stats.total_current_month, 3);
    }

    #[test]
    fn month_match_requires_same_year() {
        let events = vec![event_on(1, "12-06-2023")];
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        assert_eq!(aggregate(&events, today).total_current_month, 0);
    }

    #[test]
    fn per_day_groups_and_orders_chronologically() {
        let events = vec![
            event_on(1, "01-02-2024"),
            event_on(2, "02-01-2024"),
            event_on(3, "01-02-2024"),
        ];
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let stats = aggregate(&events, today);

        let entries: Vec<(String, usize)> = stats
            .per_day
            .iter()
            .map(|(date, count)| (date.to_string(), *count))
            .collect();
        assert_eq!(
            entries,
            vec![("02-01-2024".to_string(), 1), ("01-02-2024".to_string(), 2)]
        );
    }

    #[test]
    fn wire_shape_uses_hyphenated_keys() {
        let events = vec![event_on(1, "12-06-2024")];
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let value = serde_json::to_value(aggregate(&events, today)).unwrap();

        assert_eq!(value["total"], 1);
        assert_eq!(value["total-current-week"], 1);
        assert_eq!(value["total-current-month"], 1);
        assert_eq!(value["per-days"]["12-06-2024"], 1);
    }

    #[test]
    fn empty_collection() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 12).unwrap();
        let stats = aggregate(&[], today);
        assert_eq!(stats.total, 0);
        assert!(stats.per_day.is_empty());
    }
}
