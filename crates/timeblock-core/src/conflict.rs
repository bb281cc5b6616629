//! Temporal conflict detection.
//!
//! The scheduling invariant: no two stored events may occupy overlapping
//! `[date+start, date+end)` windows. Every insert or update runs the
//! candidate window through [`check_conflict`] against the full event set
//! before the write proceeds.
//!
//! The scan is linear over all events. That is fine at the scale this
//! store targets; callers needing more should index by date first.

use crate::error::{DomainError, DomainResult};
use crate::event::Event;
use crate::time::EventWindow;

/// Finds the first stored event whose window overlaps `candidate`.
///
/// `exclude_id` skips one event during the scan; updates pass the id of
/// the event being modified so it is not compared against itself.
pub fn find_conflict<'a, I>(
    candidate: &EventWindow,
    events: I,
    exclude_id: Option<i64>,
) -> Option<i64>
where
    I: IntoIterator<Item = &'a Event>,
{
    events
        .into_iter()
        .filter(|event| exclude_id != Some(event.id))
        .find(|event| candidate.overlaps(&event.window()))
        .map(|event| event.id)
}

/// Like [`find_conflict`], but maps any hit to [`DomainError::Conflict`]
/// carrying the colliding event's id.
pub fn check_conflict<'a, I>(
    candidate: &EventWindow,
    events: I,
    exclude_id: Option<i64>,
) -> DomainResult<()>
where
    I: IntoIterator<Item = &'a Event>,
{
    match find_conflict(candidate, events, exclude_id) {
        Some(conflicting_id) => Err(DomainError::conflict(conflicting_id)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, Location};
    use crate::time::{EventDate, TimeOfDay};
    use chrono::Utc;

    fn event(id: i64, date: &str, from: &str, to: &str) -> Event {
        EventDraft::new(
            format!("event-{id}"),
            EventDate::parse(date).unwrap(),
            TimeOfDay::parse(from).unwrap(),
            TimeOfDay::parse(to).unwrap(),
            Location::new("1 George St", "Sydney", "NSW", "2000"),
        )
        .into_event(id, Utc::now())
    }

    fn window(date: &str, from: &str, to: &str) -> EventWindow {
        EventWindow::new(
            EventDate::parse(date).unwrap(),
            TimeOfDay::parse(from).unwrap(),
            TimeOfDay::parse(to).unwrap(),
        )
    }

    #[test]
    fn detects_overlap_and_names_the_event() {
        let stored = vec![event(7, "10-06-2024", "09:00", "09:30")];
        let candidate = window("10-06-2024", "09:15", "09:45");

        assert_eq!(find_conflict(&candidate, &stored, None), Some(7));
        assert_eq!(
            check_conflict(&candidate, &stored, None),
            Err(DomainError::conflict(7))
        );
    }

    #[test]
    fn boundary_touch_is_not_a_conflict() {
        let stored = vec![event(1, "10-06-2024", "09:00", "09:30")];
        let candidate = window("10-06-2024", "09:30", "10:00");

        assert_eq!(find_conflict(&candidate, &stored, None), None);
    }

    #[test]
    fn excludes_the_event_being_updated() {
        let stored = vec![
            event(1, "10-06-2024", "09:00", "09:30"),
            event(2, "10-06-2024", "11:00", "11:30"),
        ];
        // Event 1 shifted ten minutes still overlaps its own stored window.
        let candidate = window("10-06-2024", "09:10", "09:40");

        assert_eq!(find_conflict(&candidate, &stored, Some(1)), None);
        // Without exclusion the same candidate collides with event 1.
        assert_eq!(find_conflict(&candidate, &stored, None), Some(1));
    }

    #[test]
    fn exclusion_does_not_mask_other_events() {
        let stored = vec![
            event(1, "10-06-2024", "09:00", "09:30"),
            event(2, "10-06-2024", "09:45", "10:15"),
        ];
        let candidate = window("10-06-2024", "09:20", "10:00");

        assert_eq!(find_conflict(&candidate, &stored, Some(1)), Some(2));
    }

    #[test]
    fn empty_store_never_conflicts() {
        let candidate = window("10-06-2024", "09:00", "17:00");
        assert_eq!(find_conflict(&candidate, &[], None), None);
    }
}
