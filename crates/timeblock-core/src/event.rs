//! Event types for the scheduling store.
//!
//! This module provides the persisted [`Event`] entity, its embedded
//! [`Location`], the validated [`EventDraft`] create input, and the
//! partial-update [`EventPatch`]/[`LocationPatch`] pair.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::time::{EventDate, EventWindow, TimeOfDay};

/// The venue an event takes place at. All fields are required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Street address.
    pub street: String,
    /// Suburb.
    pub suburb: String,
    /// State.
    pub state: String,
    /// Postal code.
    pub post_code: String,
}

impl Location {
    /// Creates a location from its four parts.
    pub fn new(
        street: impl Into<String>,
        suburb: impl Into<String>,
        state: impl Into<String>,
        post_code: impl Into<String>,
    ) -> Self {
        Self {
            street: street.into(),
            suburb: suburb.into(),
            state: state.into(),
            post_code: post_code.into(),
        }
    }

    /// Checks that every field is present and non-empty.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, value) in [
            ("street", &self.street),
            ("suburb", &self.suburb),
            ("state", &self.state),
            ("post-code", &self.post_code),
        ] {
            if value.trim().is_empty() {
                return Err(DomainError::validation(format!(
                    "location field {field:?} must not be empty"
                )));
            }
        }
        Ok(())
    }
}

/// Partial update of a [`Location`]: only the supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPatch {
    pub street: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub post_code: Option<String>,
}

impl LocationPatch {
    /// Applies the supplied fields to `location`, leaving the rest intact.
    pub fn apply_to(&self, location: &mut Location) {
        if let Some(street) = &self.street {
            location.street = street.clone();
        }
        if let Some(suburb) = &self.suburb {
            location.suburb = suburb.clone();
        }
        if let Some(state) = &self.state {
            location.state = state.clone();
        }
        if let Some(post_code) = &self.post_code {
            location.post_code = post_code.clone();
        }
    }
}

/// A stored calendar event.
///
/// Ids are assigned by the store on insert and never change; `last_update`
/// is refreshed by the store on every write and never set by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Store-assigned unique identifier.
    pub id: i64,
    /// Event name.
    pub name: String,
    /// Calendar date the event occurs on.
    pub date: EventDate,
    /// Start of the booked window.
    pub start_time: TimeOfDay,
    /// End of the booked window (exclusive).
    pub end_time: TimeOfDay,
    /// Where the event takes place.
    pub location: Location,
    /// Free-form description.
    pub description: Option<String>,
    /// Timestamp of the last create or mutation.
    pub last_update: DateTime<Utc>,
}

impl Event {
    /// The wall-clock window this event occupies.
    pub fn window(&self) -> EventWindow {
        EventWindow::new(self.date, self.start_time, self.end_time)
    }
}

/// Validated input for creating an event. Everything except the
/// description is required.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDraft {
    pub name: String,
    pub date: EventDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    pub location: Location,
    pub description: Option<String>,
}

impl EventDraft {
    /// Creates a draft with the required fields.
    pub fn new(
        name: impl Into<String>,
        date: EventDate,
        start_time: TimeOfDay,
        end_time: TimeOfDay,
        location: Location,
    ) -> Self {
        Self {
            name: name.into(),
            date,
            start_time,
            end_time,
            location,
            description: None,
        }
    }

    /// Builder method to set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Checks the required-field constraints.
    ///
    /// `start_time < end_time` is assumed by the conflict model, not
    /// checked here.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("event name must not be empty"));
        }
        self.location.validate()
    }

    /// The wall-clock window this draft would occupy.
    pub fn window(&self) -> EventWindow {
        EventWindow::new(self.date, self.start_time, self.end_time)
    }

    /// Materializes the draft into a stored event.
    pub fn into_event(self, id: i64, last_update: DateTime<Utc>) -> Event {
        Event {
            id,
            name: self.name,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            location: self.location,
            description: self.description,
            last_update,
        }
    }
}

/// Partial update of an [`Event`]: unset fields retain their stored
/// values, `last_update` is refreshed by the store as part of the apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub name: Option<String>,
    pub date: Option<EventDate>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub location: Option<LocationPatch>,
    pub description: Option<String>,
}

impl EventPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// The window the event would occupy after this patch is applied.
    ///
    /// Fields the patch leaves unset default to the event's current stored
    /// values, so the conflict scan always sees the merged candidate
    /// window rather than arbitrary defaults.
    pub fn merged_window(&self, current: &Event) -> EventWindow {
        EventWindow::new(
            self.date.unwrap_or(current.date),
            self.start_time.unwrap_or(current.start_time),
            self.end_time.unwrap_or(current.end_time),
        )
    }

    /// Applies the supplied fields to `event`, field by field.
    pub fn apply_to(&self, event: &mut Event) {
        if let Some(name) = &self.name {
            event.name = name.clone();
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(start_time) = self.start_time {
            event.start_time = start_time;
        }
        if let Some(end_time) = self.end_time {
            event.end_time = end_time;
        }
        if let Some(location) = &self.location {
            location.apply_to(&mut event.location);
        }
        if let Some(description) = &self.description {
            event.description = Some(description.clone());
        }
    }
}
