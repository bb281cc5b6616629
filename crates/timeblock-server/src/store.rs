//! In-memory event store.
//!
//! All access goes through `&mut self`, so each insert/update runs its
//! validation, conflict scan and write as one step with no interleaving
//! writer. Ids are assigned from a monotonic counter and never reused,
//! even after deletes.

use chrono::Utc;
use timeblock_core::{DomainError, DomainResult, Event, EventDraft, EventPatch, check_conflict};

/// The event collection behind every request.
#[derive(Debug)]
pub struct EventStore {
    events: Vec<Event>,
    next_id: i64,
}

impl Default for EventStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Validates, conflict-checks and inserts a draft, returning the
    /// stored event with its assigned id and `last_update` stamp.
    pub fn insert(&mut self, draft: EventDraft) -> DomainResult<Event> {
        draft.validate()?;
        check_conflict(&draft.window(), &self.events, None)?;

        let id = self.next_id;
        self.next_id += 1;

        let event = draft.into_event(id, Utc::now());
        self.events.push(event.clone());
        Ok(event)
    }

    /// Looks up an event by id.
    pub fn get(&self, id: i64) -> DomainResult<&Event> {
        self.events
            .iter()
            .find(|event| event.id == id)
            .ok_or_else(|| DomainError::not_found(id))
    }

    /// Applies a partial update to the event with the given id.
    ///
    /// The conflict scan runs against the merged post-patch window and
    /// excludes the event itself, so an event can always be rewritten in
    /// place. `last_update` is refreshed as part of the apply.
    pub fn update(&mut self, id: i64, patch: &EventPatch) -> DomainResult<Event> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| DomainError::not_found(id))?;

        let candidate = patch.merged_window(&self.events[index]);
        check_conflict(&candidate, &self.events, Some(id))?;

        let event = &mut self.events[index];
        patch.apply_to(event);
        event.last_update = Utc::now();
        Ok(event.clone())
    }

    /// Removes the event with the given id.
    pub fn delete(&mut self, id: i64) -> DomainResult<()> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| DomainError::not_found(id))?;

        self.events.remove(index);
        Ok(())
    }

    /// All stored events, in insertion order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Number of stored events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Returns true if the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
