//! Core types: time, events, conflicts, queries, statistics, enrichment

pub mod conflict;
pub mod enrichment;
pub mod error;
pub mod event;
pub mod query;
pub mod stats;
pub mod time;
pub mod tracing;

pub use conflict::{check_conflict, find_conflict};
pub use enrichment::{EventMetadata, GeoPoint, WeatherSnapshot, is_weekend};
pub use error::{DomainError, DomainResult};
pub use event::{Event, EventDraft, EventPatch, Location, LocationPatch};
pub use query::{
    Column, Direction, EventPage, LinkRef, ListRequest, PageLinks, PageMetadata, ProjectedEvent,
    SortKey, event_href, list_events, parse_filter, parse_order,
};
pub use stats::{Statistics, aggregate};
pub use time::{DATE_FORMAT, EventDate, EventWindow, TIME_FORMAT, TimeOfDay};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
