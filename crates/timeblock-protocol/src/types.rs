//! Request and response types for the timeblock protocol.
//!
//! Payload structs carry the wire vocabulary (`from`, `to`, `post-code`,
//! `last-update`); conversions into the core types live here so the
//! server only ever sees validated domain values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use timeblock_core::{
    DomainError, DomainResult, Event, EventDate, EventDraft, EventMetadata, EventPage, EventPatch,
    LinkRef, ListRequest, Location, LocationPatch, Statistics, TimeOfDay, event_href,
};

use crate::PROTOCOL_VERSION;

/// Message envelope wrapping all protocol messages.
///
/// Every message exchanged between client and server carries the protocol
/// version and a request id for correlation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// Protocol version (always "1" for v1).
    pub protocol_version: String,
    /// Unique request ID for correlation.
    pub request_id: String,
    /// The actual payload.
    pub payload: T,
}

impl<T> Envelope<T> {
    /// Creates a new envelope with the current protocol version.
    pub fn new(request_id: impl Into<String>, payload: T) -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION.to_string(),
            request_id: request_id.into(),
            payload,
        }
    }

    /// Creates a request envelope.
    pub fn request(request_id: impl Into<String>, request: T) -> Self {
        Self::new(request_id, request)
    }

    /// Creates a response envelope.
    pub fn response(request_id: impl Into<String>, response: T) -> Self {
        Self::new(request_id, response)
    }

    /// Checks if this envelope uses a compatible protocol version.
    pub fn is_compatible(&self) -> bool {
        self.protocol_version == PROTOCOL_VERSION
    }
}

fn default_statistics_format() -> String {
    "json".to_string()
}

/// Request types sent from client to server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Create an event.
    CreateEvent {
        #[serde(flatten)]
        event: EventPayload,
    },

    /// Fetch one event with its enrichment metadata.
    GetEvent { id: i64 },

    /// Partially update an event.
    UpdateEvent {
        id: i64,
        #[serde(flatten)]
        patch: EventPatchPayload,
    },

    /// Delete an event.
    DeleteEvent { id: i64 },

    /// List events with ordering, projection and pagination.
    ListEvents {
        #[serde(flatten)]
        query: ListRequest,
    },

    /// Collection statistics, as `json` or as an `image`.
    Statistics {
        #[serde(default = "default_statistics_format")]
        format: String,
    },

    /// Request server shutdown.
    Shutdown,

    /// Ping to check server liveness.
    Ping,
}

impl Request {
    /// Creates a CreateEvent request.
    pub fn create_event(event: EventPayload) -> Self {
        Self::CreateEvent { event }
    }

    /// Creates a GetEvent request.
    pub fn get_event(id: i64) -> Self {
        Self::GetEvent { id }
    }

    /// Creates an UpdateEvent request.
    pub fn update_event(id: i64, patch: EventPatchPayload) -> Self {
        Self::UpdateEvent { id, patch }
    }

    /// Creates a DeleteEvent request.
    pub fn delete_event(id: i64) -> Self {
        Self::DeleteEvent { id }
    }

    /// Creates a ListEvents request.
    pub fn list_events(query: ListRequest) -> Self {
        Self::ListEvents { query }
    }

    /// Creates a Statistics request.
    pub fn statistics(format: impl Into<String>) -> Self {
        Self::Statistics {
            format: format.into(),
        }
    }
}

fn require<T>(value: Option<T>, field: &str) -> DomainResult<T> {
    value.ok_or_else(|| DomainError::validation(format!("missing required field: {field}")))
}

/// Incoming location object. Every field is required on create, but the
/// requirement is enforced in [`LocationPayload::to_location`] rather
/// than by serde, so a missing field surfaces as a validation error
/// instead of a decode failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suburb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(rename = "post-code", default, skip_serializing_if = "Option::is_none")]
    pub post_code: Option<String>,
}

impl LocationPayload {
    /// Converts to a complete [`Location`], requiring every field.
    pub fn to_location(&self) -> DomainResult<Location> {
        Ok(Location::new(
            require(self.street.clone(), "location.street")?,
            require(self.suburb.clone(), "location.suburb")?,
            require(self.state.clone(), "location.state")?,
            require(self.post_code.clone(), "location.post-code")?,
        ))
    }

    /// Converts to a partial [`LocationPatch`] of the supplied fields.
    pub fn to_patch(&self) -> LocationPatch {
        LocationPatch {
            street: self.street.clone(),
            suburb: self.suburb.clone(),
            state: self.state.clone(),
            post_code: self.post_code.clone(),
        }
    }
}

impl From<&Location> for LocationPayload {
    fn from(location: &Location) -> Self {
        Self {
            street: Some(location.street.clone()),
            suburb: Some(location.suburb.clone()),
            state: Some(location.state.clone()),
            post_code: Some(location.post_code.clone()),
        }
    }
}

/// Incoming event fields for create, in wire vocabulary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "to", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EventPayload {
    /// Validates and converts into an [`EventDraft`].
    ///
    /// Missing required fields and unparseable dates/times come back as
    /// validation errors carrying the offending field name.
    pub fn to_draft(&self) -> DomainResult<EventDraft> {
        let name = require(self.name.clone(), "name")?;
        let date = EventDate::parse(&require(self.date.as_deref(), "date")?)?;
        let start_time = TimeOfDay::parse(&require(self.start_time.as_deref(), "from")?)?;
        let end_time = TimeOfDay::parse(&require(self.end_time.as_deref(), "to")?)?;
        let location = require(self.location.as_ref(), "location")?.to_location()?;

        let draft = EventDraft::new(name, date, start_time, end_time, location);
        Ok(match &self.description {
            Some(description) => draft.with_description(description),
            None => draft,
        })
    }
}

/// Incoming event fields for partial update. Any subset may be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPatchPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "from", default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(rename = "to", default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<LocationPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EventPatchPayload {
    /// Parses the supplied fields into an [`EventPatch`].
    pub fn to_patch(&self) -> DomainResult<EventPatch> {
        Ok(EventPatch {
            name: self.name.clone(),
            date: self.date.as_deref().map(EventDate::parse).transpose()?,
            start_time: self
                .start_time
                .as_deref()
                .map(TimeOfDay::parse)
                .transpose()?,
            end_time: self.end_time.as_deref().map(TimeOfDay::parse).transpose()?,
            location: self.location.as_ref().map(LocationPayload::to_patch),
            description: self.description.clone(),
        })
    }
}

/// The `_links` block of single-event responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelfLinks {
    #[serde(rename = "self")]
    pub self_link: LinkRef,
}

impl SelfLinks {
    /// Links to the detail resource of `id`.
    pub fn for_event(id: i64) -> Self {
        Self {
            self_link: LinkRef::new(event_href(id)),
        }
    }
}

/// Outgoing location object: always complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationDetail {
    pub street: String,
    pub suburb: String,
    pub state: String,
    #[serde(rename = "post-code")]
    pub post_code: String,
}

impl From<&Location> for LocationDetail {
    fn from(location: &Location) -> Self {
        Self {
            street: location.street.clone(),
            suburb: location.suburb.clone(),
            state: location.state.clone(),
            post_code: location.post_code.clone(),
        }
    }
}

/// Full single-event wire shape with enrichment metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDetail {
    pub id: i64,
    pub name: String,
    pub date: String,
    #[serde(rename = "from")]
    pub start_time: String,
    #[serde(rename = "to")]
    pub end_time: String,
    pub location: LocationDetail,
    pub description: Option<String>,
    #[serde(rename = "_metadata")]
    pub metadata: EventMetadata,
    #[serde(rename = "last-update")]
    pub last_update: DateTime<Utc>,
    #[serde(rename = "_links")]
    pub links: SelfLinks,
}

impl EventDetail {
    /// Projects a stored event plus its metadata into the wire shape.
    pub fn new(event: &Event, metadata: EventMetadata) -> Self {
        Self {
            id: event.id,
            name: event.name.clone(),
            date: event.date.to_string(),
            start_time: event.start_time.to_string(),
            end_time: event.end_time.to_string(),
            location: LocationDetail::from(&event.location),
            description: event.description.clone(),
            metadata,
            last_update: event.last_update,
            links: SelfLinks::for_event(event.id),
        }
    }
}

/// Acknowledgement for create/update: the id, the refreshed timestamp,
/// and a link to the detail resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationAck {
    pub id: i64,
    #[serde(rename = "last-update")]
    pub last_update: DateTime<Utc>,
    #[serde(rename = "_links")]
    pub links: SelfLinks,
}

impl MutationAck {
    /// Creates an ack for the given event.
    pub fn new(id: i64, last_update: DateTime<Utc>) -> Self {
        Self {
            id,
            last_update,
            links: SelfLinks::for_event(id),
        }
    }
}

impl From<&Event> for MutationAck {
    fn from(event: &Event) -> Self {
        Self::new(event.id, event.last_update)
    }
}

/// Acknowledgement for delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    pub message: String,
    pub id: i64,
}

impl DeleteAck {
    /// Creates the ack with its fixed removal message.
    pub fn new(id: i64) -> Self {
        Self {
            message: format!("The event with id {id} was removed from the database!"),
            id,
        }
    }
}

/// Response types sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Event created.
    Created {
        #[serde(flatten)]
        ack: MutationAck,
    },

    /// Event updated.
    Updated {
        #[serde(flatten)]
        ack: MutationAck,
    },

    /// Single-event detail.
    Detail {
        #[serde(flatten)]
        detail: Box<EventDetail>,
    },

    /// Event deleted.
    Deleted {
        #[serde(flatten)]
        ack: DeleteAck,
    },

    /// One page of a listing.
    Page {
        #[serde(flatten)]
        page: EventPage,
    },

    /// Collection statistics as JSON.
    Statistics {
        #[serde(flatten)]
        statistics: Statistics,
    },

    /// Collection statistics rendered as an SVG document.
    StatisticsImage { svg: String },

    /// Generic success response.
    Ok,

    /// Pong response to Ping.
    Pong,

    /// Error response.
    Error {
        #[serde(flatten)]
        error: ErrorResponse,
    },
}

impl Response {
    /// Creates a Created response.
    pub fn created(ack: MutationAck) -> Self {
        Self::Created { ack }
    }

    /// Creates an Updated response.
    pub fn updated(ack: MutationAck) -> Self {
        Self::Updated { ack }
    }

    /// Creates a Detail response.
    pub fn detail(detail: EventDetail) -> Self {
        Self::Detail {
            detail: Box::new(detail),
        }
    }

    /// Creates a Deleted response.
    pub fn deleted(id: i64) -> Self {
        Self::Deleted {
            ack: DeleteAck::new(id),
        }
    }

    /// Creates a Page response.
    pub fn page(page: EventPage) -> Self {
        Self::Page { page }
    }

    /// Creates a Statistics response.
    pub fn statistics(statistics: Statistics) -> Self {
        Self::Statistics { statistics }
    }

    /// Creates an Error response.
    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Error {
            error: ErrorResponse {
                code,
                message: message.into(),
            },
        }
    }

    /// Creates an error response from an ErrorResponse.
    pub fn from_error(error: ErrorResponse) -> Self {
        Self::Error { error }
    }

    /// Returns true unless this is an error response.
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Error { .. })
    }

    /// Returns the error if this is an error response.
    pub fn as_error(&self) -> Option<&ErrorResponse> {
        match self {
            Self::Error { error } => Some(error),
            _ => None,
        }
    }
}

/// Error codes for protocol errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Unknown or internal error.
    InternalError,

    /// Malformed request envelope or payload.
    InvalidRequest,

    /// A required field is missing or malformed.
    Validation,

    /// The candidate window overlaps a stored event.
    Conflict,

    /// Requested event not found.
    NotFound,

    /// Unsupported statistics format.
    InvalidFormat,

    /// Server is shutting down.
    ShuttingDown,
}

impl ErrorCode {
    /// Returns a human-readable description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::InternalError => "An internal error occurred",
            Self::InvalidRequest => "The request was invalid",
            Self::Validation => "The request failed validation",
            Self::Conflict => "The event window conflicts with an existing event",
            Self::NotFound => "Event not found",
            Self::InvalidFormat => "Unsupported statistics format",
            Self::ShuttingDown => "Server is shutting down",
        }
    }
}

/// Error response details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code.
    pub code: ErrorCode,
    /// Human-readable error message.
    pub message: String,
}

impl ErrorResponse {
    /// Creates a new error response.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid request error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }
}

impl From<&DomainError> for ErrorResponse {
    fn from(error: &DomainError) -> Self {
        let code = match error {
            DomainError::Validation(_) => ErrorCode::Validation,
            DomainError::Conflict { .. } => ErrorCode::Conflict,
            DomainError::NotFound { .. } => ErrorCode::NotFound,
            DomainError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
        };
        Self::new(code, error.to_string())
    }
}

impl From<DomainError> for ErrorResponse {
    fn from(error: DomainError) -> Self {
        Self::from(&error)
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

impl std::error::Error for ErrorResponse {}
