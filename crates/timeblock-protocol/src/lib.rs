//! IPC framing and request/response types for timeblock.
//!
//! Defines Protocol v1 for communication between clients and the
//! timeblock server over Unix sockets.
//!
//! # Protocol overview
//!
//! Messages are sent as length-prefixed JSON:
//! - 4 bytes: message length (u32, big-endian)
//! - N bytes: JSON payload
//!
//! Every message is wrapped in an [`Envelope`] carrying the protocol
//! version, a request id for correlation, and the payload.
//!
//! # Example
//!
//! ```rust
//! use timeblock_protocol::{Envelope, Request, decode_message, encode_message};
//!
//! let request = Envelope::request("req-123", Request::Ping);
//! let bytes = encode_message(&request).unwrap();
//! let decoded: Envelope<Request> = decode_message(&bytes).unwrap();
//! ```

mod error;
mod framing;
mod types;

pub use error::{ProtocolError, ProtocolResult};
pub use framing::{FrameReader, FrameWriter, decode_message, encode_message};
pub use types::{
    DeleteAck, Envelope, ErrorCode, ErrorResponse, EventDetail, EventPatchPayload, EventPayload,
    LocationDetail, LocationPayload, MutationAck, Request, Response, SelfLinks,
};

/// Protocol version constant.
pub const PROTOCOL_VERSION: &str = "1";

/// Maximum message size (1 MB).
pub const MAX_MESSAGE_SIZE: u32 = 1024 * 1024;
