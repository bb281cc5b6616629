//! Length-prefixed message framing for IPC.
//!
//! Every message on the wire is a 4-byte big-endian length followed by
//! that many bytes of JSON:
//!
//! ```text
//! +----------------+------------------+
//! | length (4 BE)  |  JSON payload    |
//! +----------------+------------------+
//! ```

use std::io::{Read, Write};

use serde::{Serialize, de::DeserializeOwned};

use crate::MAX_MESSAGE_SIZE;
use crate::error::{ProtocolError, ProtocolResult};

/// Serializes a message and prepends its length prefix.
///
/// ```rust
/// use timeblock_protocol::{Envelope, Request, encode_message};
///
/// let envelope = Envelope::request("req-1", Request::Ping);
/// let bytes = encode_message(&envelope).unwrap();
/// assert!(bytes.len() > 4);
/// ```
pub fn encode_message<T: Serialize>(message: &T) -> ProtocolResult<Vec<u8>> {
    let json = serde_json::to_vec(message)?;
    let len = json.len() as u32;

    if len > MAX_MESSAGE_SIZE {
        return Err(ProtocolError::MessageTooLarge {
            size: len,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let mut buffer = Vec::with_capacity(4 + json.len());
    buffer.extend_from_slice(&len.to_be_bytes());
    buffer.extend_from_slice(&json);
    Ok(buffer)
}

/// Decodes one complete framed message from a byte slice.
///
/// ```rust
/// use timeblock_protocol::{Envelope, Request, decode_message, encode_message};
///
/// let envelope = Envelope::request("req-1", Request::Ping);
/// let bytes = encode_message(&envelope).unwrap();
/// let decoded: Envelope<Request> = decode_message(&bytes).unwrap();
/// assert_eq!(decoded.request_id, "req-1");
/// ```
pub fn decode_message<T: DeserializeOwned>(data: &[u8]) -> ProtocolResult<T> {
    let Some(len_bytes) = data.get(0..4) else {
        return Err(ProtocolError::IncompleteMessage {
            expected: 4,
            received: data.len(),
        });
    };

    let mut prefix = [0u8; 4];
    prefix.copy_from_slice(len_bytes);
    let len = u32::from_be_bytes(prefix) as usize;

    if len > MAX_MESSAGE_SIZE as usize {
        return Err(ProtocolError::MessageTooLarge {
            size: len as u32,
            max: MAX_MESSAGE_SIZE,
        });
    }

    let Some(json) = data.get(4..4 + len) else {
        return Err(ProtocolError::IncompleteMessage {
            expected: 4 + len,
            received: data.len(),
        });
    };

    Ok(serde_json::from_slice(json)?)
}

/// Reads framed messages from a byte stream.
pub struct FrameReader<R> {
    reader: R,
}

impl<R: Read> FrameReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads one framed message.
    ///
    /// Returns `Ok(None)` on a clean EOF before any bytes; a truncated
    /// frame or malformed payload is an error.
    pub fn read_message<T: DeserializeOwned>(&mut self) -> ProtocolResult<Option<T>> {
        let mut len_buf = [0u8; 4];
        match self.reader.read_exact(&mut len_buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE as usize {
            return Err(ProtocolError::MessageTooLarge {
                size: len as u32,
                max: MAX_MESSAGE_SIZE,
            });
        }

        if len == 0 {
            return Err(ProtocolError::EmptyMessage);
        }

        let mut payload = vec![0u8; len];
        self.reader.read_exact(&mut payload)?;

        Ok(Some(serde_json::from_slice(&payload)?))
    }

    /// Unwraps the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes framed messages to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes one framed message.
    pub fn write_message<T: Serialize>(&mut self, message: &T) -> ProtocolResult<()> {
        let data = encode_message(message)?;
        self.writer.write_all(&data)?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> ProtocolResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwraps the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Envelope, Request, Response};
    use std::io::Cursor;

    #[test]
    fn encode_decode_roundtrip() {
        let envelope = Envelope::request("req-123", Request::Ping);
        let bytes = encode_message(&envelope).unwrap();

        let len = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
        assert_eq!(len as usize, bytes.len() - 4);

        let decoded: Envelope<Request> = decode_message(&bytes).unwrap();
        assert_eq!(envelope, decoded);
    }

    #[test]
    fn decode_incomplete_length() {
        let result: ProtocolResult<Envelope<Request>> = decode_message(&[0, 0]);
        assert!(matches!(
            result,
            Err(ProtocolError::IncompleteMessage { expected: 4, .. })
        ));
    }

    #[test]
    fn decode_incomplete_payload() {
        // Claims 100 bytes, provides 10.
        let mut data = vec![0, 0, 0, 100];
        data.extend_from_slice(&[0u8; 10]);

        let result: ProtocolResult<Envelope<Request>> = decode_message(&data);
        assert!(matches!(
            result,
            Err(ProtocolError::IncompleteMessage { .. })
        ));
    }

    #[test]
    fn message_too_large() {
        let huge_len = MAX_MESSAGE_SIZE + 1;
        let data = huge_len.to_be_bytes();

        let result: ProtocolResult<Envelope<Request>> = decode_message(&data);
        assert!(matches!(result, Err(ProtocolError::MessageTooLarge { .. })));
    }

    #[test]
    fn frame_reader_single_message() {
        let envelope = Envelope::request("req-1", Request::get_event(7));
        let bytes = encode_message(&envelope).unwrap();

        let mut reader = FrameReader::new(Cursor::new(bytes));
        let decoded: Option<Envelope<Request>> = reader.read_message().unwrap();

        assert_eq!(decoded, Some(envelope));
    }

    #[test]
    fn frame_reader_empty_stream() {
        let mut reader = FrameReader::new(Cursor::new(Vec::new()));
        let result: Option<Envelope<Request>> = reader.read_message().unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn frame_reader_multiple_messages() {
        let msg1 = Envelope::request("req-1", Request::Ping);
        let msg2 = Envelope::request("req-2", Request::delete_event(3));

        let mut bytes = encode_message(&msg1).unwrap();
        bytes.extend(encode_message(&msg2).unwrap());

        let mut reader = FrameReader::new(Cursor::new(bytes));

        let decoded1: Envelope<Request> = reader.read_message().unwrap().unwrap();
        let decoded2: Envelope<Request> = reader.read_message().unwrap().unwrap();

        assert_eq!(decoded1, msg1);
        assert_eq!(decoded2, msg2);
    }

    #[test]
    fn frame_writer_roundtrip() {
        let envelope = Envelope::response("req-1", Response::Pong);
        let mut buffer = Vec::new();

        {
            let mut writer = FrameWriter::new(&mut buffer);
            writer.write_message(&envelope).unwrap();
            writer.flush().unwrap();
        }

        let decoded: Envelope<Response> = decode_message(&buffer).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn frame_reader_stops_at_eof() {
        let requests = vec![
            Envelope::request("1", Request::Ping),
            Envelope::request("2", Request::statistics("json")),
        ];

        let mut buffer = Vec::new();
        {
            let mut writer = FrameWriter::new(&mut buffer);
            for req in &requests {
                writer.write_message(req).unwrap();
            }
        }

        let mut reader = FrameReader::new(Cursor::new(buffer));
        for expected in &requests {
            let actual: Envelope<Request> = reader.read_message().unwrap().unwrap();
            assert_eq!(&actual, expected);
        }

        let eof: Option<Envelope<Request>> = reader.read_message().unwrap();
        assert!(eof.is_none());
    }

    #[test]
    fn zero_length_frame_is_an_error() {
        let buffer = 0u32.to_be_bytes().to_vec();

        let mut reader = FrameReader::new(Cursor::new(buffer));
        let result: ProtocolResult<Option<Envelope<Request>>> = reader.read_message();
        assert!(matches!(result, Err(ProtocolError::EmptyMessage)));
    }
}
