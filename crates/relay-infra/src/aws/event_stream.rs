//! AWS event stream binary framing.
//!
//! Streaming AWS responses (Bedrock `InvokeAgent` among them) are a sequence
//! of frames with the layout:
//!
//! ```text
//! [total_len:4][headers_len:4][prelude_crc:4][headers...][payload...][msg_crc:4]
//! ```
//!
//! Each header is `[name_len:1][name:N][type:1][value...]`, where the value
//! encoding depends on the type tag. This module only frames the bytes; it
//! does not interpret payloads. CRCs are not verified -- the transport is TLS.

use thiserror::Error;

/// Prelude (12 bytes) plus trailing message CRC (4 bytes).
const FRAME_OVERHEAD: usize = 16;

/// Refuse frames larger than this; the service caps messages well below it.
const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("frame length {0} is out of range")]
    BadLength(usize),

    #[error("headers length {headers_len} exceeds frame length {total_len}")]
    HeadersOverflow { headers_len: usize, total_len: usize },

    #[error("truncated header block")]
    TruncatedHeader,

    #[error("unknown header value type {0}")]
    UnknownHeaderType(u8),
}

/// Typed header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderValue {
    Bool(bool),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Bytes(Vec<u8>),
    String(String),
    Timestamp(i64),
    Uuid([u8; 16]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: String,
    pub value: HeaderValue,
}

/// One decoded frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub headers: Vec<Header>,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Value of a string-typed header.
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.iter().find(|h| h.name == name).and_then(|h| match &h.value {
            HeaderValue::String(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// `:message-type` -- `event`, `exception` or `error`.
    pub fn message_type(&self) -> Option<&str> {
        self.header_str(":message-type")
    }

    pub fn event_type(&self) -> Option<&str> {
        self.header_str(":event-type")
    }

    pub fn exception_type(&self) -> Option<&str> {
        self.header_str(":exception-type")
    }

    /// `:error-code` on `error` frames.
    pub fn error_code(&self) -> Option<&str> {
        self.header_str(":error-code")
    }
}

/// Incremental decoder: feed body chunks in, pull complete frames out.
#[derive(Debug, Default)]
pub struct EventStreamDecoder {
    buffer: Vec<u8>,
}

impl EventStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    /// Bytes received but not yet consumed as a frame.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Pop the next complete frame, or `None` if more bytes are needed.
    pub fn next_frame(&mut self) -> Result<Option<Frame>, FrameError> {
        match parse_frame(&self.buffer)? {
            Some((frame, consumed)) => {
                self.buffer.drain(..consumed);
                Ok(Some(frame))
            }
            None => Ok(None),
        }
    }
}

/// Parse one frame from the front of `buf`.
///
/// Returns the frame and the number of bytes it occupied, or `None` if the
/// buffer does not yet hold a complete frame.
fn parse_frame(buf: &[u8]) -> Result<Option<(Frame, usize)>, FrameError> {
    if buf.len() < 12 {
        return Ok(None);
    }

    let total_len = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;
    let headers_len = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]) as usize;
    // bytes 8..12 = prelude CRC (skip)

    if !(FRAME_OVERHEAD..=MAX_FRAME_LEN).contains(&total_len) {
        return Err(FrameError::BadLength(total_len));
    }
    if headers_len > total_len - FRAME_OVERHEAD {
        return Err(FrameError::HeadersOverflow {
            headers_len,
            total_len,
        });
    }
    if buf.len() < total_len {
        return Ok(None);
    }

    let headers_start = 12;
    let headers_end = headers_start + headers_len;
    let payload_end = total_len - 4; // last 4 bytes = message CRC

    let headers = parse_headers(&buf[headers_start..headers_end])?;
    let payload = buf[headers_end..payload_end].to_vec();

    Ok(Some((Frame { headers, payload }, total_len)))
}

fn take<'a>(buf: &mut &'a [u8], n: usize) -> Result<&'a [u8], FrameError> {
    if buf.len() < n {
        return Err(FrameError::TruncatedHeader);
    }
    let current: &'a [u8] = *buf;
    let (head, tail) = current.split_at(n);
    *buf = tail;
    Ok(head)
}

fn take_array<const N: usize>(buf: &mut &[u8]) -> Result<[u8; N], FrameError> {
    let mut out = [0u8; N];
    out.copy_from_slice(take(buf, N)?);
    Ok(out)
}

/// Parse the header block of a frame.
fn parse_headers(mut buf: &[u8]) -> Result<Vec<Header>, FrameError> {
    let mut headers = Vec::new();

    while !buf.is_empty() {
        let name_len = take(&mut buf, 1)?[0] as usize;
        let name = String::from_utf8_lossy(take(&mut buf, name_len)?).to_string();
        let header_type = take(&mut buf, 1)?[0];

        let value = match header_type {
            0 => HeaderValue::Bool(true),
            1 => HeaderValue::Bool(false),
            2 => HeaderValue::Byte(i8::from_be_bytes(take_array::<1>(&mut buf)?)),
            3 => HeaderValue::Short(i16::from_be_bytes(take_array::<2>(&mut buf)?)),
            4 => HeaderValue::Int(i32::from_be_bytes(take_array::<4>(&mut buf)?)),
            5 => HeaderValue::Long(i64::from_be_bytes(take_array::<8>(&mut buf)?)),
            6 | 7 => {
                let len = u16::from_be_bytes(take_array::<2>(&mut buf)?) as usize;
                let raw = take(&mut buf, len)?;
                if header_type == 6 {
                    HeaderValue::Bytes(raw.to_vec())
                } else {
                    HeaderValue::String(String::from_utf8_lossy(raw).to_string())
                }
            }
            8 => HeaderValue::Timestamp(i64::from_be_bytes(take_array::<8>(&mut buf)?)),
            9 => HeaderValue::Uuid(take_array::<16>(&mut buf)?),
            other => return Err(FrameError::UnknownHeaderType(other)),
        };

        headers.push(Header { name, value });
    }

    Ok(headers)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Frame builders shared by decoder and client tests.

    /// Encode a string header.
    pub fn string_header(name: &str, value: &str) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.push(name.len() as u8);
        buf.extend_from_slice(name.as_bytes());
        buf.push(7);
        buf.extend_from_slice(&(value.len() as u16).to_be_bytes());
        buf.extend_from_slice(value.as_bytes());
        buf
    }

    /// Assemble a frame from pre-encoded headers and a payload (dummy CRCs).
    pub fn frame(headers: &[Vec<u8>], payload: &[u8]) -> Vec<u8> {
        let headers_buf: Vec<u8> = headers.concat();
        let total_len = 12 + headers_buf.len() + payload.len() + 4;

        let mut out = Vec::with_capacity(total_len);
        out.extend_from_slice(&(total_len as u32).to_be_bytes());
        out.extend_from_slice(&(headers_buf.len() as u32).to_be_bytes());
        out.extend_from_slice(&[0u8; 4]);
        out.extend_from_slice(&headers_buf);
        out.extend_from_slice(payload);
        out.extend_from_slice(&[0u8; 4]);
        out
    }

    /// A `chunk` event frame as sent by Bedrock Agents.
    pub fn chunk_event(payload: &str) -> Vec<u8> {
        frame(
            &[
                string_header(":event-type", "chunk"),
                string_header(":content-type", "application/json"),
                string_header(":message-type", "event"),
            ],
            payload.as_bytes(),
        )
    }

    /// An exception frame.
    pub fn exception(kind: &str, message: &str) -> Vec<u8> {
        frame(
            &[
                string_header(":exception-type", kind),
                string_header(":content-type", "application/json"),
                string_header(":message-type", "exception"),
            ],
            format!(r#"{{"message":"{message}"}}"#).as_bytes(),
        )
    }
}
