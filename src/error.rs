//! Error taxonomy for the crate.
//!
//! None of these errors is fatal. The link is expected to drop, corrupt and
//! delay data routinely, so every failure maps to "this call produced no new
//! data":
//!
//! - [`FrameRejection`]: why the assembler discarded input. Only ever logged and counted; the
//!   assembler resynchronises silently.
//! - [`EncodeError`]: an outgoing frame did not fit the send buffer.
//! - [`DecodeError`]: a validated frame did not decode into the expected record.
//! - [`RequestError`]: a session operation finished without the data it asked for.

use std::io;

use thiserror::Error;

use crate::protocol::Command;

/// Reason the frame assembler discarded the bytes it had collected.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FrameRejection {
    /// The byte after `0x55` was not `0xAA`.
    #[error("bad second header byte {byte:#04x}")]
    BadHeader {
        /// Byte received in place of `0xAA`.
        byte: u8,
    },

    /// The content-length byte would overflow the receive buffer.
    #[error("content length {length} exceeds maximum {max}")]
    OversizedLength {
        /// Declared content length.
        length: usize,
        /// Largest accepted content length.
        max: usize,
    },

    /// The trailing checksum did not match the frame bytes.
    #[error("checksum mismatch: expected {expected:#04x}, got {actual:#04x}")]
    ChecksumMismatch {
        /// Checksum computed over the received bytes.
        expected: u8,
        /// Checksum byte carried by the frame.
        actual: u8,
    },
}

impl FrameRejection {
    /// Short label used for metrics.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::BadHeader { .. } => "bad_header",
            Self::OversizedLength { .. } => "oversized_length",
            Self::ChecksumMismatch { .. } => "checksum_mismatch",
        }
    }
}

/// Failure building an outgoing frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum EncodeError {
    /// Content would not fit the send buffer.
    #[error("frame overflow: {needed} bytes needed, at most {max} allowed")]
    Overflow {
        /// Bytes the frame would have needed.
        needed: usize,
        /// Size of the send buffer.
        max: usize,
    },

    /// Text contains a character that does not fit one byte.
    #[error("character {0:?} cannot be sent as a single byte")]
    UnsupportedCharacter(char),
}

/// Failure decoding a validated frame.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    /// The frame carries a different command from the one expected.
    #[error("expected {expected}, got {actual}")]
    CommandMismatch {
        /// Command the caller asked for.
        expected: Command,
        /// Command carried by the frame.
        actual: Command,
    },

    /// A read ran past the end of the frame content.
    #[error("read past end of content at offset {cursor} (content ends at {end})")]
    Truncated {
        /// Read cursor when the overrun happened.
        cursor: usize,
        /// End of the content block.
        end: usize,
    },

    /// The frame is neither a box nor an arrow record.
    #[error("unexpected record frame {command}")]
    UnexpectedRecord {
        /// Command carried by the frame.
        command: Command,
    },
}

/// Outcome of a session operation that did not yield fresh data.
#[derive(Debug, Error)]
pub enum RequestError {
    /// The transport reports no connection; no I/O was attempted.
    #[error("transport disconnected")]
    Disconnected,

    /// No reply to a request arrived within its window.
    #[error("timed out waiting for reply to {request}")]
    Timeout {
        /// Command whose reply was awaited.
        request: Command,
    },

    /// A bounded retry loop ran out of attempts.
    #[error("no acknowledgement after {attempts} attempts")]
    NoAcknowledgement {
        /// Attempts made.
        attempts: u32,
    },

    /// A reply frame could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// An outgoing frame could not be built.
    #[error("encode error: {0}")]
    Encode(#[from] EncodeError),

    /// The transport failed to write.
    #[error("transport error: {0}")]
    Io(#[from] io::Error),
}

impl RequestError {
    /// Returns true when the failure is a missing or late reply rather than a
    /// local problem.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::NoAcknowledgement { .. })
    }
}

/// Result alias used by session operations.
pub type Result<T> = std::result::Result<T, RequestError>;
