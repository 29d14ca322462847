//! Outgoing frame construction.
//!
//! [`FrameEncoder`] follows the device's begin/write/end discipline: writes
//! that would overflow the send buffer are skipped and remembered, and
//! [`FrameEncoder::finish`] refuses to produce a frame afterwards. The free
//! functions build the fixed layouts used by each command.

use bytes::Bytes;

use super::Frame;
use crate::{
    byte_order::write_wire_u16,
    error::EncodeError,
    metrics,
    protocol::{
        ADDRESS,
        ADDRESS_INDEX,
        COMMAND_INDEX,
        CONTENT_INDEX,
        Command,
        HEADER_0,
        HEADER_1,
        LENGTH_INDEX,
        MAX_CONTENT_LENGTH,
        MAX_FRAME_SIZE,
        checksum,
    },
};

/// Reusable builder for outgoing frames.
///
/// # Examples
///
/// ```
/// use huskyframe::{frame::FrameEncoder, protocol::Command};
///
/// let mut encoder = FrameEncoder::new();
/// let frame = encoder
///     .begin(Command::SELECT_ALGORITHM)
///     .write_u16(3)
///     .finish()
///     .expect("fits");
/// assert_eq!(frame.as_bytes(), [0x55, 0xAA, 0x11, 0x02, 0x2D, 0x03, 0x00, 0x42]);
/// ```
#[derive(Clone, Debug)]
pub struct FrameEncoder {
    buffer: [u8; MAX_FRAME_SIZE],
    cursor: usize,
    failure: Option<EncodeError>,
}

impl Default for FrameEncoder {
    fn default() -> Self { Self::new() }
}

impl FrameEncoder {
    /// Create an encoder; call [`begin`](Self::begin) before writing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; MAX_FRAME_SIZE],
            cursor: CONTENT_INDEX,
            failure: None,
        }
    }

    /// Start a new frame carrying `command`, discarding any previous state.
    pub fn begin(&mut self, command: Command) -> &mut Self {
        self.failure = None;
        self.buffer[0] = HEADER_0;
        self.buffer[1] = HEADER_1;
        self.buffer[ADDRESS_INDEX] = ADDRESS;
        self.buffer[COMMAND_INDEX] = command.byte();
        self.cursor = CONTENT_INDEX;
        self
    }

    /// Append one byte of content.
    pub fn write_u8(&mut self, value: u8) -> &mut Self { self.write_bytes(&[value]) }

    /// Append a little-endian `u16`.
    pub fn write_u16(&mut self, value: u16) -> &mut Self { self.write_bytes(&write_wire_u16(value)) }

    /// Append raw content bytes.
    ///
    /// When the bytes do not fit, nothing is written and the frame is marked
    /// as failed.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> &mut Self {
        let needed = self.cursor + bytes.len();
        if needed > CONTENT_INDEX + MAX_CONTENT_LENGTH {
            self.fail(EncodeError::Overflow {
                needed: needed + 1,
                max: MAX_FRAME_SIZE - 1,
            });
            return self;
        }
        self.buffer[self.cursor..needed].copy_from_slice(bytes);
        self.cursor = needed;
        self
    }

    /// Append text as one byte per character.
    ///
    /// Characters above U+00FF cannot be represented and fail the frame.
    pub fn write_text(&mut self, text: &str) -> &mut Self {
        for ch in text.chars() {
            match u8::try_from(ch) {
                Ok(byte) => {
                    self.write_u8(byte);
                }
                Err(_) => {
                    self.fail(EncodeError::UnsupportedCharacter(ch));
                    break;
                }
            }
        }
        self
    }

    /// Number of content bytes written so far.
    #[must_use]
    pub const fn content_len(&self) -> usize { self.cursor - CONTENT_INDEX }

    /// Close the frame: fill in the content length and checksum.
    ///
    /// # Errors
    ///
    /// Returns the first [`EncodeError`] recorded since
    /// [`begin`](Self::begin). No frame is produced in that case and the
    /// caller must not transmit anything.
    pub fn finish(&mut self) -> Result<Frame, EncodeError> {
        if let Some(failure) = self.failure {
            return Err(failure);
        }
        if self.cursor + 1 >= MAX_FRAME_SIZE {
            return Err(EncodeError::Overflow {
                needed: self.cursor + 1,
                max: MAX_FRAME_SIZE - 1,
            });
        }
        let length = u8::try_from(self.content_len()).map_err(|_| EncodeError::Overflow {
            needed: self.cursor + 1,
            max: MAX_FRAME_SIZE - 1,
        })?;
        self.buffer[LENGTH_INDEX] = length;
        self.buffer[self.cursor] = checksum(&self.buffer[..self.cursor]);
        let end = self.cursor + 1;
        metrics::inc_frames(metrics::Direction::Outbound);
        Ok(Frame::from_validated(Bytes::copy_from_slice(
            &self.buffer[..end],
        )))
    }

    fn fail(&mut self, error: EncodeError) {
        tracing::debug!(%error, "outgoing frame rejected");
        self.failure.get_or_insert(error);
    }
}

/// Frame carrying only a command byte.
///
/// # Errors
///
/// Never fails in practice; the signature matches the other builders.
pub fn command_frame(command: Command) -> Result<Frame, EncodeError> {
    FrameEncoder::new().begin(command).finish()
}

/// Frame carrying a command and one 16-bit argument.
///
/// # Errors
///
/// Never fails in practice; the signature matches the other builders.
pub fn u16_argument_frame(command: Command, argument: u16) -> Result<Frame, EncodeError> {
    FrameEncoder::new().begin(command).write_u16(argument).finish()
}

/// Frame assigning `name` to a learned `id`.
///
/// Content layout: `[id][(len + 1) * 2][name bytes][0]`.
///
/// # Errors
///
/// Returns [`EncodeError`] if the name is too long or contains characters
/// outside one byte.
pub fn set_name_frame(id: u8, name: &str) -> Result<Frame, EncodeError> {
    let declared = name
        .chars()
        .count()
        .checked_add(1)
        .and_then(|n| n.checked_mul(2))
        .and_then(|n| u8::try_from(n).ok())
        .ok_or(EncodeError::Overflow {
            needed: CONTENT_INDEX + 3 + name.len() + 1,
            max: MAX_FRAME_SIZE - 1,
        })?;
    FrameEncoder::new()
        .begin(Command::SET_NAME)
        .write_u8(id)
        .write_u8(declared)
        .write_text(name)
        .write_u8(0)
        .finish()
}

/// Frame drawing `text` at (`x`, `y`) on the device screen.
///
/// Content layout: `[len][x_high][x_low][y][text bytes]`. The screen is wider
/// than one byte, so `x` above 255 is sent as `0xFF` followed by `x % 255`.
///
/// # Errors
///
/// Returns [`EncodeError`] if the text is too long or contains characters
/// outside one byte.
pub fn osd_text_frame(text: &str, x: u16, y: u8) -> Result<Frame, EncodeError> {
    let length = u8::try_from(text.chars().count()).map_err(|_| EncodeError::Overflow {
        needed: CONTENT_INDEX + 4 + text.len() + 1,
        max: MAX_FRAME_SIZE - 1,
    })?;
    let (x_high, x_low) = match u8::try_from(x) {
        Ok(low) => (0, low),
        // x % 255 is at most 254.
        Err(_) => (0xFF, u8::try_from(x % 255).unwrap_or(u8::MAX)),
    };
    FrameEncoder::new()
        .begin(Command::SET_OSD_TEXT)
        .write_u8(length)
        .write_u8(x_high)
        .write_u8(x_low)
        .write_u8(y)
        .write_text(text)
        .finish()
}
