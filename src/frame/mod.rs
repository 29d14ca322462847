//! Frames: assembly from a byte stream, encoding, and content reading.
//!
//! A [`Frame`] is always checksum-valid: it is produced either by the
//! [`FrameAssembler`] after verification or by the [`FrameEncoder`], which
//! computes the checksum itself.

use std::fmt;

use bytes::Bytes;

use crate::protocol::{ADDRESS_INDEX, COMMAND_INDEX, CONTENT_INDEX, Command, LENGTH_INDEX};

pub mod assembler;
pub mod encoder;
pub mod reader;

pub use assembler::{AssemblerState, FrameAssembler};
pub use encoder::{
    FrameEncoder,
    command_frame,
    osd_text_frame,
    set_name_frame,
    u16_argument_frame,
};
pub use reader::FrameReader;

/// One complete, checksum-validated protocol message.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    bytes: Bytes,
}

impl Frame {
    /// Wrap bytes already known to form a valid frame.
    pub(crate) fn from_validated(bytes: Bytes) -> Self { Self { bytes } }

    /// Scan `bytes` for the first valid frame.
    ///
    /// Leading noise and corrupt frames are skipped the same way the
    /// [`FrameAssembler`] skips them.
    ///
    /// # Examples
    ///
    /// ```
    /// use huskyframe::{frame::Frame, protocol::Command};
    ///
    /// let frame = Frame::parse(&[0x00, 0x55, 0xAA, 0x11, 0x00, 0x2E, 0x3E]).expect("valid frame");
    /// assert_eq!(frame.command(), Command::RETURN_OK);
    /// assert!(frame.content().is_empty());
    /// ```
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let mut assembler = FrameAssembler::new();
        bytes
            .iter()
            .find(|byte| assembler.feed(**byte))
            .and_then(|_| assembler.frame())
    }

    /// Full frame bytes, header through checksum.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] { &self.bytes }

    /// Full frame bytes as owned [`Bytes`].
    #[must_use]
    pub fn to_bytes(&self) -> Bytes { self.bytes.clone() }

    /// Total frame length in bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.bytes.len() }

    /// Frames always carry at least their fixed overhead.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

    /// Address byte.
    #[must_use]
    pub fn address(&self) -> u8 { self.bytes[ADDRESS_INDEX] }

    /// Command byte.
    #[must_use]
    pub fn command(&self) -> Command { Command(self.bytes[COMMAND_INDEX]) }

    /// Content bytes between the command and the checksum.
    #[must_use]
    pub fn content(&self) -> &[u8] { &self.bytes[CONTENT_INDEX..self.content_end()] }

    /// Trailing checksum byte.
    #[must_use]
    pub fn checksum(&self) -> u8 { self.bytes[self.content_end()] }

    /// Offset one past the last content byte (the checksum position).
    pub(crate) fn content_end(&self) -> usize {
        CONTENT_INDEX + usize::from(self.bytes[LENGTH_INDEX])
    }
}

impl fmt::Debug for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Frame")
            .field("command", &self.command())
            .field("content", &self.content())
            .finish_non_exhaustive()
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] { self.as_bytes() }
}
