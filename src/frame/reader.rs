//! Cursor over the content of a validated frame.

use super::Frame;
use crate::{
    byte_order::read_wire_u16,
    error::DecodeError,
    protocol::{CONTENT_INDEX, Command},
};

/// Sequential reader over a frame's content block.
///
/// Reads past the end of the content return `0` and latch a failure flag,
/// so a fixed sequence of reads can be written without checking each one;
/// [`read_end`](Self::read_end) or [`finish`](Self::finish) report the
/// outcome.
#[derive(Debug)]
pub struct FrameReader<'a> {
    frame: &'a Frame,
    cursor: usize,
    end: usize,
    failed: bool,
}

impl Frame {
    /// Start reading this frame's content if it carries `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::CommandMismatch`] when the frame carries a
    /// different command.
    ///
    /// # Examples
    ///
    /// ```
    /// use huskyframe::{frame::u16_argument_frame, protocol::Command};
    ///
    /// let frame = u16_argument_frame(Command::LEARN_ID, 7).expect("fits");
    /// let mut reader = frame.read_begin(Command::LEARN_ID).expect("command matches");
    /// assert_eq!(reader.read_u16(), 7);
    /// assert!(reader.read_end());
    /// assert!(frame.read_begin(Command::RETURN_OK).is_err());
    /// ```
    pub fn read_begin(&self, expected: Command) -> Result<FrameReader<'_>, DecodeError> {
        let actual = self.command();
        if actual != expected {
            return Err(DecodeError::CommandMismatch { expected, actual });
        }
        Ok(FrameReader {
            frame: self,
            cursor: CONTENT_INDEX,
            end: self.content_end(),
            failed: false,
        })
    }
}

impl FrameReader<'_> {
    /// Read the next little-endian `u16`, or `0` if the content is exhausted.
    pub fn read_u16(&mut self) -> u16 {
        if self.failed || self.cursor + 2 > self.end {
            self.failed = true;
            return 0;
        }
        let bytes = self.frame.as_bytes();
        let value = read_wire_u16([bytes[self.cursor], bytes[self.cursor + 1]]);
        self.cursor += 2;
        value
    }

    /// Read `N` consecutive `u16` fields.
    pub fn read_u16_array<const N: usize>(&mut self) -> [u16; N] {
        let mut fields = [0; N];
        for field in &mut fields {
            *field = self.read_u16();
        }
        fields
    }

    /// Bytes of content not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize { self.end.saturating_sub(self.cursor) }

    /// Report whether every read succeeded and the content was consumed
    /// exactly.
    ///
    /// A latched read failure is cleared by this call.
    pub fn read_end(&mut self) -> bool {
        if self.failed {
            self.failed = false;
            return false;
        }
        self.cursor == self.end
    }

    /// Finish reading, failing only if a read ran past the content.
    ///
    /// Trailing content is tolerated and logged.
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::Truncated`] if any read overran the content.
    pub fn finish(self) -> Result<(), DecodeError> {
        if self.failed {
            return Err(DecodeError::Truncated {
                cursor: self.cursor,
                end: self.end,
            });
        }
        if self.cursor < self.end {
            tracing::debug!(
                command = %self.frame.command(),
                trailing = self.end - self.cursor,
                "ignoring trailing frame content"
            );
        }
        Ok(())
    }
}
