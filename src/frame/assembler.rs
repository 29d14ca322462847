//! Byte-at-a-time frame synchronisation.
//!
//! [`FrameAssembler`] is fed the raw notification stream one byte at a time.
//! It hunts for the `0x55 0xAA` header, collects the length-prefixed content
//! and verifies the checksum. Malformed input never surfaces as an error:
//! the assembler drops what it has and starts hunting for the next header.

use bytes::Bytes;

use super::Frame;
use crate::{
    error::FrameRejection,
    metrics,
    protocol::{
        ADDRESS_INDEX,
        CONTENT_INDEX,
        HEADER_0,
        HEADER_1,
        LENGTH_INDEX,
        MAX_CONTENT_LENGTH,
        MAX_FRAME_SIZE,
        checksum,
    },
};

/// Position of the assembler within a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssemblerState {
    /// Hunting for `0x55`.
    AwaitHeader0,
    /// Expecting `0xAA`.
    AwaitHeader1,
    /// Expecting the address byte.
    AwaitAddress,
    /// Expecting the content-length byte.
    AwaitLength,
    /// Collecting the command, content and checksum bytes.
    AccumulateContent {
        /// Bytes still missing, checksum included.
        remaining: usize,
    },
}

/// Incremental frame parser over a single delivery stream.
///
/// # Examples
///
/// ```
/// use huskyframe::frame::{FrameAssembler, command_frame};
/// use huskyframe::protocol::Command;
///
/// let knock = command_frame(Command::KNOCK).expect("knock fits");
/// let mut assembler = FrameAssembler::new();
/// let ready: Vec<bool> = knock.as_bytes().iter().map(|b| assembler.feed(*b)).collect();
/// assert_eq!(ready, [false, false, false, false, false, true]);
/// assert_eq!(assembler.frame(), Some(knock));
/// ```
#[derive(Clone, Debug)]
pub struct FrameAssembler {
    buffer: [u8; MAX_FRAME_SIZE],
    index: usize,
    state: AssemblerState,
    ready: bool,
    last_rejection: Option<FrameRejection>,
}

impl Default for FrameAssembler {
    fn default() -> Self { Self::new() }
}

impl FrameAssembler {
    /// Create an assembler hunting for a header.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: [0; MAX_FRAME_SIZE],
            index: 0,
            state: AssemblerState::AwaitHeader0,
            ready: false,
            last_rejection: None,
        }
    }

    /// Current position within the frame being collected.
    #[must_use]
    pub const fn state(&self) -> AssemblerState { self.state }

    /// Reason the most recent partial frame was discarded, if any.
    #[must_use]
    pub const fn last_rejection(&self) -> Option<FrameRejection> { self.last_rejection }

    /// Consume one byte, returning `true` when it completes a valid frame.
    ///
    /// The completed frame stays readable through [`frame`](Self::frame)
    /// until the next call.
    pub fn feed(&mut self, byte: u8) -> bool {
        self.ready = false;
        match self.state {
            AssemblerState::AwaitHeader0 => {
                if byte == HEADER_0 {
                    self.store(byte, AssemblerState::AwaitHeader1);
                }
            }
            AssemblerState::AwaitHeader1 => {
                if byte == HEADER_1 {
                    self.store(byte, AssemblerState::AwaitAddress);
                } else {
                    self.reject(FrameRejection::BadHeader { byte });
                    // The offending byte may itself open the next frame.
                    if byte == HEADER_0 {
                        self.store(byte, AssemblerState::AwaitHeader1);
                    }
                }
            }
            AssemblerState::AwaitAddress => {
                debug_assert_eq!(self.index, ADDRESS_INDEX);
                self.store(byte, AssemblerState::AwaitLength);
            }
            AssemblerState::AwaitLength => {
                debug_assert_eq!(self.index, LENGTH_INDEX);
                let length = usize::from(byte);
                if length > MAX_CONTENT_LENGTH {
                    self.reject(FrameRejection::OversizedLength {
                        length,
                        max: MAX_CONTENT_LENGTH,
                    });
                } else {
                    // Command byte, content and checksum follow.
                    self.store(byte, AssemblerState::AccumulateContent {
                        remaining: length + 2,
                    });
                }
            }
            AssemblerState::AccumulateContent { remaining } => {
                self.buffer[self.index] = byte;
                self.index += 1;
                if remaining > 1 {
                    self.state = AssemblerState::AccumulateContent {
                        remaining: remaining - 1,
                    };
                } else {
                    self.ready = self.verify();
                }
            }
        }
        self.ready
    }

    /// Feed bytes until one completes a frame.
    ///
    /// Returns the number of bytes consumed and the completed frame, if any.
    /// Bytes after the frame are left for the caller to feed later.
    pub fn feed_until_frame(&mut self, bytes: &[u8]) -> (usize, Option<Frame>) {
        for (position, byte) in bytes.iter().enumerate() {
            if self.feed(*byte) {
                return (position + 1, self.frame());
            }
        }
        (bytes.len(), None)
    }

    /// The frame completed by the last [`feed`](Self::feed) call.
    #[must_use]
    pub fn frame(&self) -> Option<Frame> {
        self.ready.then(|| {
            let end = CONTENT_INDEX + usize::from(self.buffer[LENGTH_INDEX]) + 1;
            Frame::from_validated(Bytes::copy_from_slice(&self.buffer[..end]))
        })
    }

    /// Drop any partial frame and hunt for a header again.
    pub fn reset(&mut self) {
        self.index = 0;
        self.state = AssemblerState::AwaitHeader0;
        self.ready = false;
    }

    fn store(&mut self, byte: u8, next: AssemblerState) {
        self.buffer[self.index] = byte;
        self.index += 1;
        self.state = next;
    }

    fn verify(&mut self) -> bool {
        let checksum_index = self.index - 1;
        let expected = checksum(&self.buffer[..checksum_index]);
        let actual = self.buffer[checksum_index];
        if expected == actual {
            metrics::inc_frames(metrics::Direction::Inbound);
            self.index = 0;
            self.state = AssemblerState::AwaitHeader0;
            true
        } else {
            self.reject(FrameRejection::ChecksumMismatch { expected, actual });
            false
        }
    }

    fn reject(&mut self, rejection: FrameRejection) {
        match rejection {
            FrameRejection::ChecksumMismatch { expected, actual } => {
                tracing::warn!(expected, actual, "checksum mismatch, dropping frame");
            }
            FrameRejection::BadHeader { .. } | FrameRejection::OversizedLength { .. } => {
                tracing::debug!(%rejection, "resynchronising frame assembler");
            }
        }
        metrics::inc_rejected(&rejection);
        self.last_rejection = Some(rejection);
        self.reset();
    }
}
