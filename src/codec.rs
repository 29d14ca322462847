//! `tokio_util` codec adapter for raw byte streams.
//!
//! Hosts that reach the sensor through a plain byte stream (a UART bridge,
//! a pipe, a recorded capture) can wrap it in
//! [`FramedRead`](tokio_util::codec::FramedRead) or
//! [`Framed`](tokio_util::codec::Framed) with [`HuskyCodec`] instead of
//! driving a [`FrameAssembler`] by hand. Noise and corrupt frames are skipped
//! exactly as the assembler skips them; the decoder never errors.

use std::io;

use bytes::{Buf, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

use crate::frame::{Frame, FrameAssembler};

/// Frame codec for the sensor wire format.
#[derive(Clone, Debug, Default)]
pub struct HuskyCodec {
    assembler: FrameAssembler,
}

impl HuskyCodec {
    /// Create a codec hunting for the first header.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Assembler state, for diagnostics.
    #[must_use]
    pub fn assembler(&self) -> &FrameAssembler { &self.assembler }
}

impl Decoder for HuskyCodec {
    type Item = Frame;
    type Error = io::Error;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let (consumed, frame) = self.assembler.feed_until_frame(src);
        src.advance(consumed);
        Ok(frame)
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let frame = self.decode(src)?;
        if frame.is_none() && self.assembler.state() != crate::frame::AssemblerState::AwaitHeader0 {
            tracing::debug!(
                state = ?self.assembler.state(),
                "stream ended inside a frame, discarding partial frame"
            );
            self.assembler.reset();
        }
        Ok(frame)
    }
}

impl Encoder<Frame> for HuskyCodec {
    type Error = io::Error;

    fn encode(&mut self, item: Frame, dst: &mut BytesMut) -> Result<(), Self::Error> {
        dst.extend_from_slice(item.as_bytes());
        Ok(())
    }
}
