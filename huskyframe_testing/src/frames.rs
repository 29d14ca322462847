//! Builders for the frames a sensor sends back.

use bytes::{BufMut, Bytes, BytesMut};
use huskyframe::{
    frame::{Frame, FrameEncoder, command_frame},
    protocol::Command,
    record::{ArrowRecord, BoxRecord, DetailRecord, SummaryRecord},
};

/// Frame carrying five `u16` fields under `command`.
///
/// # Panics
///
/// Never in practice: five fields always fit.
#[must_use]
pub fn five_field_frame(command: Command, fields: [u16; 5]) -> Frame {
    let mut encoder = FrameEncoder::new();
    encoder.begin(command);
    for field in fields {
        encoder.write_u16(field);
    }
    encoder.finish().expect("five fields fit a frame")
}

/// `RETURN_OK` acknowledgement.
///
/// # Panics
///
/// Never in practice.
#[must_use]
pub fn ok_frame() -> Frame { command_frame(Command::RETURN_OK).expect("empty frame fits") }

/// `RETURN_INFO` summary.
#[must_use]
pub fn summary_frame(summary: &SummaryRecord) -> Frame {
    five_field_frame(Command::RETURN_INFO, summary.fields())
}

/// `RETURN_BLOCK` record.
#[must_use]
pub fn box_frame(record: &BoxRecord) -> Frame { five_field_frame(Command::RETURN_BLOCK, record.fields()) }

/// `RETURN_ARROW` record.
#[must_use]
pub fn arrow_frame(record: &ArrowRecord) -> Frame {
    five_field_frame(Command::RETURN_ARROW, record.fields())
}

/// Box or arrow frame for a detail record.
#[must_use]
pub fn detail_frame(record: &DetailRecord) -> Frame {
    match record {
        DetailRecord::Box(record) => box_frame(record),
        DetailRecord::Arrow(record) => arrow_frame(record),
    }
}

/// Frame bytes with the checksum byte flipped.
#[must_use]
pub fn corrupt(frame: &Frame) -> Bytes {
    let mut bytes = BytesMut::from(frame.as_bytes());
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    bytes.freeze()
}

/// Read notification carrying `payload` behind the bridge prefix byte.
#[must_use]
pub fn notification(payload: &[u8]) -> Bytes {
    let mut chunk = BytesMut::with_capacity(payload.len() + 1);
    chunk.put_u8(0x00);
    chunk.put_slice(payload);
    chunk.freeze()
}
