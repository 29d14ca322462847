//! Decoding validated frames into typed records.
//!
//! Summary, box and arrow replies share one layout: five little-endian
//! `u16` fields. Detail frames are matched against the box command first,
//! then the arrow command.

use crate::{
    error::DecodeError,
    frame::Frame,
    protocol::Command,
    record::{ArrowRecord, BoxRecord, DetailRecord, SummaryRecord},
};

/// Number of `u16` fields carried by every reply record.
pub const RECORD_FIELDS: usize = 5;

/// Read the five fields of a frame carrying `command`.
///
/// # Errors
///
/// Returns [`DecodeError::CommandMismatch`] if the frame carries another
/// command, or [`DecodeError::Truncated`] if its content is shorter than five
/// fields.
pub fn read_five_fields(frame: &Frame, command: Command) -> Result<[u16; RECORD_FIELDS], DecodeError> {
    let mut reader = frame.read_begin(command)?;
    let fields = reader.read_u16_array::<RECORD_FIELDS>();
    reader.finish()?;
    Ok(fields)
}

/// Decode a `RETURN_INFO` summary.
///
/// # Errors
///
/// See [`read_five_fields`].
///
/// # Examples
///
/// ```
/// use huskyframe::{decode::decode_summary, frame::FrameEncoder, protocol::Command};
///
/// let frame = FrameEncoder::new()
///     .begin(Command::RETURN_INFO)
///     .write_u16(2)
///     .write_u16(1)
///     .write_u16(0)
///     .write_u16(0)
///     .write_u16(0)
///     .finish()
///     .expect("fits");
/// let summary = decode_summary(&frame).expect("summary");
/// assert_eq!(summary.count, 2);
/// assert_eq!(summary.learned_ids, 1);
/// ```
pub fn decode_summary(frame: &Frame) -> Result<SummaryRecord, DecodeError> {
    read_five_fields(frame, Command::RETURN_INFO).map(SummaryRecord::from_fields)
}

/// Decode a `RETURN_BLOCK` record.
///
/// # Errors
///
/// See [`read_five_fields`].
pub fn decode_box(frame: &Frame) -> Result<BoxRecord, DecodeError> {
    read_five_fields(frame, Command::RETURN_BLOCK).map(BoxRecord::from_fields)
}

/// Decode a `RETURN_ARROW` record.
///
/// # Errors
///
/// See [`read_five_fields`].
pub fn decode_arrow(frame: &Frame) -> Result<ArrowRecord, DecodeError> {
    read_five_fields(frame, Command::RETURN_ARROW).map(ArrowRecord::from_fields)
}

/// Decode a detail frame as a box, falling back to an arrow.
///
/// # Errors
///
/// Returns [`DecodeError::UnexpectedRecord`] if the frame is neither, or
/// [`DecodeError::Truncated`] if a matching frame is too short.
pub fn decode_detail(frame: &Frame) -> Result<DetailRecord, DecodeError> {
    match frame.command() {
        Command::RETURN_BLOCK => decode_box(frame).map(DetailRecord::Box),
        Command::RETURN_ARROW => decode_arrow(frame).map(DetailRecord::Arrow),
        command => Err(DecodeError::UnexpectedRecord { command }),
    }
}
