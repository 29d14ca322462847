//! Wire constants for the HuskyLens frame format.
//!
//! Every frame on the link has the same layout:
//!
//! ```text
//! ┌──────┬──────┬─────────┬────────┬─────────┬──────────────┬──────────┐
//! │ 0x55 │ 0xAA │ address │ length │ command │ content (N)  │ checksum │
//! └──────┴──────┴─────────┴────────┴─────────┴──────────────┴──────────┘
//! ```
//!
//! `length` counts only the content bytes. The checksum is the sum of every
//! preceding byte, modulo 256. Multi-byte integers in the content are
//! unsigned 16-bit little-endian.

use std::fmt;

use serde::{Deserialize, Serialize};

/// First header byte.
pub const HEADER_0: u8 = 0x55;
/// Second header byte.
pub const HEADER_1: u8 = 0xAA;
/// Fixed device address written into outgoing frames.
pub const ADDRESS: u8 = 0x11;

/// Size of the receive and send buffers; no frame may reach this length.
pub const MAX_FRAME_SIZE: usize = 128;

/// Position of the address byte.
pub const ADDRESS_INDEX: usize = 2;
/// Position of the content-length byte.
pub const LENGTH_INDEX: usize = 3;
/// Position of the command byte.
pub const COMMAND_INDEX: usize = 4;
/// Position of the first content byte.
pub const CONTENT_INDEX: usize = 5;
/// Bytes a frame carries besides its content (header, address, length,
/// command and checksum).
pub const PROTOCOL_OVERHEAD: usize = 6;

/// Largest content-length byte the assembler accepts.
pub const MAX_CONTENT_LENGTH: usize = MAX_FRAME_SIZE - PROTOCOL_OVERHEAD - 1;

/// Sum `bytes` modulo 256.
///
/// # Examples
///
/// ```
/// use huskyframe::protocol::checksum;
///
/// assert_eq!(checksum(&[0x55, 0xAA, 0x11, 0x00, 0x2C]), 0x3C);
/// ```
#[must_use]
pub fn checksum(bytes: &[u8]) -> u8 { bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b)) }

/// Command byte carried at [`COMMAND_INDEX`].
///
/// A newtype rather than an enum: the device reuses some bytes for more than
/// one purpose (`0x2F` both learns and names an id, `0x30` both forgets and
/// takes a photo), and frames with unknown commands must still be
/// representable so they can be skipped.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command(pub u8);

impl Command {
    /// Request every block and arrow on screen.
    pub const REQUEST: Self = Self(0x20);
    /// Request blocks only.
    pub const REQUEST_BLOCKS: Self = Self(0x21);
    /// Request arrows only.
    pub const REQUEST_ARROWS: Self = Self(0x22);
    /// Request learned objects only.
    pub const REQUEST_LEARNED: Self = Self(0x23);
    /// Request learned blocks only.
    pub const REQUEST_BLOCKS_LEARNED: Self = Self(0x24);
    /// Request learned arrows only.
    pub const REQUEST_ARROWS_LEARNED: Self = Self(0x25);
    /// Request objects with a given id.
    pub const REQUEST_BY_ID: Self = Self(0x26);
    /// Request blocks with a given id.
    pub const REQUEST_BLOCKS_BY_ID: Self = Self(0x27);
    /// Request arrows with a given id.
    pub const REQUEST_ARROWS_BY_ID: Self = Self(0x28);
    /// Summary reply opening every request cycle.
    pub const RETURN_INFO: Self = Self(0x29);
    /// Box record reply.
    pub const RETURN_BLOCK: Self = Self(0x2A);
    /// Arrow record reply.
    pub const RETURN_ARROW: Self = Self(0x2B);
    /// Liveness probe.
    pub const KNOCK: Self = Self(0x2C);
    /// Switch the active algorithm.
    pub const SELECT_ALGORITHM: Self = Self(0x2D);
    /// Acknowledgement reply.
    pub const RETURN_OK: Self = Self(0x2E);
    /// Learn the current object under an id.
    pub const LEARN: Self = Self(0x2F);
    /// Assign a custom name to an id. Shares its byte with [`Self::LEARN`].
    pub const SET_NAME: Self = Self(0x2F);
    /// Forget all learned objects.
    pub const FORGET: Self = Self(0x30);
    /// Save a photo to the SD card. Shares its byte with [`Self::FORGET`].
    pub const PHOTO: Self = Self(0x30);
    /// Sensor query (unused by the device firmware we target).
    pub const REQUEST_SENSOR: Self = Self(0x31);
    /// Save the current model to an SD-card slot.
    pub const SAVE_MODEL: Self = Self(0x32);
    /// Load a model from an SD-card slot.
    pub const LOAD_MODEL: Self = Self(0x33);
    /// Draw text on the device screen.
    pub const SET_OSD_TEXT: Self = Self(0x34);
    /// Clear text drawn with [`Self::SET_OSD_TEXT`].
    pub const CLEAR_OSD: Self = Self(0x35);
    /// Learn an id without confirmation.
    pub const LEARN_ID: Self = Self(0x36);
    /// Forget the learned data of the current algorithm.
    pub const FORGET_DATA: Self = Self(0x37);
    /// Save a screenshot to the SD card.
    pub const SCREENSHOT: Self = Self(0x39);

    /// Raw command byte.
    #[must_use]
    pub const fn byte(self) -> u8 { self.0 }

    fn name(self) -> Option<&'static str> {
        let name = match self.0 {
            0x20 => "REQUEST",
            0x21 => "REQUEST_BLOCKS",
            0x22 => "REQUEST_ARROWS",
            0x23 => "REQUEST_LEARNED",
            0x24 => "REQUEST_BLOCKS_LEARNED",
            0x25 => "REQUEST_ARROWS_LEARNED",
            0x26 => "REQUEST_BY_ID",
            0x27 => "REQUEST_BLOCKS_BY_ID",
            0x28 => "REQUEST_ARROWS_BY_ID",
            0x29 => "RETURN_INFO",
            0x2A => "RETURN_BLOCK",
            0x2B => "RETURN_ARROW",
            0x2C => "KNOCK",
            0x2D => "SELECT_ALGORITHM",
            0x2E => "RETURN_OK",
            0x2F => "LEARN",
            0x30 => "FORGET",
            0x31 => "REQUEST_SENSOR",
            0x32 => "SAVE_MODEL",
            0x33 => "LOAD_MODEL",
            0x34 => "SET_OSD_TEXT",
            0x35 => "CLEAR_OSD",
            0x36 => "LEARN_ID",
            0x37 => "FORGET_DATA",
            0x39 => "SCREENSHOT",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{name}({:#04x})", self.0),
            None => write!(f, "Command({:#04x})", self.0),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { fmt::Debug::fmt(self, f) }
}

impl From<u8> for Command {
    fn from(value: u8) -> Self { Self(value) }
}

impl From<Command> for u8 {
    fn from(value: Command) -> Self { value.0 }
}

/// Detection algorithm running on the sensor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum Algorithm {
    /// Face recognition.
    FaceRecognition = 0,
    /// Object tracking.
    ObjectTracking = 1,
    /// Object recognition.
    ObjectRecognition = 2,
    /// Line tracking (produces arrows).
    LineTracking = 3,
    /// Colour recognition.
    ColorRecognition = 4,
    /// `AprilTag` recognition.
    TagRecognition = 5,
    /// Object classification.
    ObjectClassification = 6,
    /// QR code recognition.
    QrRecognition = 7,
    /// Barcode recognition.
    BarcodeRecognition = 8,
}

impl Algorithm {
    /// Every algorithm in wire order.
    pub const ALL: [Self; 9] = [
        Self::FaceRecognition,
        Self::ObjectTracking,
        Self::ObjectRecognition,
        Self::LineTracking,
        Self::ColorRecognition,
        Self::TagRecognition,
        Self::ObjectClassification,
        Self::QrRecognition,
        Self::BarcodeRecognition,
    ];

    /// Value written as the select-algorithm argument.
    #[must_use]
    pub const fn wire_value(self) -> u16 { self as u16 }
}

impl TryFrom<u16> for Algorithm {
    type Error = u16;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.wire_value() == value)
            .ok_or(value)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[test]
    fn knock_frame_checksum_matches_device_capture() {
        // 55 AA 11 00 2C 3C is what the sensor expects for a knock.
        assert_eq!(checksum(&[HEADER_0, HEADER_1, ADDRESS, 0x00, 0x2C]), 0x3C);
    }

    #[test]
    fn checksum_wraps_modulo_256() {
        assert_eq!(checksum(&[0xFF, 0x02]), 0x01);
        assert_eq!(checksum(&[]), 0);
    }

    #[test]
    fn aliased_commands_share_bytes() {
        assert_eq!(Command::LEARN, Command::SET_NAME);
        assert_eq!(Command::FORGET, Command::PHOTO);
    }

    #[rstest]
    #[case(Command::RETURN_INFO, "RETURN_INFO(0x29)")]
    #[case(Command(0x7F), "Command(0x7f)")]
    fn command_debug_names_known_bytes(#[case] command: Command, #[case] expected: &str) {
        assert_eq!(format!("{command:?}"), expected);
    }

    #[rstest]
    #[case(0, Ok(Algorithm::FaceRecognition))]
    #[case(3, Ok(Algorithm::LineTracking))]
    #[case(8, Ok(Algorithm::BarcodeRecognition))]
    #[case(9, Err(9))]
    fn algorithm_from_wire_value(#[case] raw: u16, #[case] expected: Result<Algorithm, u16>) {
        assert_eq!(Algorithm::try_from(raw), expected);
    }

    #[test]
    fn max_content_length_leaves_room_for_overhead() {
        assert_eq!(MAX_CONTENT_LENGTH, 121);
        assert!(MAX_CONTENT_LENGTH + PROTOCOL_OVERHEAD < MAX_FRAME_SIZE);
    }
}
