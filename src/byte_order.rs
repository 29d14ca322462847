//! Helpers for the sensor's little-endian wire integers.
//!
//! Every multi-byte field on the link is an unsigned 16-bit value with the
//! low byte first. Keeping the conversions here leaves the encoder and reader
//! explicit about wire endianness.

/// Serialise a `u16` in wire byte order (little-endian).
///
/// # Examples
///
/// ```
/// use huskyframe::byte_order::write_wire_u16;
///
/// assert_eq!(write_wire_u16(0x1234), [0x34, 0x12]);
/// ```
#[must_use]
pub fn write_wire_u16(value: u16) -> [u8; 2] { value.to_le_bytes() }

/// Parse a wire-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use huskyframe::byte_order::read_wire_u16;
///
/// assert_eq!(read_wire_u16([0x34, 0x12]), 0x1234);
/// ```
#[must_use]
pub fn read_wire_u16(bytes: [u8; 2]) -> u16 { u16::from_le_bytes(bytes) }
