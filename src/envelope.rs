//! Outer envelope spoken with the transport bridge.
//!
//! The sensor hangs off a micro:bit that relays bytes over BLE. Writes to
//! the bridge are prefixed with a marker and the payload length; reads are
//! requested with a fixed three-byte trigger, and each read notification
//! starts with one bridge byte that is not part of the sensor stream.

use bytes::{BufMut, Bytes, BytesMut};

use crate::frame::Frame;

/// Marker opening every write to the bridge.
pub const BRIDGE_MARKER: u8 = 0x32;

/// Number of sensor bytes requested by one read trigger.
pub const READ_CHUNK_LEN: u8 = 16;

/// Write asking the bridge to fetch up to [`READ_CHUNK_LEN`] bytes.
pub const READ_TRIGGER: [u8; 3] = [BRIDGE_MARKER, 0x00, READ_CHUNK_LEN];

/// Bridge bytes preceding the sensor data in a read notification.
pub const NOTIFICATION_PREFIX_LEN: usize = 1;

/// Wrap an outgoing frame for the bridge: `[0x32][len][frame]`.
///
/// # Examples
///
/// ```
/// use huskyframe::{envelope::wrap_frame, frame::command_frame, protocol::Command};
///
/// let knock = command_frame(Command::KNOCK).expect("fits");
/// assert_eq!(&wrap_frame(&knock)[..], [0x32, 0x06, 0x55, 0xAA, 0x11, 0x00, 0x2C, 0x3C]);
/// ```
#[must_use]
pub fn wrap_frame(frame: &Frame) -> Bytes {
    let bytes = frame.as_bytes();
    let mut out = BytesMut::with_capacity(bytes.len() + 2);
    out.put_u8(BRIDGE_MARKER);
    // Frames never reach 128 bytes.
    out.put_u8(u8::try_from(bytes.len()).unwrap_or(u8::MAX));
    out.put_slice(bytes);
    out.freeze()
}

/// Read trigger as owned bytes.
#[must_use]
pub fn read_trigger() -> Bytes { Bytes::from_static(&READ_TRIGGER) }

/// Sensor bytes carried by a read notification.
///
/// Notifications shorter than the prefix carry no data.
#[must_use]
pub fn notification_payload(chunk: &Bytes) -> Bytes {
    if chunk.len() <= NOTIFICATION_PREFIX_LEN {
        return Bytes::new();
    }
    chunk.slice(NOTIFICATION_PREFIX_LEN..)
}

/// Split a bridge write back into its payload, if it is a frame write.
///
/// Returns `None` for read triggers and malformed writes.
#[must_use]
pub fn unwrap_write(write: &[u8]) -> Option<&[u8]> {
    match write {
        [BRIDGE_MARKER, len, payload @ ..] if *len != 0 && usize::from(*len) == payload.len() => {
            Some(payload)
        }
        _ => None,
    }
}

/// Whether a bridge write is a read trigger.
#[must_use]
pub fn is_read_trigger(write: &[u8]) -> bool { write == READ_TRIGGER }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{frame::u16_argument_frame, protocol::Command};

    #[test]
    fn wrapped_frame_unwraps_to_frame_bytes() {
        let frame = u16_argument_frame(Command::SELECT_ALGORITHM, 2).expect("fits");
        let wrapped = wrap_frame(&frame);
        assert_eq!(unwrap_write(&wrapped), Some(frame.as_bytes()));
        assert!(!is_read_trigger(&wrapped));
    }

    #[test]
    fn read_trigger_is_not_a_frame_write() {
        assert!(is_read_trigger(&read_trigger()));
        assert_eq!(unwrap_write(&READ_TRIGGER), None);
    }

    #[test]
    fn notification_prefix_is_stripped() {
        let chunk = Bytes::from_static(&[0x10, 0x55, 0xAA]);
        assert_eq!(&notification_payload(&chunk)[..], [0x55, 0xAA]);
        assert!(notification_payload(&Bytes::from_static(&[0x10])).is_empty());
    }
}
