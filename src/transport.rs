//! Byte transport between the host and the sensor bridge.
//!
//! The session never touches a radio directly. It writes enveloped frames and
//! read triggers through [`Transport::write`] and pulls read notifications
//! with [`Transport::next_chunk`]. The notification callback of a real BLE
//! stack feeds a [`TransportHandle`], whose paired [`ChannelTransport`] is
//! what the session owns.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;

mod channel;

pub use channel::{ChannelTransport, TransportHandle};

/// Connection to the sensor bridge.
///
/// Implementations must be cancellation-safe: dropping a pending
/// `next_chunk()` future must not lose a chunk that was already delivered.
#[async_trait]
pub trait Transport: Send {
    /// Whether the link is currently up. Checked before every operation.
    fn is_connected(&self) -> bool;

    /// Send bytes to the bridge.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the bytes could not be handed to the link.
    async fn write(&mut self, data: Bytes) -> io::Result<()>;

    /// Wait for the next read notification, including its bridge prefix.
    ///
    /// Returns `None` once the delivering side has gone away.
    async fn next_chunk(&mut self) -> Option<Bytes>;
}
