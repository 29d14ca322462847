//! In-memory transport backed by tokio channels.

use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use super::Transport;

/// Session-side end of a channel transport.
#[derive(Debug)]
pub struct ChannelTransport {
    connected: Arc<AtomicBool>,
    inbound: mpsc::UnboundedReceiver<Bytes>,
    outbound: mpsc::UnboundedSender<Bytes>,
}

/// Link-side end of a channel transport.
///
/// The owner of the radio (or a test) delivers read notifications here,
/// drains the writes the session produced, and reports link state.
#[derive(Debug)]
pub struct TransportHandle {
    connected: Arc<AtomicBool>,
    inbound: mpsc::UnboundedSender<Bytes>,
    outbound: mpsc::UnboundedReceiver<Bytes>,
}

impl ChannelTransport {
    /// Create a connected transport and its link-side handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use bytes::Bytes;
    /// use huskyframe::transport::{ChannelTransport, Transport};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() {
    /// let (mut transport, mut handle) = ChannelTransport::new();
    /// transport.write(Bytes::from_static(&[0x32, 0x00, 0x10])).await.expect("link up");
    /// assert_eq!(handle.try_next_write().as_deref(), Some(&[0x32, 0x00, 0x10][..]));
    ///
    /// handle.deliver(Bytes::from_static(&[0x10, 0x55]));
    /// assert_eq!(transport.next_chunk().await.as_deref(), Some(&[0x10, 0x55][..]));
    /// # }
    /// ```
    #[must_use]
    pub fn new() -> (Self, TransportHandle) {
        let connected = Arc::new(AtomicBool::new(true));
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
        let (outbound_tx, outbound_rx) = mpsc::unbounded_channel();
        (
            Self {
                connected: Arc::clone(&connected),
                inbound: inbound_rx,
                outbound: outbound_tx,
            },
            TransportHandle {
                connected,
                inbound: inbound_tx,
                outbound: outbound_rx,
            },
        )
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    fn is_connected(&self) -> bool { self.connected.load(Ordering::Acquire) }

    async fn write(&mut self, data: Bytes) -> io::Result<()> {
        if !self.is_connected() {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        self.outbound
            .send(data)
            .map_err(|_| io::Error::from(io::ErrorKind::BrokenPipe))
    }

    async fn next_chunk(&mut self) -> Option<Bytes> { self.inbound.recv().await }
}

impl TransportHandle {
    /// Deliver one read notification, prefix included.
    ///
    /// Returns `false` if the session end has been dropped.
    pub fn deliver(&self, chunk: Bytes) -> bool { self.inbound.send(chunk).is_ok() }

    /// Wait for the next write made by the session.
    pub async fn next_write(&mut self) -> Option<Bytes> { self.outbound.recv().await }

    /// Take a pending write without waiting.
    pub fn try_next_write(&mut self) -> Option<Bytes> { self.outbound.try_recv().ok() }

    /// Report the link as up or down.
    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }

    /// Whether the link is currently reported as up.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.connected.load(Ordering::Acquire) }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    #[tokio::test]
    async fn writes_reach_the_handle_in_order() {
        let (mut transport, mut handle) = ChannelTransport::new();
        transport.write(Bytes::from_static(b"a")).await.expect("write");
        transport.write(Bytes::from_static(b"b")).await.expect("write");
        assert_eq!(handle.next_write().await, Some(Bytes::from_static(b"a")));
        assert_eq!(handle.try_next_write(), Some(Bytes::from_static(b"b")));
        assert_eq!(handle.try_next_write(), None);
    }

    #[tokio::test]
    async fn disconnected_transport_refuses_writes() {
        let (mut transport, mut handle) = ChannelTransport::new();
        handle.set_connected(false);
        assert!(!transport.is_connected());
        let err = transport
            .write(Bytes::from_static(b"a"))
            .await
            .expect_err("link is down");
        assert_eq!(err.kind(), io::ErrorKind::NotConnected);
        assert_eq!(handle.try_next_write(), None);
    }

    #[tokio::test]
    async fn dropped_handle_ends_chunk_stream() {
        let (mut transport, handle) = ChannelTransport::new();
        assert!(handle.deliver(Bytes::from_static(b"x")));
        drop(handle);
        assert_eq!(transport.next_chunk().await, Some(Bytes::from_static(b"x")));
        assert_eq!(transport.next_chunk().await, None);
    }
}
