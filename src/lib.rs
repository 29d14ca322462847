#![doc(html_root_url = "https://docs.rs/huskyframe/latest")]
//! Public API for the `huskyframe` library.
//!
//! This crate speaks the binary frame protocol of the HuskyLens AI-vision
//! sensor over a notification-based link: frame synchronisation and
//! checksum validation, command encoding, typed record decoding, a result
//! store with the sensor's query operations, and a request orchestrator that
//! bounds every wait.

pub mod byte_order;
pub mod codec;
pub mod compat;
pub mod config;
pub mod decode;
pub mod envelope;
pub mod error;
pub mod frame;
pub mod metrics;
pub mod protocol;
pub mod record;
pub mod session;
pub mod store;
pub mod transport;

pub use codec::HuskyCodec;
pub use compat::LegacyLens;
pub use config::SessionConfig;
pub use error::{DecodeError, EncodeError, FrameRejection, RequestError, Result};
pub use frame::{Frame, FrameAssembler, FrameEncoder};
pub use metrics::{Direction, FRAMES_REJECTED, FRAMES_TOTAL, TIMEOUTS_TOTAL};
pub use protocol::{Algorithm, Command};
pub use record::{
    ArrowField,
    ArrowRecord,
    BoxField,
    BoxRecord,
    DetailRecord,
    RecordKind,
    SummaryRecord,
};
pub use session::{Capture, RequestKind, Session};
pub use store::ResultStore;
pub use transport::{ChannelTransport, Transport, TransportHandle};
