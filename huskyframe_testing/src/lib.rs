//! Test utilities for `huskyframe`.
//!
//! [`MockSensor`] plays the sensor and its BLE bridge on the far side of a
//! [`ChannelTransport`](huskyframe::transport::ChannelTransport), so session
//! behaviour can be exercised end to end without hardware:
//!
//! ```rust
//! use huskyframe::{record::{BoxRecord, DetailRecord}, session::Session, transport::ChannelTransport};
//! use huskyframe_testing::MockSensor;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (transport, handle) = ChannelTransport::new();
//! let record = DetailRecord::Box(BoxRecord::from_fields([160, 120, 10, 10, 1]));
//! tokio::spawn(MockSensor::new(handle).batch(vec![record]).run());
//!
//! let mut session = Session::new(transport);
//! let store = session.request_snapshot().await.expect("reply");
//! assert_eq!(store.count_boxes(None), 1);
//! # }
//! ```

pub mod frames;
pub mod logging;
pub mod metrics;
pub mod sensor;

pub use frames::{
    arrow_frame,
    box_frame,
    corrupt,
    detail_frame,
    five_field_frame,
    notification,
    ok_frame,
    summary_frame,
};
pub use logging::{LoggerHandle, logger};
pub use metrics::{counter_value, debugging_recorder};
pub use sensor::{Behaviour, MockSensor, SensorLog};
