//! Metric helpers for `huskyframe`.
//!
//! This module defines metric names and thin helpers wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to nothing.

use crate::error::FrameRejection;

/// Name of the counter tracking frames that passed through the codec.
pub const FRAMES_TOTAL: &str = "huskyframe_frames_total";
/// Name of the counter tracking discarded input, labelled by reason.
pub const FRAMES_REJECTED: &str = "huskyframe_frames_rejected_total";
/// Name of the counter tracking request cycles that ran out of time.
pub const TIMEOUTS_TOTAL: &str = "huskyframe_timeouts_total";

/// Direction of frame processing.
#[derive(Clone, Copy, Debug)]
pub enum Direction {
    /// Frames received from the sensor.
    Inbound,
    /// Frames built for the sensor.
    Outbound,
}

impl Direction {
    #[cfg_attr(not(feature = "metrics"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Direction::Inbound => "inbound",
            Direction::Outbound => "outbound",
        }
    }
}

/// Record a frame for the given direction.
#[cfg(feature = "metrics")]
pub fn inc_frames(direction: Direction) {
    metrics::counter!(FRAMES_TOTAL, "direction" => direction.as_str()).increment(1);
}

/// Record a discarded frame.
#[cfg(feature = "metrics")]
pub fn inc_rejected(rejection: &FrameRejection) {
    metrics::counter!(FRAMES_REJECTED, "reason" => rejection.reason()).increment(1);
}

/// Record a request cycle that timed out.
#[cfg(feature = "metrics")]
pub fn inc_timeouts() { metrics::counter!(TIMEOUTS_TOTAL).increment(1); }

/// Record a frame for the given direction.
#[cfg(not(feature = "metrics"))]
pub fn inc_frames(_direction: Direction) {}

/// Record a discarded frame.
#[cfg(not(feature = "metrics"))]
pub fn inc_rejected(_rejection: &FrameRejection) {}

/// Record a request cycle that timed out.
#[cfg(not(feature = "metrics"))]
pub fn inc_timeouts() {}
