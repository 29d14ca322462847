//! Session configuration.
//!
//! Timing defaults match the sensor's observed behaviour over the BLE
//! bridge: a poll cycle lasts about 100 ms, the bridge answers a read
//! trigger within 500 ms, and the knock handshake is tried five times.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::store::DEFAULT_BATCH_CAPACITY;

/// Timing and capacity settings for a [`Session`](crate::session::Session).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use huskyframe::config::SessionConfig;
///
/// let config = SessionConfig::default()
///     .poll_window(Duration::from_millis(200))
///     .batch_capacity(16);
///
/// assert_eq!(config.poll_window, Duration::from_millis(200));
/// assert_eq!(config.knock_attempts, 5);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Window for one wait-for-frame cycle.
    ///
    /// Default: 100 milliseconds.
    pub poll_window: Duration,

    /// Longest wait for the bridge to deliver a chunk after a read trigger.
    ///
    /// Default: 500 milliseconds.
    pub read_window: Duration,

    /// Deadline for the acknowledgement of an algorithm switch.
    ///
    /// Default: 500 milliseconds.
    pub ack_window: Duration,

    /// Knock attempts made by [`Session::initialize`](crate::session::Session::initialize).
    ///
    /// Default: 5.
    pub knock_attempts: u32,

    /// Attempts made by [`Session::forget`](crate::session::Session::forget).
    ///
    /// Default: 5.
    pub forget_attempts: u32,

    /// Pause after photo, screenshot and model commands.
    ///
    /// Default: 500 milliseconds.
    pub settle_delay: Duration,

    /// Number of batch slots in the result store.
    ///
    /// Default: 10.
    pub batch_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_window: Duration::from_millis(100),
            read_window: Duration::from_millis(500),
            ack_window: Duration::from_millis(500),
            knock_attempts: 5,
            forget_attempts: 5,
            settle_delay: Duration::from_millis(500),
            batch_capacity: DEFAULT_BATCH_CAPACITY,
        }
    }
}

impl SessionConfig {
    /// Set the poll window.
    #[must_use]
    pub fn poll_window(mut self, window: Duration) -> Self {
        self.poll_window = window;
        self
    }

    /// Set the read window.
    #[must_use]
    pub fn read_window(mut self, window: Duration) -> Self {
        self.read_window = window;
        self
    }

    /// Set the acknowledgement window.
    #[must_use]
    pub fn ack_window(mut self, window: Duration) -> Self {
        self.ack_window = window;
        self
    }

    /// Set the number of knock attempts.
    #[must_use]
    pub fn knock_attempts(mut self, attempts: u32) -> Self {
        self.knock_attempts = attempts;
        self
    }

    /// Set the number of forget attempts.
    #[must_use]
    pub fn forget_attempts(mut self, attempts: u32) -> Self {
        self.forget_attempts = attempts;
        self
    }

    /// Set the settle delay.
    #[must_use]
    pub fn settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Set the batch capacity.
    #[must_use]
    pub fn batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Clamp values that would make the session unusable.
    ///
    /// Attempts and capacity are raised to at least one.
    ///
    /// # Examples
    ///
    /// ```
    /// use huskyframe::config::SessionConfig;
    ///
    /// let config = SessionConfig::default()
    ///     .knock_attempts(0)
    ///     .batch_capacity(0)
    ///     .normalized();
    /// assert_eq!(config.knock_attempts, 1);
    /// assert_eq!(config.batch_capacity, 1);
    /// ```
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.knock_attempts = self.knock_attempts.max(1);
        self.forget_attempts = self.forget_attempts.max(1);
        self.batch_capacity = self.batch_capacity.max(1);
        self
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::SessionConfig;

    #[test]
    fn defaults_match_sensor_timing() {
        let config = SessionConfig::default();
        assert_eq!(config.poll_window, Duration::from_millis(100));
        assert_eq!(config.read_window, Duration::from_millis(500));
        assert_eq!(config.ack_window, Duration::from_millis(500));
        assert_eq!(config.knock_attempts, 5);
        assert_eq!(config.batch_capacity, 10);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: SessionConfig = serde_json::from_str(
            r#"{"batch_capacity": 32, "ack_window": {"secs": 1, "nanos": 0}}"#,
        )
        .expect("valid config");
        assert_eq!(config.batch_capacity, 32);
        assert_eq!(config.ack_window, Duration::from_secs(1));
        assert_eq!(config.poll_window, SessionConfig::default().poll_window);
    }

    #[test]
    fn config_survives_json() {
        let config = SessionConfig::default().knock_attempts(3);
        let json = serde_json::to_string(&config).expect("serialises");
        let back: SessionConfig = serde_json::from_str(&json).expect("deserialises");
        assert_eq!(back, config);
    }
}
