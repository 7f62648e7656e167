//! [`VisionGate`] – staleness gate for vision updates.
//!
//! The camera publishes at its own rate while the control loop polls at a
//! fixed period, so consecutive polls often return the same frame.  The gate
//! accepts a frame only when its capture timestamp differs from the last
//! accepted one by more than [`MIN_TIMESTAMP_ADVANCE`].
//!
//! The comparison is symmetric: a coprocessor reboot restarts the camera
//! clock near zero, and frames from the new clock are accepted straight away.

/// Minimum timestamp change, in seconds, for a frame to count as new.
pub const MIN_TIMESTAMP_ADVANCE: f64 = 1e-5;

/// Tracks the timestamp of the last accepted vision frame.
#[derive(Debug, Clone, Default)]
pub struct VisionGate {
    last_accepted_timestamp: f64,
}

impl VisionGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `timestamp_seconds` if it differs from the last accepted frame
    /// by more than [`MIN_TIMESTAMP_ADVANCE`].
    ///
    /// Returns `true` and records the timestamp on acceptance.  A NaN
    /// timestamp is never accepted.
    pub fn accept(&mut self, timestamp_seconds: f64) -> bool {
        if (timestamp_seconds - self.last_accepted_timestamp).abs() > MIN_TIMESTAMP_ADVANCE {
            self.last_accepted_timestamp = timestamp_seconds;
            true
        } else {
            false
        }
    }

    pub fn last_accepted_timestamp(&self) -> f64 {
        self.last_accepted_timestamp
    }
}
