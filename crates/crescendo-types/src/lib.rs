use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Fiducial id carried by an observation that has no target.
pub const NO_FIDUCIAL: i32 = -1;

/// The most recent camera result, as reported by the vision coprocessor.
///
/// Produced fresh every tick and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetObservation {
    /// Whether the pipeline currently sees at least one fiducial tag.
    pub has_target: bool,
    /// Id of the best visible tag (`NO_FIDUCIAL` when nothing is seen).
    pub fiducial_id: i32,
    /// Pitch of the best target relative to the camera's optical axis, degrees.
    pub pitch_degrees: f64,
    /// Capture timestamp of the frame, seconds.
    pub timestamp_seconds: f64,
}

impl TargetObservation {
    /// An observation of tag `fiducial_id` seen at `pitch_degrees`.
    pub fn target(fiducial_id: i32, pitch_degrees: f64, timestamp_seconds: f64) -> Self {
        Self {
            has_target: true,
            fiducial_id,
            pitch_degrees,
            timestamp_seconds,
        }
    }

    /// The "nothing in view" sentinel.
    pub fn none(timestamp_seconds: f64) -> Self {
        Self {
            has_target: false,
            fiducial_id: NO_FIDUCIAL,
            pitch_degrees: 0.0,
            timestamp_seconds,
        }
    }
}

/// Surveyed field pose of a single fiducial tag.
///
/// Only `z_meters` (the tag height) feeds the range calculation; the rest of
/// the pose is kept so the layout can be inspected and reused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldTagPose {
    pub id: i32,
    pub x_meters: f64,
    pub y_meters: f64,
    pub z_meters: f64,
    /// Rotation about the field's vertical axis, degrees.
    pub yaw_degrees: f64,
}

impl FieldTagPose {
    pub fn height_meters(&self) -> f64 {
        self.z_meters
    }
}

/// Straight-line distance from the camera to the current target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeEstimate {
    /// Slant range in metres; `0.0` when no target is visible.
    pub distance_meters: f64,
    /// Timestamp of the observation the range was computed from, seconds.
    pub valid_at_timestamp: f64,
}

/// Robot pose reported by the multi-tag pose estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    pub x_meters: f64,
    pub y_meters: f64,
    pub heading_radians: f64,
    pub timestamp_seconds: f64,
    /// Ids of the tags the solver used for this estimate.
    pub tags_used: Vec<i32>,
}

/// Proportional / derivative / feedforward gains for a position loop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PivotGains {
    pub kp: f64,
    pub kd: f64,
    pub kf: f64,
}

impl PivotGains {
    pub fn new(kp: f64, kd: f64, kf: f64) -> Self {
        Self { kp, kd, kf }
    }

    /// Check that every gain is finite and non-negative.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::InvalidGain`] naming the first offending gain.
    /// Values are never clamped into range.
    pub fn validate(&self) -> Result<(), CrescendoError> {
        for (name, value) in [("kP", self.kp), ("kD", self.kd), ("kF", self.kf)] {
            if !value.is_finite() || value < 0.0 {
                return Err(CrescendoError::InvalidGain { name, value });
            }
        }
        Ok(())
    }
}

/// Per-tick values published to the telemetry channel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryFrame {
    pub encoder_position: f64,
    pub angle_degrees: f64,
    pub motor_output: f64,
    pub target_range_meters: f64,
}

/// Error type shared by every crate in the workspace.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CrescendoError {
    #[error("No field pose for fiducial id {0}")]
    UnknownFiducial(i32),

    #[error("Invalid gain {name} = {value}: gains must be finite and >= 0")]
    InvalidGain { name: &'static str, value: f64 },

    #[error("Degenerate camera geometry at theta = {theta_radians} rad: no finite, non-negative range")]
    DegenerateGeometry { theta_radians: f64 },

    #[error("Hardware Fault on {component}: {details}")]
    HardwareFault { component: String, details: String },

    #[error("Field layout error: {0}")]
    FieldLayout(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_observation_has_no_target() {
        let obs = TargetObservation::none(3.5);
        assert!(!obs.has_target);
        assert_eq!(obs.fiducial_id, NO_FIDUCIAL);
        assert!((obs.timestamp_seconds - 3.5).abs() < f64::EPSILON);
    }

    #[test]
    fn valid_gains_pass() {
        assert!(PivotGains::new(0.04, 0.0005, 0.0).validate().is_ok());
        assert!(PivotGains::new(0.0, 0.0, 0.0).validate().is_ok());
    }

    #[test]
    fn negative_gain_is_rejected_not_clamped() {
        let err = PivotGains::new(-1.0, 0.0, 0.0).validate().unwrap_err();
        assert_eq!(
            err,
            CrescendoError::InvalidGain {
                name: "kP",
                value: -1.0
            }
        );
    }

    #[test]
    fn non_finite_gain_is_rejected() {
        let err = PivotGains::new(0.1, f64::NAN, 0.0).validate().unwrap_err();
        assert!(matches!(err, CrescendoError::InvalidGain { name: "kD", .. }));
        let err = PivotGains::new(0.1, 0.0, f64::INFINITY).validate().unwrap_err();
        assert!(matches!(err, CrescendoError::InvalidGain { name: "kF", .. }));
    }

    #[test]
    fn telemetry_frame_uses_dashboard_names() {
        let frame = TelemetryFrame {
            encoder_position: 12.0,
            angle_degrees: 30.0,
            motor_output: 0.5,
            target_range_meters: 2.25,
        };
        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("\"encoderPosition\":12.0"));
        assert!(json.contains("\"angleDegrees\":30.0"));
        assert!(json.contains("\"motorOutput\":0.5"));
        assert!(json.contains("\"targetRangeMeters\":2.25"));
    }

    #[test]
    fn error_display() {
        let err = CrescendoError::UnknownFiducial(42);
        assert!(err.to_string().contains("42"));

        let err2 = CrescendoError::HardwareFault {
            component: "pivot_motor".to_string(),
            details: "CAN timeout".to_string(),
        };
        assert!(err2.to_string().contains("pivot_motor"));
    }
}
