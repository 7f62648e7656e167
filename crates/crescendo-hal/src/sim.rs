//! In-process simulated drivers for running the stack without a robot.
//!
//! Every driver here is deterministic and can be told to fail a number of
//! upcoming calls, so fault handling is testable without real hardware.
//!
//! # Example
//!
//! ```rust
//! use crescendo_hal::sim::SimPivot;
//! use crescendo_hal::{Encoder, Motor};
//!
//! let mut pivot = SimPivot::new("pivot", 10.0);
//! pivot.set_output(0.5).unwrap();
//! pivot.step();
//! assert!((pivot.position_degrees().unwrap() - 5.0).abs() < 1e-6);
//! ```

use std::collections::VecDeque;

use crescendo_types::{CrescendoError, PoseEstimate, TargetObservation};

use crate::camera::Camera;
use crate::encoder::{Encoder, EncoderScale};
use crate::motor::Motor;
use crate::pose_estimator::PoseEstimator;

fn injected_fault(component: &str, call: &str) -> CrescendoError {
    CrescendoError::HardwareFault {
        component: component.to_string(),
        details: format!("simulated {call} failure"),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Camera
// ────────────────────────────────────────────────────────────────────────────

/// Continuous target the camera keeps seeing while streaming.
#[derive(Debug, Clone, Copy)]
struct TargetStream {
    fiducial_id: i32,
    pitch_degrees: f64,
    frame_period: f64,
    poll_period: f64,
    clock: f64,
}

/// A simulated vision pipeline.
///
/// Frames can be queued explicitly with [`SimCamera::push_frame`]; each poll
/// consumes one queued frame and otherwise keeps returning the cached one.
/// [`SimCamera::streaming`] instead models a camera producing frames at a
/// fixed rate while being polled at another, so repeated polls between two
/// captures return the same timestamp.
pub struct SimCamera {
    id: String,
    queued: VecDeque<TargetObservation>,
    cached: TargetObservation,
    stream: Option<TargetStream>,
    failures: u32,
}

impl SimCamera {
    /// A camera that sees nothing until frames are pushed.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            queued: VecDeque::new(),
            cached: TargetObservation::none(0.0),
            stream: None,
            failures: 0,
        }
    }

    /// A camera continuously seeing tag `fiducial_id` at `pitch_degrees`.
    ///
    /// A new frame is captured every `frame_period` seconds and the camera is
    /// polled every `poll_period` seconds.
    pub fn streaming(
        id: impl Into<String>,
        fiducial_id: i32,
        pitch_degrees: f64,
        frame_period: f64,
        poll_period: f64,
    ) -> Self {
        let mut cam = Self::new(id);
        cam.stream = Some(TargetStream {
            fiducial_id,
            pitch_degrees,
            frame_period,
            poll_period,
            clock: 0.0,
        });
        cam
    }

    /// Queue a frame to be returned by a later poll.
    pub fn push_frame(&mut self, frame: TargetObservation) {
        self.queued.push_back(frame);
    }

    /// Make the next `count` polls fail.
    pub fn fail_next(&mut self, count: u32) {
        self.failures = count;
    }
}

impl Camera for SimCamera {
    fn id(&self) -> &str {
        &self.id
    }

    fn latest_frame(&mut self) -> Result<TargetObservation, CrescendoError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(injected_fault(&self.id, "frame poll"));
        }
        if let Some(frame) = self.queued.pop_front() {
            self.cached = frame;
        } else if let Some(stream) = self.stream.as_mut() {
            stream.clock += stream.poll_period;
            let captured = (stream.clock / stream.frame_period).floor() * stream.frame_period;
            self.cached =
                TargetObservation::target(stream.fiducial_id, stream.pitch_degrees, captured);
        }
        Ok(self.cached)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pose estimator
// ────────────────────────────────────────────────────────────────────────────

/// A pose solver that always reports the same pose and counts its calls.
pub struct SimPoseEstimator {
    pose: Option<PoseEstimate>,
    updates: u64,
}

impl SimPoseEstimator {
    pub fn new(pose: Option<PoseEstimate>) -> Self {
        Self { pose, updates: 0 }
    }

    /// Number of times the solver has been run.
    pub fn updates(&self) -> u64 {
        self.updates
    }
}

impl PoseEstimator for SimPoseEstimator {
    fn update(&mut self) -> Option<PoseEstimate> {
        self.updates += 1;
        self.pose.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pivot plant
// ────────────────────────────────────────────────────────────────────────────

/// A single-axis pivot with a linear plant model.
///
/// Each [`step`][SimPivot::step] moves the mechanism by
/// `applied_output * degrees_per_tick`.  Position is stored as raw encoder
/// counts and scaled on read like a real quadrature encoder.
pub struct SimPivot {
    id: String,
    counts: f64,
    output: f64,
    degrees_per_tick: f64,
    scale: EncoderScale,
    encoder_failures: u32,
    motor_failures: u32,
    writes: u64,
}

impl SimPivot {
    /// `degrees_per_tick` is the travel per tick at full output.
    pub fn new(id: impl Into<String>, degrees_per_tick: f64) -> Self {
        Self {
            id: id.into(),
            counts: 0.0,
            output: 0.0,
            degrees_per_tick,
            scale: EncoderScale::default(),
            encoder_failures: 0,
            motor_failures: 0,
            writes: 0,
        }
    }

    pub fn with_scale(mut self, scale: EncoderScale) -> Self {
        self.scale = scale;
        self
    }

    /// Start the mechanism at `degrees`.
    pub fn with_position(mut self, degrees: f64) -> Self {
        self.counts = self.scale.degrees_to_counts(degrees);
        self
    }

    /// Advance the plant by one tick.
    pub fn step(&mut self) {
        self.counts += self
            .scale
            .degrees_to_counts(self.output * self.degrees_per_tick);
    }

    /// Mechanism angle, bypassing fault injection.
    pub fn true_position_degrees(&self) -> f64 {
        self.scale.counts_to_degrees(self.counts)
    }

    /// Last duty cycle accepted by the motor, bypassing fault injection.
    pub fn commanded_output(&self) -> f64 {
        self.output
    }

    /// Number of successful motor writes.
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Make the next `count` encoder reads fail.
    pub fn fail_encoder_reads(&mut self, count: u32) {
        self.encoder_failures = count;
    }

    /// Make the next `count` motor calls (writes and read-backs) fail.
    pub fn fail_motor_calls(&mut self, count: u32) {
        self.motor_failures = count;
    }
}

impl Encoder for SimPivot {
    fn id(&self) -> &str {
        &self.id
    }

    fn position_degrees(&mut self) -> Result<f64, CrescendoError> {
        if self.encoder_failures > 0 {
            self.encoder_failures -= 1;
            return Err(injected_fault(&self.id, "encoder read"));
        }
        Ok(self.true_position_degrees())
    }
}

impl Motor for SimPivot {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_output(&mut self, value: f64) -> Result<(), CrescendoError> {
        if self.motor_failures > 0 {
            self.motor_failures -= 1;
            return Err(injected_fault(&self.id, "motor write"));
        }
        self.output = value.clamp(-1.0, 1.0);
        self.writes += 1;
        Ok(())
    }

    fn applied_output(&mut self) -> Result<f64, CrescendoError> {
        if self.motor_failures > 0 {
            self.motor_failures -= 1;
            return Err(injected_fault(&self.id, "applied output read"));
        }
        Ok(self.output)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Roller motor
// ────────────────────────────────────────────────────────────────────────────

/// A simulated open-loop roller motor (intake or shooter wheel).
pub struct SimMotor {
    id: String,
    output: f64,
    failures: u32,
}

impl SimMotor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            output: 0.0,
            failures: 0,
        }
    }

    /// Make the next `count` calls fail.
    pub fn fail_next(&mut self, count: u32) {
        self.failures = count;
    }
}

impl Motor for SimMotor {
    fn id(&self) -> &str {
        &self.id
    }

    fn set_output(&mut self, value: f64) -> Result<(), CrescendoError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(injected_fault(&self.id, "motor write"));
        }
        self.output = value.clamp(-1.0, 1.0);
        Ok(())
    }

    fn applied_output(&mut self) -> Result<f64, CrescendoError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(injected_fault(&self.id, "applied output read"));
        }
        Ok(self.output)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn camera_without_frames_reports_no_target() {
        let mut cam = SimCamera::new("photonvision");
        let frame = cam.latest_frame().unwrap();
        assert!(!frame.has_target);
    }

    #[test]
    fn camera_keeps_last_pushed_frame_cached() {
        let mut cam = SimCamera::new("photonvision");
        cam.push_frame(TargetObservation::target(4, 10.0, 1.0));
        let first = cam.latest_frame().unwrap();
        let again = cam.latest_frame().unwrap();
        assert_eq!(first, again);
        assert_eq!(again.fiducial_id, 4);
    }

    #[test]
    fn streaming_camera_repeats_timestamps_between_captures() {
        // 50 ms frames polled every 20 ms.
        let mut cam = SimCamera::streaming("photonvision", 7, 12.0, 0.05, 0.02);
        let stamps: Vec<f64> = (0..5)
            .map(|_| cam.latest_frame().unwrap().timestamp_seconds)
            .collect();
        // clocks 0.02 0.04 0.06 0.08 0.10 → captures 0.0 0.0 0.05 0.05 0.10
        assert_eq!(stamps[0], stamps[1]);
        assert!(stamps[2] > stamps[1]);
        assert_eq!(stamps[2], stamps[3]);
        assert!(stamps[4] > stamps[3]);
    }

    #[test]
    fn camera_fault_injection() {
        let mut cam = SimCamera::new("photonvision");
        cam.fail_next(1);
        assert!(matches!(
            cam.latest_frame(),
            Err(CrescendoError::HardwareFault { .. })
        ));
        assert!(cam.latest_frame().is_ok());
    }

    #[test]
    fn pose_estimator_counts_updates() {
        let mut est = SimPoseEstimator::new(None);
        assert!(est.update().is_none());
        assert!(est.update().is_none());
        assert_eq!(est.updates(), 2);
    }

    #[test]
    fn pivot_plant_integrates_output() {
        let mut pivot = SimPivot::new("pivot", 10.0).with_position(5.0);
        pivot.set_output(-0.5).unwrap();
        pivot.step();
        pivot.step();
        assert!((pivot.position_degrees().unwrap() - (-5.0)).abs() < 1e-6);
        assert_eq!(pivot.writes(), 1);
    }

    #[test]
    fn pivot_fault_injection_is_per_call() {
        let mut pivot = SimPivot::new("pivot", 10.0);
        pivot.fail_encoder_reads(1);
        pivot.fail_motor_calls(1);
        assert!(pivot.position_degrees().is_err());
        assert!(pivot.position_degrees().is_ok());
        assert!(pivot.set_output(0.3).is_err());
        assert!((pivot.commanded_output() - 0.0).abs() < f64::EPSILON);
        pivot.set_output(0.3).unwrap();
        assert!((pivot.applied_output().unwrap() - 0.3).abs() < f64::EPSILON);
    }

    #[test]
    fn sim_motor_records_output() {
        let mut motor = SimMotor::new("intake");
        motor.set_output(0.75).unwrap();
        assert!((motor.applied_output().unwrap() - 0.75).abs() < f64::EPSILON);
        motor.fail_next(1);
        assert!(motor.set_output(0.0).is_err());
    }
}
