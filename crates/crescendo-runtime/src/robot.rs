//! [`Robot`] – the per-tick entry point handed to the periodic scheduler.
//!
//! One call to [`Robot::tick`] polls vision once, computes the range, runs
//! the pose estimator through the staleness gate, refreshes pivot telemetry
//! and, while a hold is active, runs one step of the pivot loop.

use tracing::warn;

use crescendo_hal::{Camera, Encoder, Motor, PoseEstimator};
use crescendo_types::{PoseEstimate, RangeEstimate, TargetObservation, TelemetryFrame};
use crescendo_vision::VisionRangefinder;

use crate::pivot::PivotController;

/// What happened during one tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub observation: TargetObservation,
    pub range: RangeEstimate,
    /// Present only when the camera produced a frame not seen before.
    pub pose: Option<PoseEstimate>,
    /// Pivot command written this tick, if a hold is active.
    pub pivot_command: Option<f64>,
    pub telemetry: TelemetryFrame,
}

/// Vision and pivot subsystems driven from a single tick.
pub struct Robot<C, P, H> {
    vision: VisionRangefinder<C, P>,
    pivot: PivotController<H>,
    holding: bool,
}

impl<C, P, H> Robot<C, P, H>
where
    C: Camera,
    P: PoseEstimator,
    H: Encoder + Motor,
{
    pub fn new(vision: VisionRangefinder<C, P>, pivot: PivotController<H>) -> Self {
        Self {
            vision,
            pivot,
            holding: false,
        }
    }

    /// Command a new pivot set-point.
    pub fn set_angle(&mut self, angle_degrees: f64) {
        self.pivot.set_angle(angle_degrees);
    }

    /// Start running `hold_angle` on every tick.
    pub fn start_hold(&mut self) {
        self.holding = true;
    }

    /// Stop holding and neutralise the pivot.
    pub fn cancel_hold(&mut self) {
        self.holding = false;
        self.pivot.disable();
    }

    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Run one control tick.
    ///
    /// Never fails: range errors are logged and published as a zero range.
    pub fn tick(&mut self) -> TickReport {
        let observation = self.vision.latest_observation();
        let range = match self.vision.range_for(&observation) {
            Ok(range) => range,
            Err(e) => {
                warn!(fiducial_id = observation.fiducial_id, error = %e, "range estimate unavailable");
                RangeEstimate {
                    distance_meters: 0.0,
                    valid_at_timestamp: observation.timestamp_seconds,
                }
            }
        };
        let pose = self.vision.estimate_if_new(&observation);

        self.pivot.periodic();
        let pivot_command = self.holding.then(|| self.pivot.hold_angle());

        TickReport {
            observation,
            range,
            pose,
            pivot_command,
            telemetry: TelemetryFrame {
                encoder_position: self.pivot.encoder_position(),
                angle_degrees: self.pivot.target_angle(),
                motor_output: self.pivot.motor_output(),
                target_range_meters: range.distance_meters,
            },
        }
    }

    pub fn vision(&self) -> &VisionRangefinder<C, P> {
        &self.vision
    }

    pub fn vision_mut(&mut self) -> &mut VisionRangefinder<C, P> {
        &mut self.vision
    }

    pub fn pivot(&self) -> &PivotController<H> {
        &self.pivot
    }

    pub fn pivot_mut(&mut self) -> &mut PivotController<H> {
        &mut self.pivot
    }
}
