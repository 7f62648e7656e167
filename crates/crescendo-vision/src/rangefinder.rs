//! [`VisionRangefinder`] – slant range to a fiducial target.
//!
//! Given the height of the tag (from the [`FieldLayout`]), the height and
//! pitch of the camera, and the pitch at which the tag appears in the image,
//! the horizontal distance to the tag follows from one tangent:
//!
//! ```text
//! theta    = camera_pitch + target_pitch
//! distance = (target_height - camera_height) / tan(theta)
//! ```
//!
//! `theta` close to zero (or to π) makes the tangent vanish and the range
//! explode; such geometry is reported as
//! [`CrescendoError::DegenerateGeometry`] instead of returning an infinity.
//!
//! # Example
//!
//! ```rust
//! use crescendo_hal::sim::{SimCamera, SimPoseEstimator};
//! use crescendo_types::TargetObservation;
//! use crescendo_vision::{CameraMount, FieldLayout, VisionRangefinder};
//!
//! let mut camera = SimCamera::new("photonvision");
//! camera.push_frame(TargetObservation::target(7, 20.0, 1.0));
//!
//! let mut vision = VisionRangefinder::new(
//!     camera,
//!     SimPoseEstimator::new(None),
//!     FieldLayout::crescendo_2024().unwrap(),
//!     CameraMount::from_degrees(0.5, 10.0).unwrap(),
//! );
//!
//! let range = vision.estimate_range().unwrap();
//! assert!(range.distance_meters > 0.0);
//! ```

use tracing::{debug, warn};

use crescendo_hal::{Camera, PoseEstimator};
use crescendo_types::{CrescendoError, PoseEstimate, RangeEstimate, TargetObservation};

use crate::field_layout::FieldLayout;
use crate::gate::VisionGate;

/// Smallest `|tan(theta)|` accepted before the geometry counts as degenerate.
pub const MIN_TAN_THETA: f64 = 1e-6;

/// Where the camera sits on the robot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraMount {
    /// Lens height above the carpet, metres.
    pub height_meters: f64,
    /// Upward tilt of the optical axis from horizontal, radians.
    pub pitch_radians: f64,
}

impl CameraMount {
    /// # Errors
    ///
    /// Returns [`CrescendoError::Config`] if either value is not finite.
    pub fn new(height_meters: f64, pitch_radians: f64) -> Result<Self, CrescendoError> {
        if !height_meters.is_finite() || !pitch_radians.is_finite() {
            return Err(CrescendoError::Config(format!(
                "camera mount must be finite (height {height_meters} m, pitch {pitch_radians} rad)"
            )));
        }
        Ok(Self {
            height_meters,
            pitch_radians,
        })
    }

    pub fn from_degrees(height_meters: f64, pitch_degrees: f64) -> Result<Self, CrescendoError> {
        Self::new(height_meters, pitch_degrees.to_radians())
    }
}

/// Horizontal distance to a target seen at elevation angle `theta_radians`.
///
/// # Errors
///
/// Returns [`CrescendoError::DegenerateGeometry`] when `|tan(theta)|` is below
/// [`MIN_TAN_THETA`], or when the result would be negative or non-finite
/// (the target appears on the wrong side of the horizon for its height).
pub fn slant_range(
    target_height_meters: f64,
    camera_height_meters: f64,
    theta_radians: f64,
) -> Result<f64, CrescendoError> {
    let degenerate = CrescendoError::DegenerateGeometry { theta_radians };
    let tan = theta_radians.tan();
    if !tan.is_finite() || tan.abs() < MIN_TAN_THETA {
        return Err(degenerate);
    }
    let distance = (target_height_meters - camera_height_meters) / tan;
    if !distance.is_finite() || distance < 0.0 {
        return Err(degenerate);
    }
    Ok(distance)
}

/// Camera-based rangefinder plus the staleness gate for the pose estimator.
///
/// Owns the camera, the pose estimator and the gate state; nothing here is
/// shared with other subsystems.
pub struct VisionRangefinder<C, P> {
    camera: C,
    estimator: P,
    layout: FieldLayout,
    mount: CameraMount,
    gate: VisionGate,
    no_target_reports: u64,
}

impl<C: Camera, P: PoseEstimator> VisionRangefinder<C, P> {
    pub fn new(camera: C, estimator: P, layout: FieldLayout, mount: CameraMount) -> Self {
        Self {
            camera,
            estimator,
            layout,
            mount,
            gate: VisionGate::new(),
            no_target_reports: 0,
        }
    }

    /// Poll the camera's cached result without waiting for a new frame.
    ///
    /// A failed poll is logged and reported as "no target".
    pub fn latest_observation(&mut self) -> TargetObservation {
        match self.camera.latest_frame() {
            Ok(frame) => frame,
            Err(e) => {
                warn!(camera = self.camera.id(), error = %e, "camera poll failed; treating as no target");
                TargetObservation::none(0.0)
            }
        }
    }

    /// Height of the observed tag.
    ///
    /// The caller must have checked `observation.has_target`; the "no target"
    /// sentinel carries an id that is never on the field.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::UnknownFiducial`] when the id is not in the
    /// layout.
    pub fn target_height(&self, observation: &TargetObservation) -> Result<f64, CrescendoError> {
        self.layout.height_of(observation.fiducial_id)
    }

    /// Range to the observed target.
    ///
    /// With no target this returns `0.0` and emits one "no target detected"
    /// warning per call.
    ///
    /// # Errors
    ///
    /// See [`slant_range`].
    pub fn compute_range(
        &mut self,
        observation: &TargetObservation,
        target_height_meters: f64,
        camera_height_meters: f64,
        camera_pitch_radians: f64,
    ) -> Result<f64, CrescendoError> {
        if !observation.has_target {
            self.no_target_reports += 1;
            warn!(camera = self.camera.id(), "no target detected");
            return Ok(0.0);
        }
        let theta = camera_pitch_radians + observation.pitch_degrees.to_radians();
        slant_range(target_height_meters, camera_height_meters, theta)
    }

    /// Range to whatever `observation` sees, using the configured camera mount.
    ///
    /// # Errors
    ///
    /// Propagates tag lookup and geometry errors.
    pub fn range_for(
        &mut self,
        observation: &TargetObservation,
    ) -> Result<RangeEstimate, CrescendoError> {
        let target_height = if observation.has_target {
            self.target_height(observation)?
        } else {
            0.0
        };
        let mount = self.mount;
        let distance_meters = self.compute_range(
            observation,
            target_height,
            mount.height_meters,
            mount.pitch_radians,
        )?;
        Ok(RangeEstimate {
            distance_meters,
            valid_at_timestamp: observation.timestamp_seconds,
        })
    }

    /// Poll the camera and compute the range in one step.
    ///
    /// # Errors
    ///
    /// See [`range_for`][Self::range_for].
    pub fn estimate_range(&mut self) -> Result<RangeEstimate, CrescendoError> {
        let observation = self.latest_observation();
        self.range_for(&observation)
    }

    /// Run the pose estimator and return its result only if `observation` is
    /// a frame the gate has not seen yet.
    ///
    /// The estimator runs on every call; the gate only decides whether its
    /// output is handed downstream.
    pub fn estimate_if_new(&mut self, observation: &TargetObservation) -> Option<PoseEstimate> {
        let estimate = self.estimator.update();
        if self.gate.accept(observation.timestamp_seconds) {
            debug!(
                timestamp = observation.timestamp_seconds,
                has_pose = estimate.is_some(),
                "accepted new vision frame"
            );
            estimate
        } else {
            None
        }
    }

    /// Number of "no target detected" diagnostics emitted so far.
    pub fn no_target_reports(&self) -> u64 {
        self.no_target_reports
    }

    pub fn gate(&self) -> &VisionGate {
        &self.gate
    }

    pub fn layout(&self) -> &FieldLayout {
        &self.layout
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }

    pub fn estimator(&self) -> &P {
        &self.estimator
    }
}
