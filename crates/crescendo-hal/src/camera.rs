//! Generic `Camera` trait for fiducial-tracking vision pipelines.

use crescendo_types::{CrescendoError, TargetObservation};

/// A vision pipeline that publishes its most recent result.
///
/// Implementations must never block waiting for a new frame: `latest_frame`
/// returns whatever result is cached, which may be the same frame as the
/// previous call.
pub trait Camera: Send + Sync {
    /// Stable identifier for this camera, e.g. `"photonvision"`.
    fn id(&self) -> &str;

    /// Return the most recent cached result.
    ///
    /// An empty view is reported as [`TargetObservation::none`], not as an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::HardwareFault`] if the pipeline cannot be
    /// reached (e.g. the coprocessor is disconnected).
    fn latest_frame(&mut self) -> Result<TargetObservation, CrescendoError>;
}
