//! Generic `PoseEstimator` trait wrapping the vendor multi-tag solver.

use crescendo_types::PoseEstimate;

/// A field-relative robot pose solver fed by the camera pipeline.
///
/// The solver's internals belong to the vendor; the core only calls
/// [`update`][PoseEstimator::update] once per tick and decides whether the
/// result is fresh enough to use.
pub trait PoseEstimator: Send + Sync {
    /// Run the solver on the latest camera result.
    ///
    /// Returns `None` when the solver has nothing to report.
    fn update(&mut self) -> Option<PoseEstimate>;
}
