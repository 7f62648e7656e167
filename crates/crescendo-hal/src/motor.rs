//! Generic `Motor` trait for duty-cycle driven motor controllers.
//!
//! Current limits, idle modes and voltage compensation are configured by the
//! vendor driver before it is handed to a subsystem; this trait only covers
//! what the control loop needs each tick.

use crescendo_types::CrescendoError;

/// A motor controller driven by a normalised duty cycle.
pub trait Motor: Send + Sync {
    /// Stable identifier for this motor, e.g. `"pivot_motor"`.
    fn id(&self) -> &str;

    /// Command a duty cycle in `[-1, 1]`.
    ///
    /// Callers clamp before calling; drivers may reject out-of-range values.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::HardwareFault`] if the command cannot be sent.
    fn set_output(&mut self, value: f64) -> Result<(), CrescendoError>;

    /// Read back the duty cycle the controller is actually applying.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::HardwareFault`] if the controller does not
    /// answer.
    fn applied_output(&mut self) -> Result<f64, CrescendoError>;
}
