//! Proportional–Derivative–Feedforward (PDF) position controller.
//!
//! The controller computes a duty-cycle command that drives a measured angle
//! toward a set-point.  It is hardware-agnostic: the caller supplies the
//! measurement and elapsed time and applies the returned output to any
//! [`Motor`][crate::motor::Motor].
//!
//! ```text
//! output = clamp(kP * error + kD * d(error)/dt + kF, -1, 1)
//! ```
//!
//! `kF` is added regardless of the error, which lets it hold a constant load
//! such as gravity on an arm.
//!
//! # Example
//!
//! ```rust
//! use crescendo_hal::pid::PdfController;
//! use crescendo_types::PivotGains;
//!
//! let mut pdf = PdfController::new(PivotGains::new(0.04, 0.0, 0.0)).unwrap();
//! pdf.set_set_point(30.0);
//!
//! let output = pdf.update(0.0, 0.02); // measurement=0°, dt=20 ms
//! assert!((output - 1.0).abs() < 1e-9); // 1.2 clamped to the duty-cycle limit
//! ```

use crescendo_types::{CrescendoError, PivotGains};

/// A PDF controller with gains validated at construction.
///
/// Output is always a finite duty cycle in `[-1, 1]`.
#[derive(Debug, Clone)]
pub struct PdfController {
    gains: PivotGains,
    set_point: f64,
    last_error: Option<f64>,
}

impl PdfController {
    /// Create a new controller.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::InvalidGain`] when any gain is negative or
    /// not finite.
    pub fn new(gains: PivotGains) -> Result<Self, CrescendoError> {
        gains.validate()?;
        Ok(Self {
            gains,
            set_point: 0.0,
            last_error: None,
        })
    }

    pub fn gains(&self) -> PivotGains {
        self.gains
    }

    /// Change the desired set-point.
    ///
    /// Derivative memory is cleared so a set-point step does not produce a
    /// derivative kick on the next update.
    pub fn set_set_point(&mut self, set_point: f64) {
        self.set_point = set_point;
        self.last_error = None;
    }

    pub fn set_point(&self) -> f64 {
        self.set_point
    }

    /// Compute the next controller output.
    ///
    /// - `measurement` – the current angle of the mechanism.
    /// - `dt` – elapsed time since the last call, in seconds.
    ///
    /// Returns `0.0` and clears derivative memory when `dt` is not positive,
    /// or when the measurement or the set-point is not finite.
    pub fn update(&mut self, measurement: f64, dt: f64) -> f64 {
        if dt.is_nan() || dt <= 0.0 || !measurement.is_finite() || !self.set_point.is_finite() {
            self.last_error = None;
            return 0.0;
        }

        let error = self.set_point - measurement;
        let p = self.gains.kp * error;

        // Backward difference; zero on the first sample.
        let d = match self.last_error {
            Some(prev) => self.gains.kd * (error - prev) / dt,
            None => 0.0,
        };
        self.last_error = Some(error);

        let output = p + d + self.gains.kf;
        if output.is_finite() { output.clamp(-1.0, 1.0) } else { 0.0 }
    }

    /// Forget derivative memory.
    pub fn reset(&mut self) {
        self.last_error = None;
    }
}
