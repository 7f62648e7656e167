//! [`RollerSubsystem`] – open-loop duty-cycle rollers (intake, shooter).

use tracing::warn;

use crescendo_hal::Motor;

/// A roller driven directly at a duty cycle.
pub struct RollerSubsystem<M> {
    motor: M,
    requested: f64,
    applied: f64,
}

impl<M: Motor> RollerSubsystem<M> {
    pub fn new(motor: M) -> Self {
        Self {
            motor,
            requested: 0.0,
            applied: 0.0,
        }
    }

    /// Spin at `duty` (clamped to `[-1, 1]`) and return what was written.
    ///
    /// A failed write is logged and reported as `0.0`.
    pub fn run(&mut self, duty: f64) -> f64 {
        let duty = if duty.is_finite() { duty.clamp(-1.0, 1.0) } else { 0.0 };
        self.requested = duty;
        match self.motor.set_output(duty) {
            Ok(()) => duty,
            Err(e) => {
                warn!(motor = self.motor.id(), error = %e, duty, "roller write failed");
                0.0
            }
        }
    }

    pub fn stop(&mut self) {
        self.run(0.0);
    }

    /// Refresh the applied output from the motor controller.
    pub fn periodic(&mut self) {
        self.applied = match self.motor.applied_output() {
            Ok(output) => output,
            Err(e) => {
                warn!(motor = self.motor.id(), error = %e, "roller applied-output read failed");
                0.0
            }
        };
    }

    /// Last duty cycle requested through [`run`][Self::run].
    pub fn requested(&self) -> f64 {
        self.requested
    }

    /// Duty cycle read back on the last [`periodic`][Self::periodic].
    pub fn applied(&self) -> f64 {
        self.applied
    }

    pub fn motor_mut(&mut self) -> &mut M {
        &mut self.motor
    }
}
