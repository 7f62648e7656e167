//! [`PivotController`] – closed-loop angle control for the shooter pivot.
//!
//! # Lifecycle
//!
//! ```text
//! Idle ──set_angle──▶ TargetSet ──hold_angle──▶ Holding
//!  ▲                                               │
//!  └──────────────────── disable ──────────────────┘
//! ```
//!
//! The controller never leaves `Holding` on its own; whoever schedules
//! [`hold_angle`][PivotController::hold_angle] decides when to stop.
//!
//! [`periodic`][PivotController::periodic] refreshes the telemetry fields on
//! every tick whether or not a hold is active.
//!
//! # Faults
//!
//! Encoder and motor errors never escape a tick: the controller logs them,
//! commands a neutral output and carries on with the next tick.

use std::time::Duration;

use tracing::{debug, warn};

use crescendo_hal::{Encoder, Motor, PdfController};
use crescendo_types::{CrescendoError, PivotGains};

/// Command state of the pivot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PivotMode {
    /// No set-point has been commanded.
    Idle,
    /// A set-point is stored but not yet being held.
    TargetSet,
    /// `hold_angle` is driving the motor toward the set-point.
    Holding,
}

/// Single-axis position controller owning the pivot's motor and encoder.
pub struct PivotController<H> {
    hardware: H,
    pdf: PdfController,
    mode: PivotMode,
    tick_seconds: f64,
    encoder_position: f64,
    target_angle: f64,
    motor_output: f64,
}

impl<H: Encoder + Motor> PivotController<H> {
    /// Build a controller ticking every `tick_period`.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::InvalidGain`] for negative or non-finite
    /// gains and [`CrescendoError::Config`] for a zero tick period.
    pub fn new(hardware: H, gains: PivotGains, tick_period: Duration) -> Result<Self, CrescendoError> {
        let pdf = PdfController::new(gains)?;
        if tick_period.is_zero() {
            return Err(CrescendoError::Config(
                "pivot tick period must be non-zero".to_string(),
            ));
        }
        Ok(Self {
            hardware,
            pdf,
            mode: PivotMode::Idle,
            tick_seconds: tick_period.as_secs_f64(),
            encoder_position: 0.0,
            target_angle: 0.0,
            motor_output: 0.0,
        })
    }

    /// Store a new set-point.  Nothing is sent to the motor.
    pub fn set_angle(&mut self, angle_degrees: f64) {
        debug!(angle_degrees, "pivot set-point updated");
        self.target_angle = angle_degrees;
        self.pdf.set_set_point(angle_degrees);
        self.mode = PivotMode::TargetSet;
    }

    /// Run one tick of the position loop and return the applied command.
    ///
    /// In [`PivotMode::Idle`] there is nothing to hold and a neutral command
    /// is written instead.
    pub fn hold_angle(&mut self) -> f64 {
        if self.mode == PivotMode::Idle {
            return self.write_output(0.0);
        }
        self.mode = PivotMode::Holding;

        let command = match self.hardware.position_degrees() {
            Ok(position) => self.pdf.update(position, self.tick_seconds),
            Err(e) => {
                warn!(encoder = Encoder::id(&self.hardware), error = %e, "pivot encoder read failed; output forced to 0");
                self.pdf.reset();
                0.0
            }
        };
        self.write_output(command)
    }

    /// Stop holding: return to [`PivotMode::Idle`] and write a neutral output.
    pub fn disable(&mut self) {
        if self.mode != PivotMode::Idle {
            debug!("pivot disabled");
        }
        self.mode = PivotMode::Idle;
        self.pdf.reset();
        self.write_output(0.0);
    }

    /// Refresh `encoder_position` and `motor_output` from the hardware.
    ///
    /// A failed encoder read keeps the previous position; a failed output
    /// read reports 0.
    pub fn periodic(&mut self) {
        match self.hardware.position_degrees() {
            Ok(position) => self.encoder_position = position,
            Err(e) => {
                warn!(encoder = Encoder::id(&self.hardware), error = %e, "pivot encoder read failed");
            }
        }
        self.motor_output = match self.hardware.applied_output() {
            Ok(output) => output,
            Err(e) => {
                warn!(motor = Motor::id(&self.hardware), error = %e, "pivot applied-output read failed");
                0.0
            }
        };
    }

    // Clamp and write; on failure fall back to a best-effort neutral command.
    fn write_output(&mut self, command: f64) -> f64 {
        let command = if command.is_finite() {
            command.clamp(-1.0, 1.0)
        } else {
            warn!(motor = Motor::id(&self.hardware), command, target_angle = self.target_angle, "non-finite pivot command; output forced to 0");
            0.0
        };
        match self.hardware.set_output(command) {
            Ok(()) => command,
            Err(e) => {
                warn!(motor = Motor::id(&self.hardware), error = %e, command, "pivot motor write failed; output forced to 0");
                let _ = self.hardware.set_output(0.0);
                0.0
            }
        }
    }

    pub fn mode(&self) -> PivotMode {
        self.mode
    }

    pub fn target_angle(&self) -> f64 {
        self.target_angle
    }

    pub fn encoder_position(&self) -> f64 {
        self.encoder_position
    }

    pub fn motor_output(&self) -> f64 {
        self.motor_output
    }

    pub fn gains(&self) -> PivotGains {
        self.pdf.gains()
    }

    pub fn hardware(&self) -> &H {
        &self.hardware
    }

    pub fn hardware_mut(&mut self) -> &mut H {
        &mut self.hardware
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crescendo_hal::sim::SimPivot;

    const TICK: Duration = Duration::from_millis(20);

    fn pivot(gains: PivotGains) -> PivotController<SimPivot> {
        PivotController::new(SimPivot::new("pivot", 10.0), gains, TICK).unwrap()
    }

    #[test]
    fn negative_gain_fails_at_construction() {
        let result = PivotController::new(
            SimPivot::new("pivot", 10.0),
            PivotGains::new(-1.0, 0.0, 0.0),
            TICK,
        );
        assert!(matches!(
            result,
            Err(CrescendoError::InvalidGain { name: "kP", value }) if value == -1.0
        ));
    }

    #[test]
    fn zero_tick_period_is_rejected() {
        let result = PivotController::new(
            SimPivot::new("pivot", 10.0),
            PivotGains::new(0.04, 0.0, 0.0),
            Duration::ZERO,
        );
        assert!(matches!(result, Err(CrescendoError::Config(_))));
    }

    #[test]
    fn set_angle_has_no_motor_side_effect() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0, 0.0));
        assert_eq!(pivot.mode(), PivotMode::Idle);
        pivot.set_angle(30.0);
        assert_eq!(pivot.mode(), PivotMode::TargetSet);
        assert_eq!(pivot.target_angle(), 30.0);
        assert_eq!(pivot.hardware().writes(), 0);
    }

    #[test]
    fn mode_follows_command_lifecycle() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0, 0.0));
        pivot.set_angle(15.0);
        pivot.hold_angle();
        assert_eq!(pivot.mode(), PivotMode::Holding);
        pivot.hold_angle();
        assert_eq!(pivot.mode(), PivotMode::Holding);
        pivot.disable();
        assert_eq!(pivot.mode(), PivotMode::Idle);
        assert_eq!(pivot.hardware().commanded_output(), 0.0);
    }

    #[test]
    fn idle_hold_writes_neutral_output() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0, 0.3));
        assert_eq!(pivot.hold_angle(), 0.0);
        assert_eq!(pivot.mode(), PivotMode::Idle);
    }

    #[test]
    fn hold_computes_pdf_command() {
        let mut pivot = pivot(PivotGains::new(0.01, 0.0, 0.05));
        pivot.set_angle(20.0);
        // error 20 → 0.01 * 20 + 0.05 = 0.25
        let output = pivot.hold_angle();
        assert!((output - 0.25).abs() < 1e-9);
        assert!((pivot.hardware().commanded_output() - 0.25).abs() < 1e-9);
    }

    #[test]
    fn converges_monotonically_on_linear_plant() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0005, 0.0));
        pivot.set_angle(30.0);

        let mut previous = pivot.hardware().true_position_degrees();
        for _ in 0..100 {
            pivot.periodic();
            let output = pivot.hold_angle();
            assert!((-1.0..=1.0).contains(&output));
            pivot.hardware_mut().step();

            let position = pivot.hardware().true_position_degrees();
            assert!(position >= previous - 1e-9, "moved away: {previous} -> {position}");
            assert!(position <= 30.0 + 1e-9, "overshot: {position}");
            previous = position;
        }
        assert!((previous - 30.0).abs() < 0.01);
    }

    #[test]
    fn periodic_refreshes_telemetry_without_command() {
        let mut pivot = PivotController::new(
            SimPivot::new("pivot", 10.0).with_position(12.5),
            PivotGains::new(0.04, 0.0, 0.0),
            TICK,
        )
        .unwrap();
        pivot.periodic();
        assert!((pivot.encoder_position() - 12.5).abs() < 1e-6);
        assert_eq!(pivot.motor_output(), 0.0);
        assert_eq!(pivot.mode(), PivotMode::Idle);
    }

    #[test]
    fn encoder_fault_forces_zero_output_for_that_tick() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0, 0.1));
        pivot.set_angle(30.0);
        pivot.hardware_mut().fail_encoder_reads(1);
        assert_eq!(pivot.hold_angle(), 0.0);
        assert_eq!(pivot.hardware().commanded_output(), 0.0);
        // Next tick recovers.
        assert!(pivot.hold_angle() > 0.0);
    }

    #[test]
    fn motor_write_fault_reports_zero() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0, 0.0));
        pivot.set_angle(30.0);
        pivot.hardware_mut().fail_motor_calls(1);
        assert_eq!(pivot.hold_angle(), 0.0);
        // The fallback neutral write went through.
        assert_eq!(pivot.hardware().commanded_output(), 0.0);
        assert_eq!(pivot.hardware().writes(), 1);
    }

    #[test]
    fn non_finite_set_point_writes_neutral_output() {
        for target in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let mut pivot = pivot(PivotGains::new(0.04, 0.0005, 0.1));
            pivot.set_angle(target);
            for _ in 0..3 {
                let output = pivot.hold_angle();
                assert_eq!(output, 0.0, "set-point {target}");
                pivot.periodic();
                assert_eq!(pivot.motor_output(), 0.0);
                assert_eq!(pivot.hardware().commanded_output(), 0.0);
                pivot.hardware_mut().step();
            }
        }
    }

    #[test]
    fn periodic_survives_read_faults() {
        let mut pivot = pivot(PivotGains::new(0.04, 0.0, 0.0));
        pivot.set_angle(30.0);
        pivot.hold_angle();
        pivot.periodic();
        let last_position = pivot.encoder_position();

        pivot.hardware_mut().fail_encoder_reads(1);
        pivot.hardware_mut().fail_motor_calls(1);
        pivot.periodic();
        assert_eq!(pivot.encoder_position(), last_position);
        assert_eq!(pivot.motor_output(), 0.0);
    }
}
