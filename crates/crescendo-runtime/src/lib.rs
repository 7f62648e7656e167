//! `crescendo-runtime` – subsystems and the per-tick loop body
//!
//! Everything the periodic scheduler calls into lives here.
//!
//! # Modules
//!
//! - [`pivot`] – [`PivotController`][pivot::PivotController]: set-point
//!   storage and the PDF hold loop for the shooter pivot, with fault
//!   degradation to a neutral output.
//! - [`roller`] – [`RollerSubsystem`][roller::RollerSubsystem]: duty-cycle
//!   intake and shooter rollers.
//! - [`robot`] – [`Robot`][robot::Robot]: one tick of vision ranging, pose
//!   gating and pivot control, producing a
//!   [`TelemetryFrame`][crescendo_types::TelemetryFrame].
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing] and
//!   [`publish`][telemetry::publish]: structured logging with an optional
//!   OTLP exporter, and the per-tick dashboard event.

pub mod pivot;
pub mod robot;
pub mod roller;
pub mod telemetry;

pub use pivot::{PivotController, PivotMode};
pub use robot::{Robot, TickReport};
pub use roller::RollerSubsystem;
pub use telemetry::{TracerProviderGuard, init_tracing, publish};
