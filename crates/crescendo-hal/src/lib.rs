//! `crescendo-hal` – Hardware Abstraction Layer
//!
//! Narrow capability traits that every vendor driver must implement, plus the
//! hardware-agnostic feedback law that turns a position error into a motor
//! command.
//!
//! # Modules
//!
//! - [`camera`] – [`Camera`][camera::Camera]: non-blocking poll of the latest
//!   cached vision result.
//! - [`encoder`] – [`Encoder`][encoder::Encoder] and
//!   [`EncoderScale`][encoder::EncoderScale]: position feedback already
//!   converted into degrees.
//! - [`motor`] – [`Motor`][motor::Motor]: duty-cycle output in `[-1, 1]` with
//!   applied-output read back.
//! - [`pose_estimator`] – [`PoseEstimator`][pose_estimator::PoseEstimator]:
//!   the vendor multi-tag solver, consumed as a black box.
//! - [`pid`] – [`PdfController`][pid::PdfController]: proportional /
//!   derivative / feedforward position loop with validated gains.
//! - [`sim`] – simulated drivers for running the stack without a robot.

pub mod camera;
pub mod encoder;
pub mod motor;
pub mod pid;
pub mod pose_estimator;
pub mod sim;

pub use camera::Camera;
pub use encoder::{Encoder, EncoderScale};
pub use motor::Motor;
pub use pid::PdfController;
pub use pose_estimator::PoseEstimator;
