//! `crescendo-vision` – fiducial ranging
//!
//! Turns the camera's best fiducial detection into a slant range to the
//! target, and decides when the pose estimator has produced something new.
//!
//! # Modules
//!
//! - [`field_layout`] – [`FieldLayout`][field_layout::FieldLayout]: the
//!   surveyed pose of every fiducial tag on the field, loaded once at startup.
//! - [`gate`] – [`VisionGate`][gate::VisionGate]: timestamp staleness gate
//!   that drops repeated camera frames.
//! - [`rangefinder`] – [`VisionRangefinder`][rangefinder::VisionRangefinder]:
//!   polls the camera, looks up tag heights, computes range and runs the pose
//!   estimator through the gate.

pub mod field_layout;
pub mod gate;
pub mod rangefinder;

pub use field_layout::{FieldDimensions, FieldLayout};
pub use gate::VisionGate;
pub use rangefinder::{CameraMount, VisionRangefinder, slant_range};
