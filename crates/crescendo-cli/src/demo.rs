//! Simulated robot wiring for running the control loop on a workstation.

use std::time::Duration;

use crescendo_hal::EncoderScale;
use crescendo_hal::sim::{SimCamera, SimPivot, SimPoseEstimator};
use crescendo_runtime::{PivotController, Robot};
use crescendo_types::{CrescendoError, FieldTagPose, PivotGains, PoseEstimate};
use crescendo_vision::{CameraMount, FieldLayout, VisionRangefinder};

use crate::config::Config;

pub type SimRobot = Robot<SimCamera, SimPoseEstimator, SimPivot>;

/// Pitch at which a camera on `mount` sees a tag `distance_meters` away.
pub fn observed_pitch_degrees(distance_meters: f64, tag_height_meters: f64, mount: CameraMount) -> f64 {
    (tag_height_meters - mount.height_meters)
        .atan2(distance_meters)
        .to_degrees()
        - mount.pitch_radians.to_degrees()
}

/// Robot pose `distance_meters` in front of `tag`, facing it.
fn pose_facing(tag: &FieldTagPose, distance_meters: f64) -> PoseEstimate {
    let yaw = tag.yaw_degrees.to_radians();
    PoseEstimate {
        x_meters: tag.x_meters + distance_meters * yaw.cos(),
        y_meters: tag.y_meters + distance_meters * yaw.sin(),
        heading_radians: (yaw + std::f64::consts::PI).rem_euclid(std::f64::consts::TAU),
        timestamp_seconds: 0.0,
        tags_used: vec![tag.id],
    }
}

/// Load the field layout named by `cfg`, or the built-in one.
pub fn load_layout(cfg: &Config) -> Result<FieldLayout, CrescendoError> {
    match &cfg.field_layout {
        Some(path) => FieldLayout::from_path(path),
        None => FieldLayout::crescendo_2024(),
    }
}

/// Build a fully simulated robot from `cfg`.
///
/// # Errors
///
/// Any configuration problem: unreadable layout, unknown target tag, bad
/// camera mount, bad encoder scale, invalid gains or a zero period.
pub fn build_robot(cfg: &Config) -> Result<SimRobot, CrescendoError> {
    let layout = load_layout(cfg)?;
    let mount = CameraMount::from_degrees(cfg.camera.height_meters, cfg.camera.pitch_degrees)?;
    let tick = Duration::from_millis(cfg.tick_period_ms);
    if cfg.sim.frame_period_ms == 0 {
        return Err(CrescendoError::Config(
            "sim.frame_period_ms must be non-zero".to_string(),
        ));
    }

    let tag = *layout
        .tag_pose(cfg.sim.target_fiducial)
        .ok_or(CrescendoError::UnknownFiducial(cfg.sim.target_fiducial))?;
    let camera = SimCamera::streaming(
        cfg.camera.name.clone(),
        tag.id,
        observed_pitch_degrees(cfg.sim.distance_meters, tag.z_meters, mount),
        Duration::from_millis(cfg.sim.frame_period_ms).as_secs_f64(),
        tick.as_secs_f64(),
    );
    let estimator = SimPoseEstimator::new(Some(pose_facing(&tag, cfg.sim.distance_meters)));

    let scale = EncoderScale::new(cfg.pivot.counts_per_revolution, cfg.pivot.degrees_per_revolution)?;
    let plant = SimPivot::new("pivot", cfg.sim.degrees_per_tick).with_scale(scale);
    let gains = PivotGains::new(cfg.pivot.kp, cfg.pivot.kd, cfg.pivot.kf);
    let pivot = PivotController::new(plant, gains, tick)?;

    Ok(Robot::new(
        VisionRangefinder::new(camera, estimator, layout, mount),
        pivot,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_range_matches_configured_distance() {
        let cfg = Config::default();
        let mut robot = build_robot(&cfg).unwrap();
        let report = robot.tick();
        assert!(report.observation.has_target);
        assert!((report.range.distance_meters - cfg.sim.distance_meters).abs() < 1e-9);
        assert_eq!(robot.vision().layout().len(), 16);
    }

    #[test]
    fn invalid_gain_fails_startup() {
        let mut cfg = Config::default();
        cfg.pivot.kp = -1.0;
        assert!(matches!(
            build_robot(&cfg),
            Err(CrescendoError::InvalidGain { name: "kP", .. })
        ));
    }

    #[test]
    fn unknown_target_tag_fails_startup() {
        let mut cfg = Config::default();
        cfg.sim.target_fiducial = 40;
        assert!(matches!(
            build_robot(&cfg),
            Err(CrescendoError::UnknownFiducial(40))
        ));
    }

    #[test]
    fn zero_tick_period_fails_startup() {
        let mut cfg = Config::default();
        cfg.tick_period_ms = 0;
        assert!(matches!(build_robot(&cfg), Err(CrescendoError::Config(_))));
    }

    #[test]
    fn pose_faces_the_tag() {
        let layout = FieldLayout::crescendo_2024().unwrap();
        let tag = layout.tag_pose(7).unwrap();
        let pose = pose_facing(tag, 2.0);
        assert!((pose.x_meters - (tag.x_meters + 2.0)).abs() < 1e-9);
        assert!((pose.y_meters - tag.y_meters).abs() < 1e-9);
        assert!((pose.heading_radians - std::f64::consts::PI).abs() < 1e-9);
    }
}
