//! Aiming strategy: pivot angle that points the shooter at the target.

/// Angle, in degrees above horizontal, from the pivot axle to a target
/// `range_meters` away at `target_height_meters`.
///
/// Returns `None` without a usable range.
pub fn shot_angle_degrees(
    range_meters: f64,
    target_height_meters: f64,
    pivot_height_meters: f64,
) -> Option<f64> {
    if !range_meters.is_finite() || range_meters <= 0.0 {
        return None;
    }
    Some(
        (target_height_meters - pivot_height_meters)
            .atan2(range_meters)
            .to_degrees(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_rise_and_run_is_forty_five_degrees() {
        let angle = shot_angle_degrees(1.0, 1.3, 0.3).unwrap();
        assert!((angle - 45.0).abs() < 1e-9);
    }

    #[test]
    fn angle_flattens_with_distance() {
        let near = shot_angle_degrees(1.0, 2.0, 0.3).unwrap();
        let far = shot_angle_degrees(5.0, 2.0, 0.3).unwrap();
        assert!(far < near);
    }

    #[test]
    fn no_range_no_angle() {
        assert!(shot_angle_degrees(0.0, 2.0, 0.3).is_none());
        assert!(shot_angle_degrees(f64::NAN, 2.0, 0.3).is_none());
    }
}
