//! Generic `Encoder` trait and the count-to-degree conversion used by
//! quadrature encoders.

use crescendo_types::CrescendoError;

/// A position sensor whose reading is already scaled into degrees.
pub trait Encoder: Send + Sync {
    /// Stable identifier for this encoder, e.g. `"pivot_encoder"`.
    fn id(&self) -> &str;

    /// Return the current mechanism angle in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::HardwareFault`] if the sensor cannot be read.
    fn position_degrees(&mut self) -> Result<f64, CrescendoError>;
}

/// Conversion between raw encoder counts and mechanism degrees.
///
/// `degrees_per_revolution` is the mechanism travel for one full encoder
/// revolution, so a gear reduction between encoder and pivot is folded in
/// here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EncoderScale {
    counts_per_revolution: f64,
    degrees_per_revolution: f64,
}

impl EncoderScale {
    /// Counts per revolution of the through-bore quadrature encoder.
    pub const QUADRATURE_8192: f64 = 8192.0;

    /// Build a scale.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::Config`] unless both values are finite and
    /// strictly positive.
    pub fn new(counts_per_revolution: f64, degrees_per_revolution: f64) -> Result<Self, CrescendoError> {
        if !(counts_per_revolution.is_finite() && counts_per_revolution > 0.0) {
            return Err(CrescendoError::Config(format!(
                "counts_per_revolution must be > 0, got {counts_per_revolution}"
            )));
        }
        if !(degrees_per_revolution.is_finite() && degrees_per_revolution > 0.0) {
            return Err(CrescendoError::Config(format!(
                "degrees_per_revolution must be > 0, got {degrees_per_revolution}"
            )));
        }
        Ok(Self {
            counts_per_revolution,
            degrees_per_revolution,
        })
    }

    /// Position conversion factor in degrees per count.
    pub fn degrees_per_count(&self) -> f64 {
        self.degrees_per_revolution / self.counts_per_revolution
    }

    pub fn counts_to_degrees(&self, counts: f64) -> f64 {
        counts * self.degrees_per_count()
    }

    pub fn degrees_to_counts(&self, degrees: f64) -> f64 {
        degrees / self.degrees_per_count()
    }
}

impl Default for EncoderScale {
    /// One encoder revolution per pivot revolution.
    fn default() -> Self {
        Self {
            counts_per_revolution: Self::QUADRATURE_8192,
            degrees_per_revolution: 360.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scale_maps_one_revolution_to_360_degrees() {
        let scale = EncoderScale::default();
        assert!((scale.counts_to_degrees(8192.0) - 360.0).abs() < 1e-9);
        assert!((scale.counts_to_degrees(2048.0) - 90.0).abs() < 1e-9);
    }

    #[test]
    fn gear_reduction_folds_into_degrees_per_revolution() {
        // 4:1 reduction between encoder shaft and pivot.
        let scale = EncoderScale::new(8192.0, 90.0).unwrap();
        assert!((scale.counts_to_degrees(8192.0) - 90.0).abs() < 1e-9);
        assert!((scale.degrees_to_counts(45.0) - 4096.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_scale_is_rejected() {
        assert!(matches!(
            EncoderScale::new(0.0, 360.0),
            Err(CrescendoError::Config(_))
        ));
        assert!(matches!(
            EncoderScale::new(8192.0, -360.0),
            Err(CrescendoError::Config(_))
        ));
        assert!(EncoderScale::new(f64::NAN, 360.0).is_err());
    }
}
