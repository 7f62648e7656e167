//! Field layout: where every fiducial tag sits on the field.
//!
//! The layout is read once at startup, either from the 2024 season dataset
//! compiled into the binary or from a JSON file in the same format
//! (`tags[].ID`, `tags[].pose.translation`, `tags[].pose.rotation.quaternion`,
//! `field.length`, `field.width`).
//!
//! # Example
//!
//! ```rust
//! use crescendo_vision::FieldLayout;
//!
//! let layout = FieldLayout::crescendo_2024().unwrap();
//! let speaker = layout.height_of(7).unwrap();
//! assert!((speaker - 1.451102).abs() < 1e-9);
//! assert!(layout.height_of(42).is_err());
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crescendo_types::{CrescendoError, FieldTagPose};

const CRESCENDO_2024_JSON: &str = include_str!("../data/2024-crescendo.json");

// ────────────────────────────────────────────────────────────────────────────
// On-disk format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct LayoutFile {
    tags: Vec<TagEntry>,
    field: FieldDimensions,
}

#[derive(Deserialize)]
struct TagEntry {
    #[serde(rename = "ID")]
    id: i32,
    pose: PoseEntry,
}

#[derive(Deserialize)]
struct PoseEntry {
    translation: Translation,
    rotation: Rotation,
}

#[derive(Deserialize)]
struct Translation {
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Deserialize)]
struct Rotation {
    quaternion: Quaternion,
}

#[derive(Deserialize)]
struct Quaternion {
    #[serde(rename = "W")]
    w: f64,
    #[serde(rename = "X")]
    x: f64,
    #[serde(rename = "Y")]
    y: f64,
    #[serde(rename = "Z")]
    z: f64,
}

impl Quaternion {
    /// Rotation about the vertical axis, normalised to `[0, 360)` degrees.
    fn yaw_degrees(&self) -> f64 {
        let siny_cosp = 2.0 * (self.w * self.z + self.x * self.y);
        let cosy_cosp = 1.0 - 2.0 * (self.y * self.y + self.z * self.z);
        siny_cosp.atan2(cosy_cosp).to_degrees().rem_euclid(360.0)
    }
}

/// Outer dimensions of the field, metres.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct FieldDimensions {
    #[serde(rename = "length")]
    pub length_meters: f64,
    #[serde(rename = "width")]
    pub width_meters: f64,
}

// ────────────────────────────────────────────────────────────────────────────
// FieldLayout
// ────────────────────────────────────────────────────────────────────────────

/// Immutable map from fiducial id to surveyed field pose.
#[derive(Debug, Clone)]
pub struct FieldLayout {
    tags: HashMap<i32, FieldTagPose>,
    field: FieldDimensions,
}

impl FieldLayout {
    /// The 2024 season layout compiled into the crate.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded dataset is corrupt.
    pub fn crescendo_2024() -> Result<Self, CrescendoError> {
        Self::from_json(CRESCENDO_2024_JSON)
    }

    /// Load a layout from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::FieldLayout`] if the file cannot be read or
    /// does not describe a valid layout.
    pub fn from_path(path: &Path) -> Result<Self, CrescendoError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CrescendoError::FieldLayout(format!("failed to read {}: {e}", path.display()))
        })?;
        let layout = Self::from_json(&raw)?;
        info!(path = %path.display(), tags = layout.len(), "loaded field layout");
        Ok(layout)
    }

    /// Parse a layout from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::FieldLayout`] on malformed JSON, duplicate
    /// tag ids, or non-finite coordinates.
    pub fn from_json(raw: &str) -> Result<Self, CrescendoError> {
        let file: LayoutFile = serde_json::from_str(raw)
            .map_err(|e| CrescendoError::FieldLayout(format!("failed to parse layout: {e}")))?;

        let mut tags = HashMap::with_capacity(file.tags.len());
        for entry in file.tags {
            let t = &entry.pose.translation;
            if !(t.x.is_finite() && t.y.is_finite() && t.z.is_finite()) {
                return Err(CrescendoError::FieldLayout(format!(
                    "tag {} has a non-finite translation",
                    entry.id
                )));
            }
            let pose = FieldTagPose {
                id: entry.id,
                x_meters: t.x,
                y_meters: t.y,
                z_meters: t.z,
                yaw_degrees: entry.pose.rotation.quaternion.yaw_degrees(),
            };
            if tags.insert(entry.id, pose).is_some() {
                return Err(CrescendoError::FieldLayout(format!(
                    "duplicate tag id {}",
                    entry.id
                )));
            }
        }

        Ok(Self {
            tags,
            field: file.field,
        })
    }

    /// Full pose of tag `id`, if it is on the field.
    pub fn tag_pose(&self, id: i32) -> Option<&FieldTagPose> {
        self.tags.get(&id)
    }

    /// Height of tag `id` above the carpet, metres.
    ///
    /// # Errors
    ///
    /// Returns [`CrescendoError::UnknownFiducial`] when the id is not part of
    /// the layout.
    pub fn height_of(&self, id: i32) -> Result<f64, CrescendoError> {
        self.tag_pose(id)
            .map(FieldTagPose::height_meters)
            .ok_or(CrescendoError::UnknownFiducial(id))
    }

    /// Tag ids in ascending order.
    pub fn ids(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.tags.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn field(&self) -> FieldDimensions {
        self.field
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_TAGS: &str = r#"{
        "tags": [
            { "ID": 1, "pose": { "translation": { "x": 1.0, "y": 2.0, "z": 0.5 },
              "rotation": { "quaternion": { "W": 1.0, "X": 0.0, "Y": 0.0, "Z": 0.0 } } } },
            { "ID": 2, "pose": { "translation": { "x": 3.0, "y": 4.0, "z": 1.25 },
              "rotation": { "quaternion": { "W": 0.0, "X": 0.0, "Y": 0.0, "Z": 1.0 } } } }
        ],
        "field": { "length": 10.0, "width": 5.0 }
    }"#;

    #[test]
    fn embedded_layout_has_sixteen_tags() {
        let layout = FieldLayout::crescendo_2024().unwrap();
        assert_eq!(layout.len(), 16);
        assert_eq!(layout.ids(), (1..=16).collect::<Vec<_>>());
        assert!((layout.field().length_meters - 16.541).abs() < 1e-9);
    }

    #[test]
    fn known_tag_height_is_exact() {
        let layout = FieldLayout::crescendo_2024().unwrap();
        assert_eq!(layout.height_of(4).unwrap(), 1.451102);
        assert_eq!(layout.height_of(11).unwrap(), 1.3208);
        assert_eq!(layout.height_of(1).unwrap(), 1.355852);
    }

    #[test]
    fn unknown_tag_is_a_lookup_error_every_time() {
        let layout = FieldLayout::crescendo_2024().unwrap();
        for _ in 0..3 {
            assert_eq!(
                layout.height_of(17),
                Err(CrescendoError::UnknownFiducial(17))
            );
        }
        assert!(layout.tag_pose(-1).is_none());
    }

    #[test]
    fn yaw_is_recovered_from_quaternion() {
        let layout = FieldLayout::crescendo_2024().unwrap();
        let yaw = |id| layout.tag_pose(id).unwrap().yaw_degrees;
        assert!((yaw(1) - 120.0).abs() < 1e-6);
        assert!((yaw(5) - 270.0).abs() < 1e-6);
        assert!(yaw(7).abs() < 1e-6);
    }

    #[test]
    fn parses_custom_layout() {
        let layout = FieldLayout::from_json(TWO_TAGS).unwrap();
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.height_of(2).unwrap(), 1.25);
        assert!((layout.tag_pose(2).unwrap().yaw_degrees - 180.0).abs() < 1e-6);
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let dup = TWO_TAGS.replace("\"ID\": 2", "\"ID\": 1");
        assert!(matches!(
            FieldLayout::from_json(&dup),
            Err(CrescendoError::FieldLayout(_))
        ));
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            FieldLayout::from_json("{ \"tags\": 3 }"),
            Err(CrescendoError::FieldLayout(_))
        ));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("layout.json");
        std::fs::write(&path, TWO_TAGS).expect("write");
        let layout = FieldLayout::from_path(&path).unwrap();
        assert_eq!(layout.height_of(1).unwrap(), 0.5);
    }

    #[test]
    fn missing_file_is_a_layout_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let result = FieldLayout::from_path(&dir.path().join("nope.json"));
        assert!(matches!(result, Err(CrescendoError::FieldLayout(_))));
    }
}
