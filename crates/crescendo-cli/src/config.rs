//! Robot configuration – reads/writes `~/.crescendo/config.toml`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crescendo_types::CrescendoError;

/// Persisted robot configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Control loop period in milliseconds.
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,

    /// Stop after this many ticks; run until Ctrl-C when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_ticks: Option<u64>,

    /// JSON field layout replacing the built-in 2024 layout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_layout: Option<PathBuf>,

    #[serde(default)]
    pub camera: CameraConfig,

    #[serde(default)]
    pub pivot: PivotConfig,

    #[serde(default)]
    pub sim: SimConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub name: String,
    pub height_meters: f64,
    /// Upward tilt from horizontal.
    pub pitch_degrees: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            name: "photonvision".to_string(),
            height_meters: 0.5,
            pitch_degrees: 15.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotConfig {
    pub kp: f64,
    pub kd: f64,
    pub kf: f64,
    pub counts_per_revolution: f64,
    /// Pivot travel per encoder revolution (360 / gear ratio).
    pub degrees_per_revolution: f64,
    /// Height of the pivot axle, used by the aiming strategy.
    pub height_meters: f64,
}

impl Default for PivotConfig {
    fn default() -> Self {
        Self {
            kp: 0.04,
            kd: 0.0005,
            kf: 0.0,
            counts_per_revolution: 8192.0,
            degrees_per_revolution: 360.0,
            height_meters: 0.3,
        }
    }
}

/// Parameters of the simulated field used by the demo loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Tag the simulated camera keeps seeing.
    pub target_fiducial: i32,
    /// Horizontal distance from the camera to that tag.
    pub distance_meters: f64,
    /// Camera frame period in milliseconds.
    pub frame_period_ms: u64,
    /// Pivot travel per tick at full output.
    pub degrees_per_tick: f64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            target_fiducial: 7,
            distance_meters: 3.0,
            frame_period_ms: 50,
            degrees_per_tick: 10.0,
        }
    }
}

fn default_tick_period_ms() -> u64 {
    20
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_period_ms: default_tick_period_ms(),
            run_ticks: None,
            field_layout: None,
            camera: CameraConfig::default(),
            pivot: PivotConfig::default(),
            sim: SimConfig::default(),
        }
    }
}

/// Return `$CRESCENDO_CONFIG`, or `~/.crescendo/config.toml`.
pub fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("CRESCENDO_CONFIG") {
        return PathBuf::from(p);
    }
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".crescendo").join("config.toml")
}

/// Load the config from disk and apply environment overrides.
/// Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, CrescendoError> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, CrescendoError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        CrescendoError::Config(format!("failed to read {}: {e}", path.display()))
    })?;
    let cfg: Config = toml::from_str(&raw)
        .map_err(|e| CrescendoError::Config(format!("failed to parse {}: {e}", path.display())))?;
    Ok(Some(cfg))
}

/// Apply `CRESCENDO_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `CRESCENDO_TICK_MS` | `tick_period_ms` |
/// | `CRESCENDO_RUN_TICKS` | `run_ticks` |
/// | `CRESCENDO_CAMERA_NAME` | `camera.name` |
///
/// Unparseable numbers are ignored.
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("CRESCENDO_TICK_MS")
        && let Ok(ms) = v.parse::<u64>()
    {
        cfg.tick_period_ms = ms;
    }
    if let Ok(v) = std::env::var("CRESCENDO_RUN_TICKS")
        && let Ok(ticks) = v.parse::<u64>()
    {
        cfg.run_ticks = Some(ticks);
    }
    if let Ok(v) = std::env::var("CRESCENDO_CAMERA_NAME") {
        cfg.camera.name = v;
    }
}

/// Save the config to disk, creating the parent directory if necessary.
pub fn save(cfg: &Config) -> Result<(), CrescendoError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), CrescendoError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            CrescendoError::Config(format!("failed to create {}: {e}", parent.display()))
        })?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| CrescendoError::Config(format!("failed to serialize config: {e}")))?;
    // Owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| f.write_all(raw.as_bytes()))
            .map_err(|e| {
                CrescendoError::Config(format!("failed to write {}: {e}", path.display()))
            })?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw).map_err(|e| {
        CrescendoError::Config(format!("failed to write {}: {e}", path.display()))
    })?;
    Ok(())
}
