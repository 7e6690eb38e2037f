//! Demo configuration
//!
//! # Configuration Sources (in priority order)
//!
//! 1. Environment overrides: `PICKBOX_FRAMES`, `PICKBOX_WIDTH`, `PICKBOX_HEIGHT`
//! 2. Config file: `--config <path>`, else `PICKBOX_CONFIG`, else `pickbox.toml`
//! 3. Built-in defaults
//!
//! # Example Config File
//!
//! ```toml
//! frames = 600
//!
//! [window]
//! width = 1024
//! height = 768
//!
//! [camera]
//! position = { x = 0.0, y = 10.0, z = 30.0 }
//! fov_degrees = 45.0
//!
//! [sensor]
//! monitored = 0
//! other = 1
//! skip_jointed = true
//!
//! [physics]
//! gravity = [0.0, -9.81, 0.0]
//! ```

use crate::error::{DemoError, Result};
use pickbox_math::Vec3;
use pickbox_physics::PhysicsConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when nothing else is given
pub const DEFAULT_CONFIG_FILE: &str = "pickbox.toml";

/// Window (viewport) size
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            title: "Pickbox".to_string(),
        }
    }
}

/// Camera rig settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Panning speed in units per second
    pub pan_speed: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 10.0, 30.0),
            fov_degrees: 45.0,
            near: 0.1,
            far: 100.0,
            pan_speed: 3.0,
        }
    }
}

/// Mouse picking settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickingConfig {
    /// Length of the picking segment
    pub max_ray_length: f32,
    pub include_sensors: bool,
    /// Whether the ground can be hit by the picking ray
    pub ground_pickable: bool,
}

impl Default for PickingConfig {
    fn default() -> Self {
        Self {
            max_ray_length: pickbox_math::DEFAULT_PICK_LENGTH,
            include_sensors: false,
            ground_pickable: true,
        }
    }
}

/// Contact sensor settings
///
/// Body indexes refer to the scene's body list: the ground first, then the
/// cubes in creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensorConfig {
    /// Body whose contacts are collected
    pub monitored: usize,
    /// Body tested against the monitored one
    pub other: usize,
    /// Named collision layer whose groups filter candidates
    pub layer: String,
    /// Ignore bodies joined to the monitored body with contacts disabled
    pub skip_jointed: bool,
    /// Report points separated by up to this distance
    pub distance_threshold: f32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            monitored: 0,
            other: 1,
            layer: "sensors".to_string(),
            skip_jointed: false,
            distance_threshold: 0.02,
        }
    }
}

/// Cube stack layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    /// Cubes along X, Y (layers) and Z
    pub stack: [u32; 3],
    pub cube_half_extent: f32,
    /// Center distance between neighbouring cubes
    pub spacing: f32,
    /// Gap between the ground and the lowest layer
    pub drop_height: f32,
    pub ground_half_extent: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            stack: [5, 5, 5],
            cube_half_extent: 1.0,
            spacing: 2.0,
            drop_height: 1.0,
            ground_half_extent: 50.0,
        }
    }
}

impl SceneConfig {
    pub fn cube_count(&self) -> usize {
        self.stack.iter().map(|&n| n as usize).product()
    }
}

/// Complete demo configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    /// Frames to run before exiting
    pub frames: u32,
    /// Simulated seconds per frame
    pub frame_dt: f32,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub picking: PickingConfig,
    pub sensor: SensorConfig,
    pub scene: SceneConfig,
    pub physics: PhysicsConfig,
    /// File this config was loaded from
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            frame_dt: 1.0 / 60.0,
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            picking: PickingConfig::default(),
            sensor: SensorConfig::default(),
            scene: SceneConfig::default(),
            physics: PhysicsConfig::default(),
            config_path: None,
        }
    }
}

impl DemoConfig {
    /// Load configuration from all sources
    pub fn load<I>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = String>,
    {
        let explicit = config_path_from_args(args).or_else(|| std::env::var_os("PICKBOX_CONFIG").map(PathBuf::from));

        let mut config = match explicit {
            Some(path) => Self::load_from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::load_from_file(Path::new(DEFAULT_CONFIG_FILE))?,
            None => {
                log::info!("No config file, using defaults");
                Self::default()
            }
        };

        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| DemoError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.config_path = Some(path.to_path_buf());
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply `PICKBOX_*` overrides read through `lookup`
    ///
    /// Unparsable values are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Option<u32> {
            let value = lookup(key)?;
            match value.trim().parse() {
                Ok(parsed) => {
                    log::info!("{key} from env: {parsed}");
                    Some(parsed)
                }
                Err(_) => {
                    log::warn!("Ignoring {key}={value:?}: not an unsigned integer");
                    None
                }
            }
        };

        if let Some(frames) = read("PICKBOX_FRAMES") {
            self.frames = frames;
        }
        if let Some(width) = read("PICKBOX_WIDTH") {
            self.window.width = width;
        }
        if let Some(height) = read("PICKBOX_HEIGHT") {
            self.window.height = height;
        }
    }

    /// Reject settings the demo cannot run with
    pub fn validate(&self) -> Result<()> {
        let invalid = |msg: String| Err(DemoError::InvalidConfig(msg));

        if self.window.width == 0 || self.window.height == 0 {
            return invalid(format!(
                "viewport must be non-empty, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        let camera = &self.camera;
        if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
            return invalid(format!("fov_degrees must be in (0, 180), got {}", camera.fov_degrees));
        }
        if !(camera.near > 0.0 && camera.far > camera.near && camera.far.is_finite()) {
            return invalid(format!(
                "clip planes must satisfy 0 < near < far, got near={} far={}",
                camera.near, camera.far
            ));
        }
        if !(self.picking.max_ray_length.is_finite() && self.picking.max_ray_length > 0.0) {
            return invalid(format!(
                "max_ray_length must be positive, got {}",
                self.picking.max_ray_length
            ));
        }
        if !(self.frame_dt.is_finite() && self.frame_dt >= 0.0) {
            return invalid(format!("frame_dt must be non-negative, got {}", self.frame_dt));
        }
        let scene = &self.scene;
        if !(scene.cube_half_extent > 0.0 && scene.ground_half_extent > 0.0) {
            return invalid("cube and ground half extents must be positive".to_string());
        }
        if scene.spacing < scene.cube_half_extent * 2.0 {
            return invalid(format!(
                "spacing {} would overlap cubes of half extent {}",
                scene.spacing, scene.cube_half_extent
            ));
        }
        if !(self.sensor.distance_threshold.is_finite() && self.sensor.distance_threshold >= 0.0) {
            return invalid(format!(
                "sensor distance_threshold must be non-negative, got {}",
                self.sensor.distance_threshold
            ));
        }
        if self.sensor.monitored == self.sensor.other {
            return invalid("sensor needs two distinct bodies".to_string());
        }

        self.physics.validate()?;
        Ok(())
    }

    /// Log the effective configuration
    pub fn print_summary(&self) {
        log::info!(
            "Viewport {}x{}, {} frames at {:.4}s",
            self.window.width,
            self.window.height,
            self.frames,
            self.frame_dt
        );
        log::info!(
            "Stack {:?} of half extent {}, sensor {} vs {}",
            self.scene.stack,
            self.scene.cube_half_extent,
            self.sensor.monitored,
            self.sensor.other
        );
        if let Some(path) = &self.config_path {
            log::debug!("Config file: {}", path.display());
        }
    }
}

/// Value of `--config <path>` or `--config=<path>`
fn config_path_from_args<I>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
