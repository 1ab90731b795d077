//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const CONFIG_FILE: &str = "config.ron";

/// Top-level game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub window: WindowConfig,
    pub render: RenderConfig,
    pub camera: CameraConfig,
    pub terrain: TerrainConfig,
    pub sun: SunConfig,
    pub debug: DebugConfig,
}

/// Window configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct WindowConfig {
    /// Window width in logical pixels.
    pub width: u32,
    /// Window height in logical pixels.
    pub height: u32,
    pub fullscreen: bool,
    /// Enable vsync (PresentMode::Fifo).
    pub vsync: bool,
    pub title: String,
}

/// Rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RenderConfig {
    /// Draw the sun surface as a wireframe.
    pub wireframe: bool,
    /// Linear RGBA clear colour.
    pub clear_color: [f64; 4],
    /// Direction the light travels, world space. Need not be normalised.
    pub light_direction: [f32; 3],
    /// Ambient light intensity (0.0 - 1.0).
    pub ambient: f32,
}

/// Camera configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    /// Fraction of the remaining distance covered per tick (0.0 - 1.0].
    pub follow_speed: f32,
    /// Desired camera position relative to the sun.
    pub offset: [f32; 3],
    /// Orbit step per tick while an arrow key is held, in degrees.
    pub orbit_step_degrees: f32,
}

/// Which bump kernel shapes the terrain.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
pub enum TerrainKernel {
    #[default]
    Arctangent,
    PotentialField,
    Paraboloid,
}

/// Terrain generation configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TerrainConfig {
    /// Fixed RNG seed. `None` picks a new one each run.
    pub seed: Option<u64>,
    pub kernel: TerrainKernel,
    /// Override the kernel's default bump count.
    pub bump_count: Option<usize>,
}

/// Sun entity configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SunConfig {
    pub mass: f32,
    pub position: [f32; 3],
    /// Radiated power for the inverse-square heat model. `None` disables
    /// heat emission entirely.
    pub heat_power: Option<f32>,
    /// First material layer, shown on steep slopes.
    pub rock_texture: PathBuf,
    /// Second material layer, shown on flat ground.
    pub grass_texture: PathBuf,
}

/// Debug/development configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log filter (e.g. "debug", "info,solaria_render=trace").
    pub log_level: String,
    /// Also write JSON logs to the log directory.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width: 1280,
            height: 720,
            fullscreen: false,
            vsync: true,
            title: "Solaria".to_string(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            wireframe: true,
            clear_color: [0.01, 0.01, 0.03, 1.0],
            light_direction: [-0.4, -1.0, -0.3],
            ambient: 0.25,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            near: 0.1,
            far: 10_000.0,
            follow_speed: 0.05,
            offset: [0.0, 150.0, -400.0],
            orbit_step_degrees: 1.0,
        }
    }
}

impl Default for SunConfig {
    fn default() -> Self {
        Self {
            mass: 1000.0,
            position: [0.0, 0.0, 0.0],
            heat_power: None,
            rock_texture: PathBuf::from("data/Rocas.bmp"),
            grass_texture: PathBuf::from("data/Hierba.bmp"),
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: cfg!(debug_assertions),
        }
    }
}

// --- Load / Save / Reload ---

/// Whether [`Config::open`] read an existing file or wrote a fresh default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigOrigin {
    Loaded,
    Created,
}

impl std::fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Loaded => f.write_str("Loaded"),
            Self::Created => f.write_str("Created default"),
        }
    }
}

impl Config {
    /// Path of the config file inside `config_dir`.
    pub fn path_in(config_dir: &Path) -> PathBuf {
        config_dir.join(CONFIG_FILE)
    }

    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let (config, origin) = Self::open(config_dir)?;
        log::info!("{origin} config at {}", Self::path_in(config_dir).display());
        Ok(config)
    }

    /// Like [`Config::load_or_create`], but reports where the config came from
    /// instead of logging it. For callers that set up logging afterwards.
    pub fn open(config_dir: &Path) -> Result<(Self, ConfigOrigin), ConfigError> {
        let config_path = Self::path_in(config_dir);

        if config_path.exists() {
            Ok((Self::read(&config_path)?, ConfigOrigin::Loaded))
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            Ok((config, ConfigOrigin::Created))
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(Self::path_in(config_dir), serialized).map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let new_config = Self::read(&Self::path_in(config_dir))?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        ron::from_str(&contents).map_err(ConfigError::ParseError)
    }
}
