//! Configuration for Solaria.
//!
//! Settings persist to disk as `config.ron`, every section falls back to its
//! defaults when missing, and command-line flags override what was loaded.

mod cli;
mod config;
mod error;
mod paths;

pub use cli::CliArgs;
pub use config::{
    CameraConfig, Config, ConfigOrigin, DebugConfig, RenderConfig, SunConfig, TerrainConfig,
    TerrainKernel, WindowConfig,
};
pub use error::ConfigError;
pub use paths::AppDirs;
