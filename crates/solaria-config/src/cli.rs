//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;

use crate::{Config, TerrainKernel};

/// Solaria command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "solaria", about = "A small procedural sun flyby")]
pub struct CliArgs {
    /// Window width.
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height.
    #[arg(long)]
    pub height: Option<u32>,

    /// Terrain RNG seed (random when omitted).
    #[arg(long)]
    pub seed: Option<u64>,

    /// Bump kernel used to shape the terrain.
    #[arg(long, value_enum)]
    pub kernel: Option<TerrainKernel>,

    /// Draw the sun as a wireframe (true/false).
    #[arg(long)]
    pub wireframe: Option<bool>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(w) = args.width {
            self.window.width = w;
        }
        if let Some(h) = args.height {
            self.window.height = h;
        }
        if let Some(seed) = args.seed {
            self.terrain.seed = Some(seed);
        }
        if let Some(kernel) = args.kernel {
            self.terrain.kernel = kernel;
        }
        if let Some(wireframe) = args.wireframe {
            self.render.wireframe = wireframe;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override() {
        let mut config = Config::default();
        let args = CliArgs {
            width: Some(1920),
            seed: Some(99),
            kernel: Some(TerrainKernel::PotentialField),
            wireframe: Some(false),
            ..CliArgs::default()
        };
        config.apply_cli_overrides(&args);
        assert_eq!(config.window.width, 1920);
        assert_eq!(config.terrain.seed, Some(99));
        assert_eq!(config.terrain.kernel, TerrainKernel::PotentialField);
        assert!(!config.render.wireframe);
        // Non-overridden fields retain defaults
        assert_eq!(config.window.height, 720);
        assert_eq!(config.debug.log_level, "info");
    }

    #[test]
    fn test_cli_no_override() {
        let original = Config::default();
        let mut config = Config::default();
        config.apply_cli_overrides(&CliArgs::default());
        assert_eq!(config, original);
    }

    #[test]
    fn test_parse_flags() {
        let args = CliArgs::try_parse_from([
            "solaria",
            "--seed",
            "7",
            "--kernel",
            "paraboloid",
            "--wireframe",
            "false",
            "--log-level",
            "debug",
            "--config",
            "/tmp/solaria",
        ])
        .unwrap();
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.kernel, Some(TerrainKernel::Paraboloid));
        assert_eq!(args.wireframe, Some(false));
        assert_eq!(args.log_level.as_deref(), Some("debug"));
        assert_eq!(args.config, Some(PathBuf::from("/tmp/solaria")));
    }

    #[test]
    fn test_kernel_value_names() {
        let args = CliArgs::try_parse_from(["solaria", "--kernel", "potential-field"]).unwrap();
        assert_eq!(args.kernel, Some(TerrainKernel::PotentialField));
        assert!(CliArgs::try_parse_from(["solaria", "--kernel", "noise"]).is_err());
    }
}
