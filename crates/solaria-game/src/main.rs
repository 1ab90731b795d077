//! Solaria binary: parse arguments, load config, start logging, run.
//!
//! Run with: `cargo run -p solaria-game`

use clap::Parser;
use solaria_config::{AppDirs, CliArgs, Config};
use tracing::{error, info, warn};

fn main() {
    let args = CliArgs::parse();

    let dirs = match &args.config {
        Some(dir) => AppDirs::from_config_dir(dir),
        None => match AppDirs::resolve() {
            Ok(dirs) => dirs,
            Err(e) => {
                eprintln!("solaria: {e}");
                std::process::exit(1);
            }
        },
    };

    // A broken config file should not stop the game; report it once logging is up.
    let (mut config, loaded) = match Config::open(&dirs.config_dir) {
        Ok((config, origin)) => (config, Ok(origin)),
        Err(e) => (Config::default(), Err(e)),
    };
    config.apply_cli_overrides(&args);

    let log_file = solaria_log::init_logging(Some(&dirs.log_dir), Some(&config));

    info!("Solaria v{}", env!("CARGO_PKG_VERSION"));
    match loaded {
        Ok(origin) => info!(
            "{origin} config at {}",
            Config::path_in(&dirs.config_dir).display()
        ),
        Err(e) => warn!(
            "Could not load config from {}: {e}. Using defaults",
            dirs.config_dir.display()
        ),
    }
    if let Some(path) = log_file {
        info!("Writing JSON log to {}", path.display());
    }
    info!(
        "Window: {}x{} | Kernel: {:?} | Seed: {}",
        config.window.width,
        config.window.height,
        config.terrain.kernel,
        config
            .terrain
            .seed
            .map_or_else(|| "random".to_string(), |s| s.to_string()),
    );

    if let Err(e) = solaria_game::run(config) {
        error!("Solaria exited with an error: {e}");
        std::process::exit(1);
    }
}
