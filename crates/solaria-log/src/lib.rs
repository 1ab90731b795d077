//! Structured logging for Solaria.
//!
//! Console output with uptime timestamps and module paths, plus an optional
//! JSON log file for post-mortem analysis. The filter comes from `RUST_LOG`
//! when set, otherwise from the config's `debug.log_level`.

use std::fs::File;
use std::path::{Path, PathBuf};

use solaria_config::Config;
use tracing::Subscriber;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when neither `RUST_LOG` nor the config specify one.
pub const DEFAULT_FILTER: &str = "info,wgpu=warn,naga=warn";

/// Name of the JSON log file written inside the log directory.
pub const LOG_FILE_NAME: &str = "solaria.log";

/// Initialize the global tracing subscriber.
///
/// Returns the path of the JSON log file when one was opened. File logging is
/// skipped silently if `log_dir` is `None`, the config disables it, or the
/// file cannot be created.
///
/// # Panics
///
/// Panics if a global subscriber has already been installed.
pub fn init_logging(log_dir: Option<&Path>, config: Option<&Config>) -> Option<PathBuf> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    let console_layer = fmt::layer()
        .with_target(true)
        .with_thread_names(true)
        .with_level(true)
        .with_timer(fmt::time::uptime());

    let subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer);

    let wants_file = config.is_none_or(|c| c.debug.log_to_file);
    if wants_file
        && let Some(log_dir) = log_dir
        && std::fs::create_dir_all(log_dir).is_ok()
        && let Ok(log_file) = File::create(log_dir.join(LOG_FILE_NAME))
    {
        subscriber.with(json_file_layer(log_file)).init();
        return Some(log_dir.join(LOG_FILE_NAME));
    }

    subscriber.init();
    None
}

/// The filter string derived from the config, falling back to
/// [`DEFAULT_FILTER`] when unset or blank.
pub fn filter_directive(config: Option<&Config>) -> String {
    match config {
        Some(config) if !config.debug.log_level.trim().is_empty() => {
            let level = config.debug.log_level.trim();
            // A bare level keeps the GPU stack quiet; explicit directives win.
            if level.contains('=') || level.contains(',') {
                level.to_string()
            } else {
                format!("{level},wgpu=warn,naga=warn")
            }
        }
        _ => DEFAULT_FILTER.to_string(),
    }
}

/// Machine-readable JSON layer without ANSI colour codes.
pub fn json_file_layer<S>(file: File) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_timer(fmt::time::uptime())
        .json()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_without_config() {
        let directive = filter_directive(None);
        assert_eq!(directive, DEFAULT_FILTER);
        assert!(EnvFilter::try_new(&directive).is_ok());
    }

    #[test]
    fn test_bare_level_keeps_gpu_quiet() {
        let mut config = Config::default();
        config.debug.log_level = "debug".to_string();
        assert_eq!(filter_directive(Some(&config)), "debug,wgpu=warn,naga=warn");
    }

    #[test]
    fn test_explicit_directives_pass_through() {
        let mut config = Config::default();
        config.debug.log_level = "warn,solaria_terrain=trace".to_string();
        assert_eq!(
            filter_directive(Some(&config)),
            "warn,solaria_terrain=trace"
        );
    }

    #[test]
    fn test_blank_level_falls_back() {
        let mut config = Config::default();
        config.debug.log_level = "   ".to_string();
        assert_eq!(filter_directive(Some(&config)), DEFAULT_FILTER);
    }

    #[test]
    fn test_filter_directives_parse() {
        for level in ["info", "debug,solaria_render=trace", "error", "trace"] {
            let mut config = Config::default();
            config.debug.log_level = level.to_string();
            let directive = filter_directive(Some(&config));
            assert!(
                EnvFilter::try_new(&directive).is_ok(),
                "failed to parse {directive}"
            );
        }
    }

    #[test]
    fn test_json_file_layer_writes_structured_events() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOG_FILE_NAME);
        let file = File::create(&path).unwrap();

        let subscriber = tracing_subscriber::registry().with(json_file_layer(file));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(seed = 42u64, "terrain generated");
        });

        let contents = std::fs::read_to_string(&path).unwrap();
        let line = contents.lines().next().expect("one log line");
        let event: serde_json::Value = serde_json::from_str(line).unwrap();
        assert_eq!(event["level"], "INFO");
        assert_eq!(event["fields"]["message"], "terrain generated");
        assert_eq!(event["fields"]["seed"], 42);
        assert!(event["target"].as_str().unwrap().starts_with("solaria_log"));
    }
}
