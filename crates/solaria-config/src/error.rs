/// Errors that can occur when locating, loading, saving, or parsing
/// configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The OS exposes no per-user configuration directory.
    #[error("could not determine the OS configuration directory")]
    NoConfigDir,

    #[error("failed to read config: {0}")]
    ReadError(#[source] std::io::Error),

    #[error("failed to write config: {0}")]
    WriteError(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    ParseError(#[source] ron::error::SpannedError),

    #[error("failed to serialize config: {0}")]
    SerializeError(#[source] ron::Error),
}
