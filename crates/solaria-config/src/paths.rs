//! Per-user directory resolution.

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

const APP_NAME: &str = "solaria";

/// Where Solaria keeps its configuration and log files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    /// Holds `config.ron`.
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

impl AppDirs {
    /// Resolve the OS-conventional directories without touching the disk.
    pub fn resolve() -> Result<Self, ConfigError> {
        let base = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::resolve_with_root(&base))
    }

    /// Resolve directories under a custom base path.
    pub fn resolve_with_root(root: &Path) -> Self {
        let app_dir = root.join(APP_NAME);
        Self {
            config_dir: app_dir.join("config"),
            log_dir: app_dir.join("logs"),
        }
    }

    /// Use `config_dir` as given, with logs in a sibling `logs` directory.
    pub fn from_config_dir(config_dir: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            log_dir: config_dir.join("logs"),
        }
    }

    /// Create every directory on disk.
    pub fn create_all(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.config_dir).map_err(ConfigError::WriteError)?;
        std::fs::create_dir_all(&self.log_dir).map_err(ConfigError::WriteError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_layout() {
        let dirs = AppDirs::resolve_with_root(Path::new("/tmp/base"));
        assert_eq!(dirs.config_dir, Path::new("/tmp/base/solaria/config"));
        assert_eq!(dirs.log_dir, Path::new("/tmp/base/solaria/logs"));
    }

    #[test]
    fn test_from_config_dir_puts_logs_inside() {
        let dirs = AppDirs::from_config_dir(Path::new("custom"));
        assert_eq!(dirs.config_dir, Path::new("custom"));
        assert_eq!(dirs.log_dir, Path::new("custom/logs"));
    }

    #[test]
    fn test_create_all() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = AppDirs::resolve_with_root(tmp.path());
        dirs.create_all().unwrap();
        assert!(dirs.config_dir.is_dir());
        assert!(dirs.log_dir.is_dir());
    }
}
