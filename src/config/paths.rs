//! Cross-platform application paths using the `dirs` crate.
//!
//! Config dir:
//!   Windows: %APPDATA%\algo-solver\
//!   macOS:   ~/Library/Application Support/algo-solver/
//!   Linux:   ~/.config/algo-solver/
//!
//! `ALGO_SOLVER_CONFIG` points at a settings file elsewhere.

use std::path::{Path, PathBuf};

/// Environment variable that overrides the settings file location.
pub const CONFIG_PATH_ENV: &str = "ALGO_SOLVER_CONFIG";

/// Resolved location of the settings file.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `settings_file`.
    pub config_dir: PathBuf,
    /// Full path to the TOML settings file.
    pub settings_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "algo-solver";

    /// Platform default: `<config dir>/algo-solver/settings.toml`.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        Self::for_settings_file(config_dir.join("settings.toml"))
    }

    /// Paths for an explicit settings file.
    pub fn for_settings_file(settings_file: impl Into<PathBuf>) -> Self {
        let settings_file = settings_file.into();
        let config_dir = settings_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            config_dir,
            settings_file,
        }
    }

    /// [`CONFIG_PATH_ENV`] when set and non-empty, otherwise [`AppPaths::new`].
    pub fn resolve() -> Self {
        match std::env::var_os(CONFIG_PATH_ENV) {
            Some(path) if !path.is_empty() => Self::for_settings_file(path),
            _ => Self::new(),
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_lives_in_app_dir() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.ends_with("algo-solver"));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths.settings_file.starts_with(&paths.config_dir));
    }

    #[test]
    fn explicit_file_sets_config_dir_to_parent() {
        let paths = AppPaths::for_settings_file("/etc/algo/solver.toml");
        assert_eq!(paths.config_dir, PathBuf::from("/etc/algo"));
        assert_eq!(paths.settings_file, PathBuf::from("/etc/algo/solver.toml"));

        let bare = AppPaths::for_settings_file("solver.toml");
        assert_eq!(bare.config_dir, PathBuf::from(""));
    }
}
