//! Configuration module for the algorithm solver.
//!
//! Provides `AppConfig` (top-level settings), sub-configs for each subsystem,
//! `AppPaths` for the platform config directory, TOML persistence via
//! `AppConfig::load` / `AppConfig::save`, and the startup-time [`Credential`].

pub mod paths;
pub mod settings;

pub use paths::{AppPaths, CONFIG_PATH_ENV};
pub use settings::{
    AppConfig, Credential, GenerationConfig, NarrationConfig, RetryConfig, ServerConfig,
    ValidationConfig,
};
