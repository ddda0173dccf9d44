//! Application settings structs, defaults and TOML persistence.
//!
//! All structs implement `Serialize`, `Deserialize`, `Default` and `Clone`
//! so they can be round-tripped through TOML files and shared across tasks.
//!
//! The backend credential is deliberately *not* part of [`AppConfig`]: only
//! the name of the environment variable that holds it is persisted.  See
//! [`Credential`].

use std::fmt;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::AppPaths;

// ---------------------------------------------------------------------------
// GenerationConfig
// ---------------------------------------------------------------------------

/// Settings for the external generative backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Base URL of the backend API (no trailing slash).
    pub base_url: String,
    /// Model identifier used in the `generateContent` path.
    pub model: String,
    /// Name of the environment variable holding the API key.
    pub api_key_env: String,
    /// Sampling temperature.  Kept low-to-moderate so the output shape stays
    /// consistent across calls.
    pub temperature: f32,
    /// Maximum seconds a single backend attempt may take.
    pub timeout_secs: u64,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com".into(),
            model: "gemini-3-flash-preview".into(),
            api_key_env: "GEMINI_API_KEY".into(),
            temperature: 0.7,
            timeout_secs: 60,
        }
    }
}

// ---------------------------------------------------------------------------
// RetryConfig
// ---------------------------------------------------------------------------

/// Bounded retry policy applied around every backend call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts including the first one.  `1` disables retrying.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for every further attempt.
    pub initial_backoff_ms: u64,
    /// Upper bound for a single backoff delay.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

// ---------------------------------------------------------------------------
// ValidationConfig
// ---------------------------------------------------------------------------

/// Knobs for the response validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Reject variants whose `lineExplanations` count differs from the
    /// snippet line count.  Off by default: misalignment is logged and the
    /// viewer treats every lookup as possibly absent.
    pub strict_line_alignment: bool,
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Socket address the solve API binds to.
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".into(),
        }
    }
}

// ---------------------------------------------------------------------------
// NarrationConfig
// ---------------------------------------------------------------------------

/// Host speech command used by the narrator.
///
/// The narration text is written to the command's stdin, so any TTS tool
/// that reads stdin works (`espeak`, `espeak-ng`, `say -f -`, `festival --tts`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NarrationConfig {
    /// Executable name or path.
    pub command: String,
    /// Extra arguments passed before the text is piped in.
    pub args: Vec<String>,
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            command: "espeak".into(),
            args: Vec::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// AppConfig  (top-level)
// ---------------------------------------------------------------------------

/// Top-level application configuration, serialised as `settings.toml`.
///
/// Built once at startup and handed to the server and the viewer; nothing
/// re-reads the environment per request.
///
/// ```rust,no_run
/// use algo_solver::config::AppConfig;
///
/// // Load (returns Default when file is missing)
/// let config = AppConfig::load().unwrap();
/// assert!(config.retry.max_attempts >= 1);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language used when a request does not name one.
    pub default_language: String,
    /// Generative backend settings.
    pub generation: GenerationConfig,
    /// Retry / backoff policy around backend calls.
    pub retry: RetryConfig,
    /// Response validation settings.
    pub validation: ValidationConfig,
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Narration host command.
    pub narration: NarrationConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_language: "Python".into(),
            generation: GenerationConfig::default(),
            retry: RetryConfig::default(),
            validation: ValidationConfig::default(),
            server: ServerConfig::default(),
            narration: NarrationConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `$ALGO_SOLVER_CONFIG` if set, otherwise from
    /// the platform-appropriate `settings.toml`.
    ///
    /// Returns `Ok(AppConfig::default())` when the file does not exist yet so
    /// callers never need to special-case a missing file.
    pub fn load() -> Result<Self> {
        Self::load_from(&AppPaths::resolve().settings_file)
    }

    /// Load from an explicit path (useful for tests).
    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the platform-appropriate `settings.toml`,
    /// creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&AppPaths::resolve().settings_file)
    }

    /// Save to an explicit path (useful for tests).
    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// Backend API key, read exactly once at process start.
///
/// `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Read the credential from the environment variable `var`.
    ///
    /// Unset and blank values both count as missing.
    pub fn from_env(var: &str) -> Option<Self> {
        std::env::var(var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self)
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
