//! Configuration management for puremath.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "puremath";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "solutions.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `PUREMATH_`)
/// 2. TOML config file at `~/.config/puremath/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Solver configuration.
    pub solver: SolverConfig,
    /// Rate limiting configuration.
    pub limits: LimitsConfig,
    /// Input normalization configuration.
    pub normalize: NormalizeConfig,
    /// Interactive chat configuration.
    pub chat: ChatConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/puremath/solutions.db`
    pub database_path: Option<PathBuf>,
    /// Maximum number of history entries to retain.
    /// Set to 0 for unlimited.
    pub max_history: usize,
    /// Maximum age of history entries to retain in days.
    /// Set to 0 for unlimited.
    pub max_age_days: u32,
    /// Cached solutions older than this many days are treated as misses.
    /// Set to 0 to keep cached solutions forever.
    pub cache_ttl_days: u32,
    /// Number of answer characters stored in history previews.
    pub answer_preview_chars: usize,
}

/// Solver-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Maximum seconds to spend solving a single question.
    pub timeout_secs: u64,
    /// Ceiling on narrated steps per solution.
    pub max_steps: usize,
    /// Decimal places used for approximate numeric answers.
    pub approx_decimals: u8,
}

/// Rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Enable per-client rate limiting.
    pub enabled: bool,
    /// Maximum requests per client within the window.
    pub max_requests: usize,
    /// Length of the sliding window in seconds.
    pub window_secs: u64,
}

/// Input normalization configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Enable the built-in notation rewrite rules.
    pub rules_enabled: bool,
    /// Additional rewrite rules applied after the built-in ones.
    pub custom_rules: Vec<CustomRule>,
}

/// A user-supplied rewrite rule (regex pattern and replacement).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRule {
    /// Regex pattern to match.
    pub pattern: String,
    /// Replacement text (may use capture groups).
    pub replacement: String,
}

/// Interactive chat configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Prompt shown before each input line.
    pub prompt: String,
    /// Print a timing line after each answer.
    pub show_timing: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            max_history: 10_000,
            max_age_days: 0, // Keep history indefinitely
            cache_ttl_days: 7,
            answer_preview_chars: 1000,
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            max_steps: 64,
            approx_decimals: 4,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 5,
            window_secs: 60,
        }
    }
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            rules_enabled: true,
            custom_rules: Vec::new(),
        }
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            prompt: "pmath> ".to_string(),
            show_timing: true,
        }
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. TOML config file (if exists)
    /// 3. Environment variables (prefixed with `PUREMATH_`)
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file).nested())
            .merge(Env::prefixed("PUREMATH_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        // Validate solver config
        if self.solver.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.solver.max_steps == 0 {
            return Err(Error::ConfigValidation {
                message: "max_steps must be greater than 0".to_string(),
            });
        }

        if self.solver.approx_decimals == 0 || self.solver.approx_decimals > 12 {
            return Err(Error::ConfigValidation {
                message: format!(
                    "approx_decimals must be between 1 and 12, got {}",
                    self.solver.approx_decimals
                ),
            });
        }

        // Validate rate limiting config
        if self.limits.enabled {
            if self.limits.max_requests == 0 {
                return Err(Error::ConfigValidation {
                    message: "max_requests must be greater than 0 when limits are enabled"
                        .to_string(),
                });
            }
            if self.limits.window_secs == 0 {
                return Err(Error::ConfigValidation {
                    message: "window_secs must be greater than 0 when limits are enabled"
                        .to_string(),
                });
            }
        }

        // Validate storage config
        if self.storage.answer_preview_chars == 0 {
            return Err(Error::ConfigValidation {
                message: "answer_preview_chars must be greater than 0".to_string(),
            });
        }

        // Validate custom rewrite rules
        for rule in &self.normalize.custom_rules {
            if regex::Regex::new(&rule.pattern).is_err() {
                return Err(Error::ConfigValidation {
                    message: format!("invalid regex pattern: {}", rule.pattern),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the cache TTL as a Duration, or `None` when cached solutions
    /// never expire.
    #[must_use]
    pub fn cache_ttl(&self) -> Option<Duration> {
        if self.storage.cache_ttl_days == 0 {
            None
        } else {
            Some(Duration::from_secs(
                u64::from(self.storage.cache_ttl_days) * 24 * 60 * 60,
            ))
        }
    }

    /// Get the history max age as a Duration, or `None` when unlimited.
    #[must_use]
    pub fn history_max_age(&self) -> Option<Duration> {
        if self.storage.max_age_days == 0 {
            None
        } else {
            Some(Duration::from_secs(
                u64::from(self.storage.max_age_days) * 24 * 60 * 60,
            ))
        }
    }

    /// Get the solve timeout as a Duration.
    #[must_use]
    pub fn solve_timeout(&self) -> Duration {
        Duration::from_secs(self.solver.timeout_secs)
    }

    /// Get the rate limit window as a Duration.
    #[must_use]
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.limits.window_secs)
    }
}
