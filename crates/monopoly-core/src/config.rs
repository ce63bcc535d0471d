//! Configuration loading and typed config structures.
//!
//! The configuration lives in `monopoly-config.yaml`. Every field carries a
//! serde default, so a missing section, a partial file, or an empty file all
//! produce a usable [`MonopolyConfig`]. Engine parameters are checked with
//! [`EngineConfig::validate`] when the engine is built, not at parse time.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

/// Default number of steps between two batch notifications.
pub const DEFAULT_BATCH_SIZE: u64 = 100_000;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct MonopolyConfig {
    /// Simulation engine parameters.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Presentation settings for front ends.
    #[serde(default)]
    pub display: DisplayConfig,
}

impl MonopolyConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(yaml)?;
        Ok(config)
    }
}

/// Simulation engine parameters, fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct EngineConfig {
    /// Steps between two `on_batch_complete` notifications. Must be positive.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Milliseconds the worker sleeps after each step (0 = no sleep).
    #[serde(default)]
    pub post_step_delay_ms: u64,

    /// Target interval `[low, high]` for mapped probabilities.
    #[serde(default = "default_probability_map_range")]
    pub probability_map_range: [f64; 2],

    /// Optional dice seed. `None` draws the seed from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl EngineConfig {
    /// Pause inserted after every step.
    pub const fn post_step_delay(&self) -> Duration {
        Duration::from_millis(self.post_step_delay_ms)
    }

    /// Check the configuration for values the engine cannot run with.
    ///
    /// Returns the reason of the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        if self.batch_size == 0 {
            return Err("batch_size must be at least 1".to_owned());
        }
        let [low, high] = self.probability_map_range;
        if !low.is_finite() || !high.is_finite() {
            return Err(format!(
                "probability_map_range must be finite, got [{low}, {high}]"
            ));
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            post_step_delay_ms: 0,
            probability_map_range: default_probability_map_range(),
            seed: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error). `RUST_LOG` wins if set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Presentation settings consumed by front ends.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DisplayConfig {
    /// Decimal places shown for percentage labels.
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Whether to color field labels by their mapped probability.
    #[serde(default = "default_true")]
    pub color: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            precision: default_precision(),
            color: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions
// ---------------------------------------------------------------------------

const fn default_batch_size() -> u64 {
    DEFAULT_BATCH_SIZE
}

const fn default_probability_map_range() -> [f64; 2] {
    [0.0, 1.0]
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_precision() -> usize {
    3
}

const fn default_true() -> bool {
    true
}
