//! Configuration types for Cueline.
//!
//! Every field has a default, so an empty file (or no file at all) yields
//! the stock rehearsal behaviour.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CuelineConfig {
    /// Context window sizing.
    #[serde(default)]
    pub window: WindowConfig,

    /// Silence and auto-advance timing.
    #[serde(default)]
    pub timing: TimingConfig,

    /// Parser tunables.
    #[serde(default)]
    pub parser: ParserConfig,
}

impl CuelineConfig {
    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        debug!(path = %path_ref.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path_ref)?;
        let config: Self = serde_yaml::from_str(&content)?;
        debug!(
            lookback = config.window.lookback,
            lookahead = config.window.lookahead,
            silence_ms = config.timing.silence_threshold_ms,
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Loads configuration from a file if it exists, defaults otherwise.
    pub fn from_file_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path_ref = path.as_ref();
        if path_ref.exists() {
            Self::from_file(path_ref)
        } else {
            debug!(path = %path_ref.display(), "No configuration file, using defaults");
            Ok(Self::default())
        }
    }

    /// Validates the configuration and returns warnings.
    ///
    /// A zero silence threshold is an error: it would advance the cursor
    /// the instant the user stops speaking.
    pub fn validate(&self) -> Result<Vec<ConfigWarning>, ConfigError> {
        let mut warnings = Vec::new();

        if self.timing.silence_threshold_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "timing.silence_threshold_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }

        if self.timing.hold_threshold_ms <= self.timing.silence_threshold_ms {
            warnings.push(ConfigWarning {
                field: "timing.hold_threshold_ms".to_string(),
                message: format!(
                    "{}ms is not longer than the silence threshold ({}ms); the hold offer only appears when auto-advance is off",
                    self.timing.hold_threshold_ms, self.timing.silence_threshold_ms
                ),
            });
        }

        if self.window.lookahead == 0 {
            warnings.push(ConfigWarning {
                field: "window.lookahead".to_string(),
                message: "Zero lookahead produces windows without the current line".to_string(),
            });
        }

        if self.parser.title_scan_lines == 0 {
            warnings.push(ConfigWarning {
                field: "parser.title_scan_lines".to_string(),
                message: "Every script will be titled 'Untitled Script'".to_string(),
            });
        }

        Ok(warnings)
    }
}

/// A non-fatal configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Warning [{}]: {}", self.field, self.message)
    }
}

/// Sliding window around the rehearsal cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Elements kept before the cursor.
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    /// Elements kept from the cursor onwards (cursor included).
    #[serde(default = "default_lookahead")]
    pub lookahead: usize,
}

fn default_lookback() -> usize {
    8
}

fn default_lookahead() -> usize {
    20
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            lookback: default_lookback(),
            lookahead: default_lookahead(),
        }
    }
}

/// Turn-taking timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Silence after which the user's line is considered finished.
    #[serde(default = "default_silence_threshold")]
    pub silence_threshold_ms: u64,

    /// Silence after which a "hold position" affordance is offered.
    #[serde(default = "default_hold_threshold")]
    pub hold_threshold_ms: u64,

    /// Pause between the AI finishing its line and the cursor moving.
    #[serde(default = "default_post_speech_delay")]
    pub post_speech_delay_ms: u64,

    /// Whether silence advances the cursor on its own.
    #[serde(default = "default_true")]
    pub auto_advance: bool,
}

fn default_silence_threshold() -> u64 {
    1500
}

fn default_hold_threshold() -> u64 {
    5000
}

fn default_post_speech_delay() -> u64 {
    500
}

fn default_true() -> bool {
    true
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            silence_threshold_ms: default_silence_threshold(),
            hold_threshold_ms: default_hold_threshold(),
            post_speech_delay_ms: default_post_speech_delay(),
            auto_advance: true,
        }
    }
}

impl TimingConfig {
    pub fn silence_threshold(&self) -> Duration {
        Duration::from_millis(self.silence_threshold_ms)
    }

    pub fn hold_threshold(&self) -> Duration {
        Duration::from_millis(self.hold_threshold_ms)
    }

    pub fn post_speech_delay(&self) -> Duration {
        Duration::from_millis(self.post_speech_delay_ms)
    }
}

/// Parser tunables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Leading lines searched for a title.
    #[serde(default = "default_title_scan_lines")]
    pub title_scan_lines: usize,
}

fn default_title_scan_lines() -> usize {
    20
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            title_scan_lines: default_title_scan_lines(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid value for '{field}': {message}")]
    Invalid { field: String, message: String },
}
