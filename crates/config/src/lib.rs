//! Shared configuration for Blindsketch
//!
//! This crate is the single source of truth for round timing, canvas
//! dimensions, brush bounds and scoring settings shared by the core, the
//! browser host and the scoring client.

use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default canvas width in pixels
pub const DEFAULT_CANVAS_WIDTH: u32 = 400;

/// Default canvas height in pixels
pub const DEFAULT_CANVAS_HEIGHT: u32 = 400;

/// Largest canvas a reference image may grow the canvas to
pub const MAX_CANVAS_WIDTH: u32 = 400;
pub const MAX_CANVAS_HEIGHT: u32 = 400;

/// Brush width bounds offered by the slider
pub const MIN_BRUSH_WIDTH: u32 = 1;
pub const MAX_BRUSH_WIDTH: u32 = 20;
pub const DEFAULT_BRUSH_WIDTH: u32 = 5;

/// Default ink color
pub const DEFAULT_COLOR: &str = "#000000";

/// Remaining seconds at or below which the low-time cue plays
pub const LOW_TIME_THRESHOLD_SECS: i32 = 3;

/// Remaining seconds at or below which the timer display turns to warning
pub const WARNING_THRESHOLD_SECS: i32 = 10;

/// Interval between timer ticks
pub const TICK_INTERVAL_SECS: u32 = 1;

/// Environment variables read by [`ScoringConfig::from_env`]
pub const ENV_SCORING_URL: &str = "BLINDSKETCH_SCORING_URL";
pub const ENV_SCORING_ATTEMPTS: &str = "BLINDSKETCH_SCORING_ATTEMPTS";
pub const ENV_SCORING_TIMEOUT: &str = "BLINDSKETCH_SCORING_TIMEOUT_SECS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown difficulty: {0}")]
    UnknownDifficulty(String),

    #[error("Invalid value for {var}: {value}")]
    InvalidEnv { var: &'static str, value: String },
}

/// Round difficulty, chosen once per round from the menu or page query.
///
/// The time mapping follows the shipped game: harder subjects get more
/// time to draw, not less.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Initial `time_remaining` for a round at this difficulty
    pub fn initial_seconds(self) -> i32 {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => 30,
            Difficulty::Hard => 45,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Read `difficulty=` from a page query string such as `?difficulty=hard&x=1`.
    ///
    /// Missing or unrecognised values fall back to [`Difficulty::Medium`].
    pub fn from_query(query: &str) -> Self {
        query
            .trim_start_matches('?')
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| *key == "difficulty")
            .and_then(|(_, value)| value.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ConfigError::UnknownDifficulty(other.to_string())),
        }
    }
}

/// Canvas pixel buffer settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasConfig {
    /// Initial pixel width
    pub width: u32,
    /// Initial pixel height
    pub height: u32,
    /// Upper bound when fitting the canvas to a reference image
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_CANVAS_WIDTH,
            height: DEFAULT_CANVAS_HEIGHT,
            max_width: MAX_CANVAS_WIDTH,
            max_height: MAX_CANVAS_HEIGHT,
        }
    }
}

/// Brush width bounds and starting tool state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BrushConfig {
    pub min_width: u32,
    pub max_width: u32,
    pub default_width: u32,
    pub default_color: String,
}

impl Default for BrushConfig {
    fn default() -> Self {
        Self {
            min_width: MIN_BRUSH_WIDTH,
            max_width: MAX_BRUSH_WIDTH,
            default_width: DEFAULT_BRUSH_WIDTH,
            default_color: DEFAULT_COLOR.to_string(),
        }
    }
}

/// Timer thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    pub tick_interval_secs: u32,
    pub low_time_threshold_secs: i32,
    pub warning_threshold_secs: i32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_secs: TICK_INTERVAL_SECS,
            low_time_threshold_secs: LOW_TIME_THRESHOLD_SECS,
            warning_threshold_secs: WARNING_THRESHOLD_SECS,
        }
    }
}

/// Everything a round needs to start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub canvas: CanvasConfig,
    #[serde(default)]
    pub brush: BrushConfig,
    #[serde(default)]
    pub timer: TimerConfig,
}

/// Scoring collaborator settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// WebSocket URL of the remote scorer; `None` selects the offline scorer
    pub server_url: Option<String>,
    /// Total attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry, doubled after each failure
    pub initial_backoff_ms: u64,
    /// Upper bound on the whole scoring task, retries included
    pub timeout_secs: u64,
    /// Score reported when scoring fails
    pub fallback_score: u8,
    pub fallback_message: String,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            max_attempts: 3,
            initial_backoff_ms: 500,
            timeout_secs: 20,
            fallback_score: 50,
            fallback_message: "Scoring is unavailable right now. Nice try!".to_string(),
        }
    }
}

impl ScoringConfig {
    /// Build from defaults overridden by `BLINDSKETCH_SCORING_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from defaults overridden by values from `lookup`
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup(ENV_SCORING_URL).filter(|u| !u.trim().is_empty()) {
            config.server_url = Some(url);
        }
        if let Some(value) = lookup(ENV_SCORING_ATTEMPTS) {
            config.max_attempts = match value.trim().parse::<u32>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::InvalidEnv {
                        var: ENV_SCORING_ATTEMPTS,
                        value,
                    });
                }
            };
        }
        if let Some(value) = lookup(ENV_SCORING_TIMEOUT) {
            config.timeout_secs =
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidEnv {
                        var: ENV_SCORING_TIMEOUT,
                        value: value.clone(),
                    })?;
        }

        Ok(config)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Backoff before retry number `retry` (1-based)
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 1u64 << retry.saturating_sub(1).min(16);
        Duration::from_millis(self.initial_backoff_ms.saturating_mul(factor))
    }
}
