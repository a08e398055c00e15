//! Main IPC message enums for communication between the game core and UI.

use blindsketch_config::{Difficulty, TimerConfig};
use painting::{InputEvent, Prompt, ReplayStats, RevealCause, RoundEvent, format_clock};
use serde::{Deserialize, Serialize};

use crate::IpcError;
use crate::types::{RoundInfo, ScoreReport, ScoreRequest, ScoreSubmission, ToolInfo};

/// Messages from the game core to the page UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GameToUi {
    /// A round entered the drawing phase
    RoundStarted(RoundInfo),

    /// Countdown update, once per second
    Tick {
        remaining: i32,
        label: String,
        /// Last seconds of the round (timer shown in warning style)
        warning: bool,
    },

    /// Low-time cue (play the tick sound)
    LowTime { remaining: i32 },

    /// The drawing was revealed
    Revealed { cause: RevealCause, stats: ReplayStats },

    /// The previous round was discarded
    Restarted { round_id: u64 },

    /// The invisible drawing was wiped
    CanvasCleared,

    /// Canvas pixel size changed
    CanvasResized { width: u32, height: u32 },

    /// Brush color or width changed
    ToolChanged(ToolInfo),

    /// The revealed drawing is ready for the scoring collaborator
    ScoreRequested(ScoreRequest),

    /// Final score for a round. `fallback` is set when scoring failed.
    ScoreReady {
        round_id: u64,
        report: ScoreReport,
        fallback: bool,
    },

    /// Error notification
    Error { code: String, message: String },
}

/// Messages from the page UI to the game core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UiToGame {
    /// Pointer or touch input already resolved against the canvas rect
    Input(InputEvent),

    /// Color picker or swatch, `#rrggbb`, `#rgb` or `rgb(r, g, b)`
    SelectColor { color: String },

    /// Brush size slider
    SelectBrushWidth { width: u32 },

    /// Reveal button
    Reveal,

    /// Play again. Missing fields are picked by the host.
    Restart {
        difficulty: Option<Difficulty>,
        prompt: Option<Prompt>,
    },

    /// Clear button
    ClearCanvas,

    /// Page visibility changed
    VisibilityChanged { hidden: bool },

    /// The reference image finished loading
    ReferenceLoaded { width: u32, height: u32 },

    /// Element was re-laid out after reveal
    Redraw,

    /// The scoring collaborator answered. The score is range checked by
    /// the host.
    ScoreResult { round_id: u64, report: ScoreSubmission },

    /// The scoring collaborator failed
    ScoreFailed { round_id: u64, message: String },
}

impl GameToUi {
    /// UI message for a round notification. Stroke lifecycle events have
    /// no UI counterpart.
    pub fn from_round_event(event: &RoundEvent, timer: &TimerConfig) -> Option<Self> {
        let message = match event {
            RoundEvent::Started { .. } | RoundEvent::Stroke(_) => return None,
            RoundEvent::Tick { remaining } => GameToUi::Tick {
                remaining: *remaining,
                label: format_clock(*remaining),
                warning: *remaining <= timer.warning_threshold_secs,
            },
            RoundEvent::LowTime { remaining } => GameToUi::LowTime {
                remaining: *remaining,
            },
            RoundEvent::Revealed { cause, stats } => GameToUi::Revealed {
                cause: *cause,
                stats: *stats,
            },
            RoundEvent::Restarted { round_id } => GameToUi::Restarted {
                round_id: *round_id,
            },
            RoundEvent::Cleared => GameToUi::CanvasCleared,
            RoundEvent::Paused | RoundEvent::Resumed => return None,
        };
        Some(message)
    }

    pub fn to_json(&self) -> Result<String, IpcError> {
        Ok(serde_json::to_string(self)?)
    }
}

impl UiToGame {
    pub fn from_json(json: &str) -> Result<Self, IpcError> {
        if json.trim().is_empty() {
            return Err(IpcError::InvalidFormat("empty message".into()));
        }
        serde_json::from_str(json).map_err(IpcError::Deserialize)
    }

    /// Salvage a score answer that did not parse as [`UiToGame`].
    ///
    /// A `ScoreResult` whose report is unreadable still names its round, so
    /// it becomes a `ScoreFailed` for that round instead of being lost.
    pub fn score_failure_from_json(json: &str) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_str(json).ok()?;
        if value.get("type")?.as_str()? != "ScoreResult" {
            return None;
        }
        let round_id = value.get("data")?.get("round_id")?.as_u64()?;
        Some(UiToGame::ScoreFailed {
            round_id,
            message: "unreadable score report".into(),
        })
    }
}
