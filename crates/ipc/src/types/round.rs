//! Round and tool state as the page sees it.

use blindsketch_config::Difficulty;
use painting::{Prompt, RoundState, format_clock};
use serde::{Deserialize, Serialize};

/// Snapshot sent when a round starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundInfo {
    pub round_id: u64,
    pub difficulty: Difficulty,
    pub time_remaining: i32,
    /// `MM:SS` form of `time_remaining`
    pub timer_label: String,
    pub prompt: Prompt,
    pub tool: ToolInfo,
}

impl RoundInfo {
    pub fn from_state(round_id: u64, state: &RoundState) -> Self {
        Self {
            round_id,
            difficulty: state.difficulty,
            time_remaining: state.time_remaining,
            timer_label: format_clock(state.time_remaining),
            prompt: state.prompt.clone(),
            tool: ToolInfo::from_tool(state.tool),
        }
    }
}

/// Current brush, with the color in `#rrggbb` form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolInfo {
    pub color: String,
    pub width: u32,
}

impl ToolInfo {
    pub fn from_tool(tool: painting::ToolState) -> Self {
        Self {
            color: tool.color.to_string(),
            width: tool.width.round() as u32,
        }
    }
}
