//! Notifications the round sends to its collaborators (audio, UI, telemetry).

use blindsketch_config::Difficulty;
use serde::{Deserialize, Serialize};

use crate::log::StrokeLogEvent;
use crate::replay::ReplayStats;

/// Why the round was revealed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealCause {
    /// The player pressed reveal
    Requested,
    /// The countdown reached zero
    TimeUp,
}

/// Fire-and-forget round notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum RoundEvent {
    /// A round entered the drawing phase
    Started {
        round_id: u64,
        difficulty: Difficulty,
        time_remaining: i32,
        prompt_title: String,
    },
    /// One second elapsed
    Tick { remaining: i32 },
    /// Played each tick while `0 < remaining <= threshold`
    LowTime { remaining: i32 },
    /// The drawing was revealed and replayed
    Revealed { cause: RevealCause, stats: ReplayStats },
    /// The previous round was discarded; a `Started` follows
    Restarted { round_id: u64 },
    /// The log was emptied by a clear-canvas action
    Cleared,
    Paused,
    Resumed,
    /// Capture lifecycle
    Stroke(StrokeLogEvent),
}

/// Receives round notifications. Return values are never consumed.
pub trait RoundObserver {
    fn on_event(&mut self, event: &RoundEvent);
}

impl<F> RoundObserver for F
where
    F: FnMut(&RoundEvent),
{
    fn on_event(&mut self, event: &RoundEvent) {
        self(event)
    }
}
