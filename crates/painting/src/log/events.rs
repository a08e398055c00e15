//! Events emitted during stroke capture.

use crate::types::Color;

/// Stroke lifecycle notifications produced by the recorder.
///
/// These let observers (telemetry, a live preview in a debug build) follow
/// capture without reading the log itself.
#[derive(Debug, Clone, PartialEq)]
pub enum StrokeLogEvent {
    /// A pen-down opened stroke number `stroke_index` (0-based within the round).
    StrokeStarted {
        stroke_index: usize,
        color: Color,
        width: f32,
    },
    /// A pen-up closed the stroke after `points` samples (pen-down included).
    StrokeCompleted { stroke_index: usize, points: usize },
    /// An open stroke was discarded before completion.
    StrokeAborted { stroke_index: usize, reason: String },
}
