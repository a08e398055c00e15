//! Stroke recorder enforcing the pen-down / pen-move* / pen-up grammar.

use crate::types::{CanvasPoint, StrokeEvent, ToolState};
use crate::validation::{validate_point, ValidationError};

use super::events::StrokeLogEvent;

/// Error type for stroke recording operations.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum RecorderError {
    #[error("Stroke not started - call start() first")]
    NotStarted,
    #[error("Stroke already started - call finish() or abort() first")]
    AlreadyStarted,
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, Copy)]
struct OpenStroke {
    index: usize,
    points: usize,
}

/// Tracks whether a stroke is open and turns input into log entries.
///
/// The recorder never touches the log itself. Each call returns the
/// [`StrokeEvent`] to append, so the caller decides where it goes.
///
/// # Example
///
/// ```ignore
/// let mut recorder = StrokeRecorder::new();
/// let (down, _started) = recorder.start(CanvasPoint::new(10.0, 10.0), tool)?;
/// log.append(down);
/// log.append(recorder.extend(CanvasPoint::new(20.0, 20.0), tool)?);
/// let (up, _completed) = recorder.finish()?;
/// log.append(up);
/// ```
#[derive(Debug, Default)]
pub struct StrokeRecorder {
    open: Option<OpenStroke>,
    /// Strokes started since the last reset
    started: usize,
}

impl StrokeRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a stroke is currently open.
    pub fn is_recording(&self) -> bool {
        self.open.is_some()
    }

    /// Open a new stroke at `at`.
    pub fn start(
        &mut self,
        at: CanvasPoint,
        tool: ToolState,
    ) -> Result<(StrokeEvent, StrokeLogEvent), RecorderError> {
        if self.open.is_some() {
            return Err(RecorderError::AlreadyStarted);
        }
        let at = validate_point(at)?;

        let index = self.started;
        self.started += 1;
        self.open = Some(OpenStroke { index, points: 1 });

        Ok((
            StrokeEvent::pen_down(at, tool),
            StrokeLogEvent::StrokeStarted {
                stroke_index: index,
                color: tool.color,
                width: tool.width,
            },
        ))
    }

    /// Extend the open stroke to `at`.
    pub fn extend(&mut self, at: CanvasPoint, tool: ToolState) -> Result<StrokeEvent, RecorderError> {
        let open = self.open.as_mut().ok_or(RecorderError::NotStarted)?;
        let at = validate_point(at)?;
        open.points += 1;
        Ok(StrokeEvent::pen_move(at, tool))
    }

    /// Close the open stroke.
    pub fn finish(&mut self) -> Result<(StrokeEvent, StrokeLogEvent), RecorderError> {
        let open = self.open.take().ok_or(RecorderError::NotStarted)?;
        Ok((
            StrokeEvent::PenUp,
            StrokeLogEvent::StrokeCompleted {
                stroke_index: open.index,
                points: open.points,
            },
        ))
    }

    /// Forget the open stroke without producing a pen-up.
    ///
    /// Used when the log the stroke belongs to is being discarded.
    pub fn abort(&mut self, reason: impl Into<String>) -> Result<StrokeLogEvent, RecorderError> {
        let open = self.open.take().ok_or(RecorderError::NotStarted)?;
        Ok(StrokeLogEvent::StrokeAborted {
            stroke_index: open.index,
            reason: reason.into(),
        })
    }

    /// Drop any open stroke and restart stroke numbering.
    pub fn reset(&mut self) {
        self.open = None;
        self.started = 0;
    }

    /// Samples in the open stroke, pen-down included.
    pub fn current_point_count(&self) -> usize {
        self.open.map(|o| o.points).unwrap_or(0)
    }

    /// Strokes started since the last reset.
    pub fn started_count(&self) -> usize {
        self.started
    }
}
