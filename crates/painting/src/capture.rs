//! Invisible capture surface
//!
//! Turns raw pointer and touch input into stroke log entries. Nothing is
//! drawn while capturing; the log is the only record of the player's ink.
//!
//! Mouse, pen and touch all arrive as the same [`InputEvent`] so there is a
//! single handler and a single coordinate transform.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::log::{RecorderError, StrokeLog, StrokeLogEvent, StrokeRecorder};
use crate::types::{CanvasPoint, ToolState};

/// On-screen rectangle of the canvas element, read at event time.
///
/// This is the CSS layout box, which can differ from the canvas pixel size
/// when the element is scaled by styling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ElementRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl ElementRect {
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// A pointer sample in client coordinates together with the element rect
/// that was current when the sample was taken.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPointer {
    pub client_x: f32,
    pub client_y: f32,
    pub rect: ElementRect,
}

impl RawPointer {
    pub const fn new(client_x: f32, client_y: f32, rect: ElementRect) -> Self {
        Self {
            client_x,
            client_y,
            rect,
        }
    }
}

/// Where an input sample came from. Only used for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputSource {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Unified pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InputEvent {
    Down { source: InputSource, at: RawPointer },
    Move { source: InputSource, at: RawPointer },
    Up { source: InputSource },
    /// Pointer left the element; ends any open stroke
    Leave,
}

impl InputEvent {
    /// Map a touch phase to input, following only the first active touch.
    ///
    /// Returns `None` for a start/move that carries no touch points.
    pub fn from_touches(phase: TouchPhase, touches: &[RawPointer]) -> Option<Self> {
        let source = InputSource::Touch;
        match phase {
            TouchPhase::Start => touches.first().map(|&at| InputEvent::Down { source, at }),
            TouchPhase::Move => touches.first().map(|&at| InputEvent::Move { source, at }),
            TouchPhase::End | TouchPhase::Cancel => Some(InputEvent::Up { source }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchPhase {
    Start,
    Move,
    End,
    Cancel,
}

/// Map a client-space sample to canvas pixels.
///
/// `canvas_x = (client_x - left) * canvas_width / display_width`, and the same
/// for y. Returns `None` when the element has no displayed area.
pub fn to_canvas(raw: RawPointer, canvas_size: (u32, u32)) -> Option<CanvasPoint> {
    let rect = raw.rect;
    if !(rect.width > 0.0 && rect.height > 0.0) {
        return None;
    }
    let scale_x = canvas_size.0 as f32 / rect.width;
    let scale_y = canvas_size.1 as f32 / rect.height;
    Some(CanvasPoint::new(
        (raw.client_x - rect.left) * scale_x,
        (raw.client_y - rect.top) * scale_y,
    ))
}

/// Records pointer input into a [`StrokeLog`] without drawing.
///
/// While disabled every event is a no-op. Moves and ups with no open stroke
/// are dropped, so the log always follows the down / move* / up grammar.
#[derive(Debug)]
pub struct CaptureSurface {
    recorder: StrokeRecorder,
    enabled: bool,
}

impl Default for CaptureSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSurface {
    /// Create an enabled capture surface.
    pub fn new() -> Self {
        Self {
            recorder: StrokeRecorder::new(),
            enabled: true,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// True while a pen-down has no matching pen-up.
    pub fn is_stroking(&self) -> bool {
        self.recorder.is_recording()
    }

    /// Strokes captured since the last reset.
    pub fn strokes_captured(&self) -> usize {
        self.recorder.started_count()
    }

    /// Handle one input event, appending at most one entry to `log`
    /// (two when a down arrives while a stroke is still open).
    ///
    /// Returns the lifecycle events produced, in order.
    pub fn handle(
        &mut self,
        event: InputEvent,
        canvas_size: (u32, u32),
        tool: ToolState,
        log: &mut StrokeLog,
    ) -> Vec<StrokeLogEvent> {
        if !self.enabled {
            debug!(?event, "capture disabled, ignoring input");
            return Vec::new();
        }

        match event {
            InputEvent::Down { at, .. } => self.on_pointer_down(at, canvas_size, tool, log),
            InputEvent::Move { at, .. } => {
                self.on_pointer_move(at, canvas_size, tool, log);
                Vec::new()
            }
            InputEvent::Up { .. } | InputEvent::Leave => self.on_pointer_up(log).into_iter().collect(),
        }
    }

    /// Open a stroke at `raw`.
    pub fn on_pointer_down(
        &mut self,
        raw: RawPointer,
        canvas_size: (u32, u32),
        tool: ToolState,
        log: &mut StrokeLog,
    ) -> Vec<StrokeLogEvent> {
        let mut events = Vec::new();
        if !self.enabled {
            return events;
        }
        let Some(at) = to_canvas(raw, canvas_size) else {
            debug!(?raw, "pointer down on element with no display area, ignoring");
            return events;
        };

        // A down without a preceding up (the up happened off-element) closes
        // the previous stroke first so the grammar holds.
        if self.recorder.is_recording() {
            debug!("pointer down while stroke open, closing previous stroke");
            events.extend(self.on_pointer_up(log));
        }

        match self.recorder.start(at, tool) {
            Ok((entry, started)) => {
                log.append(entry);
                events.push(started);
            }
            Err(err) => debug!(%err, "pointer down rejected"),
        }
        events
    }

    /// Extend the open stroke to `raw`. No-op without an open stroke.
    pub fn on_pointer_move(
        &mut self,
        raw: RawPointer,
        canvas_size: (u32, u32),
        tool: ToolState,
        log: &mut StrokeLog,
    ) {
        if !self.enabled || !self.recorder.is_recording() {
            return;
        }
        let Some(at) = to_canvas(raw, canvas_size) else {
            debug!(?raw, "pointer move on element with no display area, ignoring");
            return;
        };
        match self.recorder.extend(at, tool) {
            Ok(entry) => log.append(entry),
            Err(err) => debug!(%err, "pointer move rejected"),
        }
    }

    /// Close the open stroke. No-op without an open stroke.
    pub fn on_pointer_up(&mut self, log: &mut StrokeLog) -> Option<StrokeLogEvent> {
        if !self.enabled {
            return None;
        }
        self.close(log)
    }

    /// Close any open stroke regardless of the enabled flag.
    ///
    /// Called at reveal so the log handed to replay is well formed.
    pub fn finish_open_stroke(&mut self, log: &mut StrokeLog) -> Option<StrokeLogEvent> {
        self.close(log)
    }

    /// Forget any open stroke and restart stroke numbering.
    pub fn reset(&mut self) -> Option<StrokeLogEvent> {
        let aborted = self.recorder.abort("log discarded").ok();
        self.recorder.reset();
        aborted
    }

    fn close(&mut self, log: &mut StrokeLog) -> Option<StrokeLogEvent> {
        match self.recorder.finish() {
            Ok((entry, completed)) => {
                log.append(entry);
                Some(completed)
            }
            Err(RecorderError::NotStarted) => None,
            Err(err) => {
                debug!(%err, "pointer up rejected");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Color, StrokeEvent};

    const CANVAS: (u32, u32) = (400, 400);

    fn rect() -> ElementRect {
        ElementRect::new(0.0, 0.0, 400.0, 400.0)
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::Down {
            source: InputSource::Mouse,
            at: RawPointer::new(x, y, rect()),
        }
    }

    fn mv(x: f32, y: f32) -> InputEvent {
        InputEvent::Move {
            source: InputSource::Mouse,
            at: RawPointer::new(x, y, rect()),
        }
    }

    fn up() -> InputEvent {
        InputEvent::Up {
            source: InputSource::Mouse,
        }
    }

    #[test]
    fn test_transform_scales_css_box_to_pixels() {
        // 400px canvas shown at 200x100 CSS pixels, offset by (50, 20)
        let raw = RawPointer::new(150.0, 70.0, ElementRect::new(50.0, 20.0, 200.0, 100.0));
        let point = to_canvas(raw, (400, 400)).unwrap();
        assert_eq!(point, CanvasPoint::new(200.0, 200.0));
    }

    #[test]
    fn test_transform_is_independent_of_history() {
        let canvas = (300, 150);
        let display = ElementRect::new(0.0, 0.0, 600.0, 300.0);
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();

        // Earlier events at a different layout must not influence later ones
        let earlier = ElementRect::new(10.0, 10.0, 100.0, 100.0);
        capture.handle(
            InputEvent::Down {
                source: InputSource::Mouse,
                at: RawPointer::new(40.0, 40.0, earlier),
            },
            canvas,
            ToolState::default(),
            &mut log,
        );

        for (rx, ry) in [(0.0, 0.0), (120.0, 60.0), (600.0, 300.0)] {
            let expected = CanvasPoint::new(rx * 300.0 / 600.0, ry * 150.0 / 300.0);
            assert_eq!(to_canvas(RawPointer::new(rx, ry, display), canvas), Some(expected));
        }
    }

    #[test]
    fn test_transform_rejects_empty_rect() {
        let raw = RawPointer::new(1.0, 1.0, ElementRect::new(0.0, 0.0, 0.0, 10.0));
        assert_eq!(to_canvas(raw, CANVAS), None);
    }

    #[test]
    fn test_capture_logs_one_entry_per_event_with_tool_snapshot() {
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();
        let black = ToolState {
            color: Color::BLACK,
            width: 5.0,
        };
        let red = ToolState {
            color: Color::rgb(255, 0, 0),
            width: 9.0,
        };

        capture.handle(down(10.0, 10.0), CANVAS, black, &mut log);
        capture.handle(mv(20.0, 20.0), CANVAS, black, &mut log);
        // Tool changes mid-stroke are sampled per point
        capture.handle(mv(30.0, 30.0), CANVAS, red, &mut log);
        capture.handle(up(), CANVAS, red, &mut log);

        assert_eq!(
            log.events(),
            &[
                StrokeEvent::PenDown {
                    x: 10.0,
                    y: 10.0,
                    color: Color::BLACK,
                    width: 5.0
                },
                StrokeEvent::PenMove {
                    x: 20.0,
                    y: 20.0,
                    color: Color::BLACK,
                    width: 5.0
                },
                StrokeEvent::PenMove {
                    x: 30.0,
                    y: 30.0,
                    color: Color::rgb(255, 0, 0),
                    width: 9.0
                },
                StrokeEvent::PenUp,
            ]
        );
    }

    #[test]
    fn test_move_and_up_without_down_are_ignored() {
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();

        capture.handle(mv(5.0, 5.0), CANVAS, ToolState::default(), &mut log);
        capture.handle(up(), CANVAS, ToolState::default(), &mut log);
        capture.handle(InputEvent::Leave, CANVAS, ToolState::default(), &mut log);

        assert!(log.is_empty());
    }

    #[test]
    fn test_leave_ends_stroke() {
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();

        capture.handle(down(1.0, 1.0), CANVAS, ToolState::default(), &mut log);
        let events = capture.handle(InputEvent::Leave, CANVAS, ToolState::default(), &mut log);

        assert_eq!(log.events().last(), Some(&StrokeEvent::PenUp));
        assert!(matches!(events[..], [StrokeLogEvent::StrokeCompleted { points: 1, .. }]));
        assert!(!capture.is_stroking());
    }

    #[test]
    fn test_down_while_open_closes_previous_stroke() {
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();

        capture.handle(down(1.0, 1.0), CANVAS, ToolState::default(), &mut log);
        let events = capture.handle(down(2.0, 2.0), CANVAS, ToolState::default(), &mut log);

        assert_eq!(log.len(), 3);
        assert_eq!(log.events()[1], StrokeEvent::PenUp);
        assert_eq!(events.len(), 2);
        assert_eq!(log.stroke_count(), 2);
    }

    #[test]
    fn test_disabled_capture_is_noop() {
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();
        capture.set_enabled(false);

        capture.handle(down(1.0, 1.0), CANVAS, ToolState::default(), &mut log);
        capture.handle(mv(2.0, 2.0), CANVAS, ToolState::default(), &mut log);
        capture.handle(up(), CANVAS, ToolState::default(), &mut log);

        assert!(log.is_empty());
    }

    #[test]
    fn test_finish_open_stroke_ignores_enabled_flag() {
        let mut capture = CaptureSurface::new();
        let mut log = StrokeLog::new();

        capture.handle(down(1.0, 1.0), CANVAS, ToolState::default(), &mut log);
        capture.set_enabled(false);
        assert!(capture.finish_open_stroke(&mut log).is_some());
        assert_eq!(log.events().last(), Some(&StrokeEvent::PenUp));
        assert!(capture.finish_open_stroke(&mut log).is_none());
    }

    #[test]
    fn test_touch_mapping_uses_first_touch() {
        let first = RawPointer::new(1.0, 2.0, rect());
        let second = RawPointer::new(3.0, 4.0, rect());

        let event = InputEvent::from_touches(TouchPhase::Start, &[first, second]).unwrap();
        assert_eq!(
            event,
            InputEvent::Down {
                source: InputSource::Touch,
                at: first
            }
        );
        assert_eq!(InputEvent::from_touches(TouchPhase::Move, &[]), None);
        assert_eq!(
            InputEvent::from_touches(TouchPhase::End, &[]),
            Some(InputEvent::Up {
                source: InputSource::Touch
            })
        );
    }
}
