//! Append-only, ordered storage for stroke events.

use serde::{Deserialize, Serialize};

use crate::types::{CanvasPoint, Color, StrokeEvent};

/// Ordered record of everything the player drew this round.
///
/// Insertion order is draw order and replay walks it front to back. The log
/// is owned by a single round and mutated only from event handlers on one
/// thread, so there is no interior locking.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StrokeLog {
    events: Vec<StrokeEvent>,
}

/// One pen-down-to-pen-up gesture reassembled from the log.
#[derive(Debug, Clone, PartialEq)]
pub struct StrokeView {
    pub color: Color,
    pub width: f32,
    /// Pen-down point followed by every move point
    pub points: Vec<CanvasPoint>,
    /// False when the log ends before this stroke's pen-up
    pub closed: bool,
}

impl StrokeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. Entries are never reordered or removed individually.
    pub fn append(&mut self, event: StrokeEvent) {
        self.events.push(event);
    }

    /// Discard every entry (restart or clear-canvas).
    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[StrokeEvent] {
        &self.events
    }

    pub fn iter(&self) -> std::slice::Iter<'_, StrokeEvent> {
        self.events.iter()
    }

    /// Number of pen-down entries.
    pub fn stroke_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, StrokeEvent::PenDown { .. }))
            .count()
    }

    /// Number of positioned entries (pen-down and pen-move).
    pub fn point_count(&self) -> usize {
        self.events.iter().filter(|e| e.point().is_some()).count()
    }

    /// True when the last pen-down has no matching pen-up yet.
    pub fn has_open_stroke(&self) -> bool {
        for event in self.events.iter().rev() {
            match event {
                StrokeEvent::PenUp => return false,
                StrokeEvent::PenDown { .. } => return true,
                StrokeEvent::PenMove { .. } => {}
            }
        }
        false
    }

    /// Group the log into strokes, skipping moves and pen-ups that have no open stroke.
    pub fn strokes(&self) -> Vec<StrokeView> {
        let mut strokes = Vec::new();
        let mut open: Option<StrokeView> = None;

        for event in &self.events {
            match *event {
                StrokeEvent::PenDown { x, y, color, width } => {
                    if let Some(prev) = open.take() {
                        strokes.push(prev);
                    }
                    open = Some(StrokeView {
                        color,
                        width,
                        points: vec![CanvasPoint::new(x, y)],
                        closed: false,
                    });
                }
                StrokeEvent::PenMove { x, y, .. } => {
                    if let Some(stroke) = open.as_mut() {
                        stroke.points.push(CanvasPoint::new(x, y));
                    }
                }
                StrokeEvent::PenUp => {
                    if let Some(mut stroke) = open.take() {
                        stroke.closed = true;
                        strokes.push(stroke);
                    }
                }
            }
        }

        if let Some(stroke) = open {
            strokes.push(stroke);
        }
        strokes
    }
}

impl<'a> IntoIterator for &'a StrokeLog {
    type Item = &'a StrokeEvent;
    type IntoIter = std::slice::Iter<'a, StrokeEvent>;

    fn into_iter(self) -> Self::IntoIter {
        self.events.iter()
    }
}

impl FromIterator<StrokeEvent> for StrokeLog {
    fn from_iter<I: IntoIterator<Item = StrokeEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
