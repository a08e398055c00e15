//! Pointer input and tool selection for the round

use tracing::debug;

use crate::capture::{InputEvent, RawPointer};
use crate::log::StrokeLogEvent;
use crate::surface::DisplaySurface;
use crate::types::{Color, ToolState};
use crate::validation::validate_brush_width;

use super::{RoundError, RoundEvent, RoundPhase, RoundStateMachine, TimerSource};

impl<S: DisplaySurface, T: TimerSource> RoundStateMachine<S, T> {
    /// Feed one pointer or touch event to the capture surface.
    ///
    /// Ignored once the round is revealed.
    pub fn handle_input(&mut self, event: InputEvent) {
        if self.state.phase != RoundPhase::Drawing {
            debug!(?event, "input ignored, round not drawing");
            return;
        }
        let canvas_size = self.surface.size();
        let events = self
            .capture
            .handle(event, canvas_size, self.state.tool, &mut self.log);
        self.emit_strokes(events);
    }

    pub fn on_pointer_down(&mut self, raw: RawPointer) {
        if self.state.phase != RoundPhase::Drawing {
            return;
        }
        let canvas_size = self.surface.size();
        let events = self
            .capture
            .on_pointer_down(raw, canvas_size, self.state.tool, &mut self.log);
        self.emit_strokes(events);
    }

    pub fn on_pointer_move(&mut self, raw: RawPointer) {
        if self.state.phase != RoundPhase::Drawing {
            return;
        }
        let canvas_size = self.surface.size();
        self.capture
            .on_pointer_move(raw, canvas_size, self.state.tool, &mut self.log);
    }

    pub fn on_pointer_up(&mut self) {
        if self.state.phase != RoundPhase::Drawing {
            return;
        }
        let events = self.capture.on_pointer_up(&mut self.log);
        self.emit_strokes(events);
    }

    pub fn tool(&self) -> ToolState {
        self.state.tool
    }

    /// Set the ink color for subsequent samples. Legal in either phase.
    pub fn select_color(&mut self, color: Color) {
        self.state.tool.color = color;
    }

    /// Parse and select a `#rrggbb`, `#rgb` or `rgb(r, g, b)` color.
    pub fn select_color_str(&mut self, color: &str) -> Result<Color, RoundError> {
        let color: Color = color.parse()?;
        self.select_color(color);
        Ok(color)
    }

    /// Set the brush width, rejecting values outside the configured bounds.
    pub fn select_brush_width(&mut self, width: u32) -> Result<(), RoundError> {
        let width = validate_brush_width(width, &self.config.brush)?;
        self.state.tool.width = width as f32;
        Ok(())
    }

    fn emit_strokes(&mut self, events: impl IntoIterator<Item = StrokeLogEvent>) {
        for event in events {
            self.emit(RoundEvent::Stroke(event));
        }
    }
}
