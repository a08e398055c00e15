//! Display surface abstraction the replay renderer draws into.

use crate::types::Color;

/// Path-based drawing target, shaped after the browser 2D context.
///
/// The core only issues commands and reads the pixel size; it never reads
/// pixels back. `stroke_path` commits the current path with round caps and
/// joins at the given opacity.
pub trait DisplaySurface {
    /// Erase every pixel.
    fn clear(&mut self);
    /// Discard the current path and start an empty one.
    fn begin_path(&mut self);
    /// Start a new sub-path at `(x, y)`.
    fn move_to(&mut self, x: f32, y: f32);
    /// Extend the current sub-path with a straight segment to `(x, y)`.
    fn line_to(&mut self, x: f32, y: f32);
    /// Paint the current path.
    fn stroke_path(&mut self, color: Color, width: f32, opacity: f32);
    /// Pixel dimensions `(width, height)`.
    fn size(&self) -> (u32, u32);
    /// Replace the pixel buffer with an empty one of the given size.
    fn set_size(&mut self, width: u32, height: u32);
}

/// A single recorded surface call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathCommand {
    Clear,
    BeginPath,
    MoveTo { x: f32, y: f32 },
    LineTo { x: f32, y: f32 },
    Stroke { color: Color, width: f32, opacity: f32 },
}

/// Surface that records commands instead of drawing.
///
/// Useful as a headless target and for comparing two replays command by command.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    commands: Vec<PathCommand>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            commands: Vec::new(),
        }
    }

    /// Commands issued since the last `clear()` (the clear itself included).
    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    /// Drop the history without issuing a surface clear.
    pub fn reset_history(&mut self) {
        self.commands.clear();
    }

    /// Number of paths begun.
    pub fn path_count(&self) -> usize {
        self.count(|c| matches!(c, PathCommand::BeginPath))
    }

    /// Number of positioned commands (`MoveTo` + `LineTo`).
    pub fn vertex_count(&self) -> usize {
        self.count(|c| matches!(c, PathCommand::MoveTo { .. } | PathCommand::LineTo { .. }))
    }

    /// Number of `Stroke` commands.
    pub fn stroke_call_count(&self) -> usize {
        self.count(|c| matches!(c, PathCommand::Stroke { .. }))
    }

    fn count(&self, pred: impl Fn(&PathCommand) -> bool) -> usize {
        self.commands.iter().filter(|c| pred(*c)).count()
    }
}

impl DisplaySurface for RecordingSurface {
    fn clear(&mut self) {
        self.commands.clear();
        self.commands.push(PathCommand::Clear);
    }

    fn begin_path(&mut self) {
        self.commands.push(PathCommand::BeginPath);
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::MoveTo { x, y });
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.commands.push(PathCommand::LineTo { x, y });
    }

    fn stroke_path(&mut self, color: Color, width: f32, opacity: f32) {
        self.commands.push(PathCommand::Stroke {
            color,
            width,
            opacity,
        });
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.commands.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_surface_counts() {
        let mut surface = RecordingSurface::new(100, 50);
        surface.clear();
        surface.begin_path();
        surface.move_to(1.0, 1.0);
        surface.line_to(2.0, 2.0);
        surface.stroke_path(Color::BLACK, 3.0, 1.0);

        assert_eq!(surface.size(), (100, 50));
        assert_eq!(surface.path_count(), 1);
        assert_eq!(surface.vertex_count(), 2);
        assert_eq!(surface.stroke_call_count(), 1);
        assert_eq!(surface.commands()[0], PathCommand::Clear);
    }

    #[test]
    fn test_clear_drops_history() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.begin_path();
        surface.clear();
        assert_eq!(surface.commands(), &[PathCommand::Clear]);
    }

    #[test]
    fn test_set_size() {
        let mut surface = RecordingSurface::new(10, 10);
        surface.begin_path();
        surface.set_size(30, 20);
        assert_eq!(surface.size(), (30, 20));
        assert!(surface.commands().is_empty());
    }
}
