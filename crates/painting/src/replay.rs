//! Replay renderer - reconstructs the visible drawing from the stroke log

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::REVEAL_OPACITY;
use crate::log::StrokeLog;
use crate::surface::DisplaySurface;
use crate::types::{Color, StrokeEvent};

/// What a replay produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplayStats {
    /// Paths begun (one per pen-down)
    pub strokes: usize,
    /// Positioned entries drawn (pen-down + pen-move)
    pub points: usize,
    /// Segments committed (one per pen-move inside a stroke)
    pub segments: usize,
    /// Entries skipped because no stroke was open
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
struct OpenPath {
    color: Color,
    width: f32,
}

/// Paints a [`StrokeLog`] onto a [`DisplaySurface`] at full opacity.
///
/// Each stroke uses the color and width stored on its own entries, never the
/// live tool state. Rendering only reads the log, so it can be repeated (for
/// example after a re-layout) with identical output on a surface of the same
/// size.
#[derive(Debug, Default, Clone, Copy)]
pub struct ReplayRenderer;

impl ReplayRenderer {
    pub fn new() -> Self {
        Self
    }

    /// Clear `surface` and draw every stroke in `log`, in log order.
    pub fn render<S: DisplaySurface + ?Sized>(&self, log: &StrokeLog, surface: &mut S) -> ReplayStats {
        let mut stats = ReplayStats::default();
        let mut open: Option<OpenPath> = None;

        surface.clear();

        for event in log {
            match *event {
                StrokeEvent::PenDown { x, y, color, width } => {
                    surface.begin_path();
                    surface.move_to(x, y);
                    open = Some(OpenPath { color, width });
                    stats.strokes += 1;
                    stats.points += 1;
                }
                StrokeEvent::PenMove { x, y, .. } => {
                    let Some(path) = open else {
                        stats.skipped += 1;
                        continue;
                    };
                    surface.line_to(x, y);
                    surface.stroke_path(path.color, path.width, REVEAL_OPACITY);
                    stats.points += 1;
                    stats.segments += 1;
                }
                StrokeEvent::PenUp => {
                    if open.take().is_none() {
                        stats.skipped += 1;
                    }
                }
            }
        }

        if stats.skipped > 0 {
            debug!(skipped = stats.skipped, "replay skipped entries with no open stroke");
        }
        info!(
            strokes = stats.strokes,
            points = stats.points,
            "replayed stroke log"
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::RasterSurface;
    use crate::surface::{PathCommand, RecordingSurface};
    use crate::types::{CanvasPoint, ToolState};

    fn tool(color: Color, width: f32) -> ToolState {
        ToolState { color, width }
    }

    fn log_of(strokes: &[(Vec<(f32, f32)>, ToolState)]) -> StrokeLog {
        let mut log = StrokeLog::new();
        for (points, t) in strokes {
            let (first, rest) = points.split_first().unwrap();
            log.append(StrokeEvent::pen_down(CanvasPoint::new(first.0, first.1), *t));
            for &(x, y) in rest.iter() {
                log.append(StrokeEvent::pen_move(CanvasPoint::new(x, y), *t));
            }
            log.append(StrokeEvent::PenUp);
        }
        log
    }

    #[test]
    fn test_single_stroke_commands() {
        let log = log_of(&[(vec![(10.0, 10.0), (20.0, 20.0)], tool(Color::BLACK, 5.0))]);
        let mut surface = RecordingSurface::new(400, 400);

        let stats = ReplayRenderer::new().render(&log, &mut surface);

        assert_eq!(
            surface.commands(),
            &[
                PathCommand::Clear,
                PathCommand::BeginPath,
                PathCommand::MoveTo { x: 10.0, y: 10.0 },
                PathCommand::LineTo { x: 20.0, y: 20.0 },
                PathCommand::Stroke {
                    color: Color::BLACK,
                    width: 5.0,
                    opacity: 1.0
                },
            ]
        );
        assert_eq!(
            stats,
            ReplayStats {
                strokes: 1,
                points: 2,
                segments: 1,
                skipped: 0
            }
        );
    }

    #[test]
    fn test_stroke_count_matches_pen_downs() {
        let log = log_of(&[
            (vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)], tool(Color::BLACK, 1.0)),
            (vec![(5.0, 5.0)], tool(Color::rgb(0, 0, 255), 3.0)),
            (vec![(7.0, 7.0), (8.0, 9.0)], tool(Color::rgb(0, 255, 0), 20.0)),
        ]);
        let mut surface = RecordingSurface::new(50, 50);

        let stats = ReplayRenderer::new().render(&log, &mut surface);

        assert_eq!(stats.strokes, log.stroke_count());
        assert_eq!(surface.path_count(), 3);
        assert_eq!(stats.points, log.point_count());
        assert_eq!(surface.vertex_count(), 6);
    }

    #[test]
    fn test_each_stroke_uses_its_own_tool_state() {
        let red = tool(Color::rgb(255, 0, 0), 2.0);
        let blue = tool(Color::rgb(0, 0, 255), 8.0);
        let log = log_of(&[(vec![(0.0, 0.0), (1.0, 0.0)], red), (vec![(0.0, 5.0), (1.0, 5.0)], blue)]);
        let mut surface = RecordingSurface::new(10, 10);

        ReplayRenderer::new().render(&log, &mut surface);

        let strokes: Vec<_> = surface
            .commands()
            .iter()
            .filter_map(|c| match *c {
                PathCommand::Stroke { color, width, .. } => Some((color, width)),
                _ => None,
            })
            .collect();
        assert_eq!(strokes, vec![(red.color, red.width), (blue.color, blue.width)]);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let log = log_of(&[
            (vec![(3.0, 4.0), (5.0, 6.0), (7.0, 8.0)], tool(Color::BLACK, 4.0)),
            (vec![(30.0, 40.0), (50.0, 60.0)], tool(Color::WHITE, 2.0)),
        ]);
        let mut surface = RecordingSurface::new(100, 100);
        let renderer = ReplayRenderer::new();

        renderer.render(&log, &mut surface);
        let first = surface.commands().to_vec();
        renderer.render(&log, &mut surface);

        assert_eq!(surface.commands(), first.as_slice());
    }

    #[test]
    fn test_orphan_entries_are_skipped() {
        let t = ToolState::default();
        let log: StrokeLog = [
            StrokeEvent::pen_move(CanvasPoint::new(1.0, 1.0), t),
            StrokeEvent::PenUp,
            StrokeEvent::pen_down(CanvasPoint::new(2.0, 2.0), t),
            StrokeEvent::pen_move(CanvasPoint::new(3.0, 3.0), t),
            StrokeEvent::PenUp,
        ]
        .into_iter()
        .collect();
        let mut surface = RecordingSurface::new(10, 10);

        let stats = ReplayRenderer::new().render(&log, &mut surface);

        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.strokes, 1);
        assert_eq!(surface.vertex_count(), 2);
    }

    #[test]
    fn test_render_does_not_touch_log() {
        let log = log_of(&[(vec![(1.0, 1.0), (2.0, 2.0)], ToolState::default())]);
        let before = log.clone();
        ReplayRenderer::new().render(&log, &mut RecordingSurface::new(10, 10));
        assert_eq!(log, before);
    }

    #[test]
    fn test_raster_replay_reveals_ink() {
        let log = log_of(&[(vec![(10.0, 10.0), (20.0, 20.0)], tool(Color::BLACK, 5.0))]);
        let mut surface = RasterSurface::new(32, 32);

        ReplayRenderer::new().render(&log, &mut surface);

        assert_eq!(surface.get_pixel(15, 15), Some([0, 0, 0, 255]));
        assert_eq!(surface.get_pixel(30, 2), Some([0, 0, 0, 0]));
    }
}
