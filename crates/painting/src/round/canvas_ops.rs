//! Canvas geometry and re-rendering for the round

use tracing::debug;

use crate::replay::ReplayStats;
use crate::surface::DisplaySurface;
use crate::validation::validate_canvas_size;

use super::{RoundError, RoundPhase, RoundStateMachine, TimerSource};

/// Scale `(width, height)` down to fit inside `(max_width, max_height)`,
/// keeping the aspect ratio. Sizes that already fit are returned unchanged.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (max_width, max_height) = (max_width.max(1), max_height.max(1));
    if width == 0 || height == 0 || (width <= max_width && height <= max_height) {
        return (width, height);
    }
    let scale = f64::min(
        max_width as f64 / width as f64,
        max_height as f64 / height as f64,
    );
    let fitted_w = ((width as f64 * scale).round() as u32).clamp(1, max_width);
    let fitted_h = ((height as f64 * scale).round() as u32).clamp(1, max_height);
    (fitted_w, fitted_h)
}

impl<S: DisplaySurface, T: TimerSource> RoundStateMachine<S, T> {
    /// Change the canvas pixel size.
    ///
    /// Only allowed before the first stroke of a drawing round: logged
    /// coordinates are in canvas pixels and would no longer line up.
    pub fn resize_canvas(&mut self, width: u32, height: u32) -> Result<(), RoundError> {
        validate_canvas_size(width, height)?;
        if self.state.phase != RoundPhase::Drawing || !self.log.is_empty() || self.capture.is_stroking() {
            return Err(RoundError::CanvasFrozen);
        }
        self.surface.set_size(width, height);
        self.surface.clear();
        debug!(width, height, "canvas resized");
        Ok(())
    }

    /// Size the canvas to a reference image, scaled down to the configured
    /// maximum. Returns the size applied.
    pub fn fit_to_reference(&mut self, image_width: u32, image_height: u32) -> Result<(u32, u32), RoundError> {
        let (width, height) = fit_within(
            image_width,
            image_height,
            self.config.canvas.max_width,
            self.config.canvas.max_height,
        );
        self.resize_canvas(width, height)?;
        Ok((width, height))
    }

    /// Replay the log again after reveal. `None` while drawing.
    pub fn redraw(&mut self) -> Option<ReplayStats> {
        if self.state.phase != RoundPhase::Revealed {
            debug!("redraw ignored while drawing");
            return None;
        }
        Some(self.render())
    }
}

#[cfg(test)]
mod tests {
    use blindsketch_config::{Difficulty, GameConfig};

    use super::*;
    use crate::capture::{ElementRect, RawPointer};
    use crate::round::{ManualTimer, Prompt, RoundSetup};
    use crate::surface::RecordingSurface;
    use crate::validation::ValidationError;

    fn round() -> RoundStateMachine<RecordingSurface, ManualTimer> {
        RoundStateMachine::new(
            GameConfig::default(),
            RoundSetup::new(Prompt::free_draw(), Difficulty::Medium),
            RecordingSurface::new(1, 1),
            ManualTimer::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_fit_within() {
        assert_eq!(fit_within(800, 600, 400, 400), (400, 300));
        assert_eq!(fit_within(600, 800, 400, 400), (300, 400));
        assert_eq!(fit_within(200, 100, 400, 400), (200, 100));
        assert_eq!(fit_within(1000, 1, 400, 400), (400, 1));
        assert_eq!(fit_within(800, 600, 0, 0), (1, 1));
    }

    #[test]
    fn test_zero_max_canvas_is_rejected_at_setup() {
        let mut config = GameConfig::default();
        config.canvas.max_width = 0;
        config.canvas.max_height = 0;

        let result = RoundStateMachine::new(
            config,
            RoundSetup::new(Prompt::free_draw(), Difficulty::Medium),
            RecordingSurface::new(1, 1),
            ManualTimer::new(),
        );

        assert!(matches!(
            result,
            Err(RoundError::Validation(ValidationError::InvalidCanvasSize { .. }))
        ));
    }

    #[test]
    fn test_resize_before_first_stroke() {
        let mut round = round();
        round.resize_canvas(300, 200).unwrap();
        assert_eq!(round.surface().size(), (300, 200));

        assert_eq!(round.fit_to_reference(1024, 768), Ok((400, 300)));
        assert_eq!(round.surface().size(), (400, 300));
    }

    #[test]
    fn test_resize_frozen_after_first_stroke() {
        let mut round = round();
        let rect = ElementRect::new(0.0, 0.0, 400.0, 400.0);
        round.on_pointer_down(RawPointer::new(10.0, 10.0, rect));

        assert_eq!(round.resize_canvas(300, 300), Err(RoundError::CanvasFrozen));
        assert_eq!(round.surface().size(), (400, 400));
    }

    #[test]
    fn test_resize_frozen_after_reveal() {
        let mut round = round();
        round.request_reveal();
        assert_eq!(round.fit_to_reference(200, 200), Err(RoundError::CanvasFrozen));
    }

    #[test]
    fn test_resize_rejects_zero_size() {
        let mut round = round();
        assert_eq!(
            round.resize_canvas(0, 10),
            Err(RoundError::Validation(ValidationError::InvalidCanvasSize {
                width: 0,
                height: 10
            }))
        );
    }

    #[test]
    fn test_redraw_only_after_reveal() {
        let mut round = round();
        let rect = ElementRect::new(0.0, 0.0, 400.0, 400.0);
        round.on_pointer_down(RawPointer::new(10.0, 10.0, rect));
        round.on_pointer_move(RawPointer::new(30.0, 10.0, rect));
        round.on_pointer_up();
        assert_eq!(round.redraw(), None);

        round.request_reveal();
        let first = round.surface().commands().to_vec();
        let stats = round.redraw().unwrap();

        assert_eq!(stats.strokes, 1);
        assert_eq!(round.render_count(), 2);
        assert_eq!(round.surface().commands(), first.as_slice());
    }
}
