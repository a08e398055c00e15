//! Round state machine
//!
//! Owns everything a round needs and drives the `Drawing -> Revealed`
//! lifecycle:
//! - Input is captured into the [`StrokeLog`] while drawing, with no ink
//! - The timer counts down once per tick and reveals at zero
//! - Reveal stops the timer, closes any open stroke, disables capture and
//!   replays the log onto the display surface
//!
//! Host callbacks (pointer events, interval ticks, menu actions) become plain
//! method calls here. Nothing is global and nothing is shared.

mod canvas_ops;
mod events;
mod input;
mod prompt;
mod timer;

use blindsketch_config::{Difficulty, GameConfig};
use thiserror::Error;
use tracing::{debug, info};

use crate::capture::CaptureSurface;
use crate::log::StrokeLog;
use crate::replay::{ReplayRenderer, ReplayStats};
use crate::surface::DisplaySurface;
use crate::types::{Color, ToolState};
use crate::validation::{ValidationError, validate_brush_width, validate_canvas_size};

pub use canvas_ops::fit_within;
pub use events::{RevealCause, RoundEvent, RoundObserver};
pub use prompt::{Prompt, PromptDeck, PromptSource, RoundSetup};
pub use timer::{ManualTimer, TimerSource};

#[derive(Debug, Error, PartialEq)]
pub enum RoundError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Canvas size is frozen once drawing has started")]
    CanvasFrozen,
}

/// Format seconds as `MM:SS`. Negative values show as `00:00`.
pub fn format_clock(secs: i32) -> String {
    let secs = secs.max(0);
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Round lifecycle phase. `Revealed` is terminal until restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundPhase {
    #[default]
    Drawing,
    Revealed,
}

/// Per-round state, replaced wholesale on restart
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub phase: RoundPhase,
    pub time_remaining: i32,
    pub difficulty: Difficulty,
    pub tool: ToolState,
    pub prompt: Prompt,
    /// Timer suspended because the page is hidden
    pub paused: bool,
}

impl RoundState {
    fn fresh(setup: RoundSetup, tool: ToolState) -> Self {
        Self {
            phase: RoundPhase::Drawing,
            time_remaining: setup.difficulty.initial_seconds(),
            difficulty: setup.difficulty,
            tool,
            prompt: setup.prompt,
            paused: false,
        }
    }
}

/// The round: log, capture surface, renderer, display surface and timer.
pub struct RoundStateMachine<S: DisplaySurface, T: TimerSource> {
    pub(crate) config: GameConfig,
    pub(crate) state: RoundState,
    pub(crate) log: StrokeLog,
    pub(crate) capture: CaptureSurface,
    pub(crate) renderer: ReplayRenderer,
    pub(crate) surface: S,
    timer: T,
    /// Whether `timer` was started and not yet stopped
    timer_running: bool,
    observers: Vec<Box<dyn RoundObserver>>,
    default_tool: ToolState,
    round_id: u64,
    renders: usize,
}

impl<S: DisplaySurface, T: TimerSource> RoundStateMachine<S, T> {
    /// Size the surface from `config` and start the first round.
    pub fn new(config: GameConfig, setup: RoundSetup, mut surface: S, timer: T) -> Result<Self, RoundError> {
        validate_canvas_size(config.canvas.width, config.canvas.height)?;
        validate_canvas_size(config.canvas.max_width, config.canvas.max_height)?;
        let color: Color = config.brush.default_color.parse()?;
        let width = validate_brush_width(config.brush.default_width, &config.brush)?;
        let default_tool = ToolState {
            color,
            width: width as f32,
        };

        surface.set_size(config.canvas.width, config.canvas.height);
        surface.clear();

        let mut machine = Self {
            state: RoundState::fresh(setup, default_tool),
            config,
            log: StrokeLog::new(),
            capture: CaptureSurface::new(),
            renderer: ReplayRenderer::new(),
            surface,
            timer,
            timer_running: false,
            observers: Vec::new(),
            default_tool,
            round_id: 1,
            renders: 0,
        };
        machine.begin_round();
        Ok(machine)
    }

    pub fn add_observer<O: RoundObserver + 'static>(&mut self, observer: O) {
        self.observers.push(Box::new(observer));
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &RoundState {
        &self.state
    }

    pub fn phase(&self) -> RoundPhase {
        self.state.phase
    }

    pub fn time_remaining(&self) -> i32 {
        self.state.time_remaining
    }

    pub fn log(&self) -> &StrokeLog {
        &self.log
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    /// Increments on every restart
    pub fn round_id(&self) -> u64 {
        self.round_id
    }

    /// Number of times the log has been replayed onto the surface
    pub fn render_count(&self) -> usize {
        self.renders
    }

    /// True while pointer input reaches the log
    pub fn is_capturing(&self) -> bool {
        self.state.phase == RoundPhase::Drawing && self.capture.is_enabled()
    }

    /// Countdown as `MM:SS`
    pub fn timer_label(&self) -> String {
        format_clock(self.state.time_remaining)
    }

    /// True in the last few seconds of a drawing round
    pub fn is_warning(&self) -> bool {
        self.state.phase == RoundPhase::Drawing
            && self.state.time_remaining <= self.config.timer.warning_threshold_secs
    }

    /// Advance the countdown by one interval.
    ///
    /// Ignored unless the round is drawing and its timer is running, so a
    /// tick queued before a stop cannot leak into the next round.
    pub fn tick(&mut self) {
        if !self.timer_running || self.state.phase != RoundPhase::Drawing {
            debug!(round_id = self.round_id, "stale tick ignored");
            return;
        }

        self.state.time_remaining -= 1;
        let remaining = self.state.time_remaining;
        self.emit(RoundEvent::Tick { remaining });

        if remaining <= 0 {
            self.reveal(RevealCause::TimeUp);
        } else if remaining <= self.config.timer.low_time_threshold_secs {
            self.emit(RoundEvent::LowTime { remaining });
        }
    }

    /// Reveal the drawing. Returns false if the round was already revealed.
    pub fn request_reveal(&mut self) -> bool {
        self.reveal(RevealCause::Requested)
    }

    /// Discard the round and start a fresh one from `setup`.
    pub fn restart(&mut self, setup: RoundSetup) {
        self.stop_timer();
        if let Some(event) = self.capture.reset() {
            self.emit(RoundEvent::Stroke(event));
        }
        self.log.clear();
        self.surface.clear();

        self.round_id += 1;
        self.state = RoundState::fresh(setup, self.default_tool);
        self.emit(RoundEvent::Restarted {
            round_id: self.round_id,
        });
        self.begin_round();
    }

    /// Restart with whatever `source` picks next
    pub fn restart_from<P: PromptSource + ?Sized>(&mut self, source: &mut P) {
        let setup = source.next_round();
        self.restart(setup);
    }

    /// Empty the log while drawing. Returns false after reveal.
    pub fn clear_canvas(&mut self) -> bool {
        if self.state.phase != RoundPhase::Drawing {
            debug!("clear ignored after reveal");
            return false;
        }
        if let Some(event) = self.capture.reset() {
            self.emit(RoundEvent::Stroke(event));
        }
        self.log.clear();
        self.surface.clear();
        self.emit(RoundEvent::Cleared);
        true
    }

    /// Suspend the countdown without revealing (page hidden).
    pub fn pause(&mut self) {
        if self.state.phase != RoundPhase::Drawing || self.state.paused {
            return;
        }
        self.state.paused = true;
        self.stop_timer();
        info!(round_id = self.round_id, remaining = self.state.time_remaining, "round paused");
        self.emit(RoundEvent::Paused);
    }

    /// Resume the countdown if the round is still drawing with time left.
    pub fn resume(&mut self) {
        if !self.state.paused {
            return;
        }
        self.state.paused = false;
        if self.state.phase == RoundPhase::Drawing && self.state.time_remaining > 0 {
            self.start_timer();
        }
        info!(round_id = self.round_id, "round resumed");
        self.emit(RoundEvent::Resumed);
    }

    fn begin_round(&mut self) {
        self.capture.set_enabled(true);
        info!(
            round_id = self.round_id,
            difficulty = self.state.difficulty.as_str(),
            seconds = self.state.time_remaining,
            prompt = %self.state.prompt.title,
            "round started"
        );
        self.emit(RoundEvent::Started {
            round_id: self.round_id,
            difficulty: self.state.difficulty,
            time_remaining: self.state.time_remaining,
            prompt_title: self.state.prompt.title.clone(),
        });
        self.start_timer();
    }

    fn reveal(&mut self, cause: RevealCause) -> bool {
        if self.state.phase == RoundPhase::Revealed {
            debug!(?cause, "reveal ignored, round already revealed");
            return false;
        }

        self.state.phase = RoundPhase::Revealed;
        self.state.paused = false;
        self.stop_timer();

        if let Some(event) = self.capture.finish_open_stroke(&mut self.log) {
            self.emit(RoundEvent::Stroke(event));
        }
        self.capture.set_enabled(false);

        let stats = self.render();
        info!(
            round_id = self.round_id,
            ?cause,
            strokes = stats.strokes,
            remaining = self.state.time_remaining,
            "round revealed"
        );
        self.emit(RoundEvent::Revealed { cause, stats });
        true
    }

    pub(crate) fn render(&mut self) -> ReplayStats {
        self.renders += 1;
        self.renderer.render(&self.log, &mut self.surface)
    }

    fn start_timer(&mut self) {
        if self.timer_running {
            return;
        }
        self.timer.start_ticking(self.config.timer.tick_interval_secs);
        self.timer_running = true;
    }

    fn stop_timer(&mut self) {
        if !self.timer_running {
            return;
        }
        self.timer.stop();
        self.timer_running = false;
    }

    pub(crate) fn emit(&mut self, event: RoundEvent) {
        for observer in &mut self.observers {
            observer.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::capture::{ElementRect, InputEvent, InputSource, RawPointer};
    use crate::surface::{PathCommand, RecordingSurface};
    use crate::types::StrokeEvent;

    type TestRound = RoundStateMachine<RecordingSurface, ManualTimer>;

    const RECT: ElementRect = ElementRect::new(0.0, 0.0, 400.0, 400.0);

    fn setup(difficulty: Difficulty) -> RoundSetup {
        RoundSetup::new(Prompt::new("cat", "A cat"), difficulty)
    }

    fn round(difficulty: Difficulty) -> TestRound {
        RoundStateMachine::new(
            GameConfig::default(),
            setup(difficulty),
            RecordingSurface::new(1, 1),
            ManualTimer::new(),
        )
        .unwrap()
    }

    fn record_events(round: &mut TestRound) -> Rc<RefCell<Vec<RoundEvent>>> {
        let events = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&events);
        round.add_observer(move |event: &RoundEvent| sink.borrow_mut().push(event.clone()));
        events
    }

    fn down(x: f32, y: f32) -> InputEvent {
        InputEvent::Down {
            source: InputSource::Mouse,
            at: RawPointer::new(x, y, RECT),
        }
    }

    fn drag(x: f32, y: f32) -> InputEvent {
        InputEvent::Move {
            source: InputSource::Mouse,
            at: RawPointer::new(x, y, RECT),
        }
    }

    fn up() -> InputEvent {
        InputEvent::Up {
            source: InputSource::Mouse,
        }
    }

    #[test]
    fn test_new_round_starts_drawing() {
        let round = round(Difficulty::Medium);
        assert_eq!(round.phase(), RoundPhase::Drawing);
        assert_eq!(round.time_remaining(), 30);
        assert_eq!(round.surface().size(), (400, 400));
        assert!(round.timer().is_running());
        assert!(round.is_capturing());
        assert!(round.log().is_empty());
    }

    #[test]
    fn test_invalid_default_tool_is_rejected() {
        let mut config = GameConfig::default();
        config.brush.default_color = "nope".into();
        let result = RoundStateMachine::new(
            config,
            setup(Difficulty::Easy),
            RecordingSurface::new(1, 1),
            ManualTimer::new(),
        );
        assert!(matches!(
            result,
            Err(RoundError::Validation(ValidationError::InvalidColor(_)))
        ));
    }

    #[test]
    fn test_scenario_single_black_stroke() {
        let mut round = round(Difficulty::Medium);

        round.handle_input(down(10.0, 10.0));
        round.handle_input(drag(20.0, 20.0));
        round.handle_input(up());
        assert!(round.request_reveal());

        assert_eq!(
            round.surface().commands(),
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

        let before = round.log().clone();
        round.handle_input(down(50.0, 50.0));
        round.handle_input(drag(60.0, 60.0));
        round.handle_input(up());
        assert_eq!(round.log(), &before);
    }

    #[test]
    fn test_thirty_ticks_reveal_exactly_once() {
        let mut round = round(Difficulty::Medium);
        let events = record_events(&mut round);

        for _ in 0..30 {
            round.tick();
        }
        for _ in 0..5 {
            round.tick();
        }

        assert_eq!(round.phase(), RoundPhase::Revealed);
        assert!(round.time_remaining() <= 0);
        assert_eq!(round.render_count(), 1);
        assert_eq!(round.timer().stop_count(), 1);

        let reveals: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                RoundEvent::Revealed { cause, .. } => Some(*cause),
                _ => None,
            })
            .collect();
        assert_eq!(reveals, vec![RevealCause::TimeUp]);
    }

    #[test]
    fn test_low_time_cues() {
        let mut round = round(Difficulty::Easy);
        let events = record_events(&mut round);

        for _ in 0..20 {
            round.tick();
        }

        let cues: Vec<_> = events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                RoundEvent::LowTime { remaining } => Some(*remaining),
                _ => None,
            })
            .collect();
        assert_eq!(cues, vec![3, 2, 1]);
    }

    #[test]
    fn test_reveal_is_idempotent() {
        let mut round = round(Difficulty::Medium);
        assert!(round.request_reveal());
        assert!(!round.request_reveal());
        round.tick();

        assert_eq!(round.render_count(), 1);
        assert_eq!(round.timer().stop_count(), 1);
        assert!(!round.is_capturing());
    }

    #[test]
    fn test_reveal_closes_open_stroke() {
        let mut round = round(Difficulty::Medium);
        round.handle_input(down(5.0, 5.0));
        round.handle_input(drag(6.0, 6.0));

        round.request_reveal();

        assert_eq!(round.log().events().last(), Some(&StrokeEvent::PenUp));
        assert!(!round.log().has_open_stroke());
        assert_eq!(round.surface().path_count(), 1);
    }

    #[test]
    fn test_restart_resets_round() {
        let mut round = round(Difficulty::Medium);
        let events = record_events(&mut round);
        round.handle_input(down(1.0, 1.0));
        round.handle_input(up());
        round.tick();
        round.request_reveal();

        round.restart(setup(Difficulty::Hard));

        assert!(round.log().is_empty());
        assert_eq!(round.phase(), RoundPhase::Drawing);
        assert_eq!(round.time_remaining(), 45);
        assert_eq!(round.round_id(), 2);
        assert!(round.is_capturing());
        assert!(round.timer().is_running());
        assert_eq!(round.timer().start_count(), 2);
        assert_eq!(round.timer().stop_count(), 1);
        assert!(events.borrow().contains(&RoundEvent::Restarted { round_id: 2 }));
    }

    #[test]
    fn test_restart_mid_round_stops_timer_once() {
        let mut round = round(Difficulty::Medium);
        round.restart(setup(Difficulty::Easy));
        assert_eq!(round.timer().stop_count(), 1);
        assert_eq!(round.time_remaining(), 20);
    }

    #[test]
    fn test_restart_from_prompt_deck() {
        let mut round = round(Difficulty::Medium);
        let mut deck = PromptDeck::new(vec![Prompt::new("tree", "A tree")], Difficulty::Easy);

        round.restart_from(&mut deck);

        assert_eq!(round.state().prompt.id, "tree");
        assert_eq!(round.state().difficulty, Difficulty::Easy);
    }

    #[test]
    fn test_restart_restores_default_tool() {
        let mut round = round(Difficulty::Medium);
        round.select_color(Color::rgb(255, 0, 0));
        round.select_brush_width(12).unwrap();

        round.restart(setup(Difficulty::Medium));

        assert_eq!(round.state().tool, ToolState::default());
    }

    #[test]
    fn test_clear_canvas_only_while_drawing() {
        let mut round = round(Difficulty::Medium);
        let events = record_events(&mut round);
        round.handle_input(down(1.0, 1.0));
        round.handle_input(drag(2.0, 2.0));

        assert!(round.clear_canvas());
        assert!(round.log().is_empty());
        assert!(events.borrow().contains(&RoundEvent::Cleared));

        // The aborted stroke does not continue
        round.handle_input(drag(3.0, 3.0));
        assert!(round.log().is_empty());

        round.handle_input(down(4.0, 4.0));
        round.handle_input(up());
        round.request_reveal();
        assert!(!round.clear_canvas());
        assert_eq!(round.log().len(), 2);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut round = round(Difficulty::Medium);
        round.pause();
        assert!(round.state().paused);
        assert!(!round.timer().is_running());

        round.tick();
        assert_eq!(round.time_remaining(), 30);

        round.resume();
        assert!(round.timer().is_running());
        round.tick();
        assert_eq!(round.time_remaining(), 29);
    }

    #[test]
    fn test_pause_after_reveal_is_noop() {
        let mut round = round(Difficulty::Medium);
        round.request_reveal();
        round.pause();
        round.resume();
        assert!(!round.state().paused);
        assert!(!round.timer().is_running());
        assert_eq!(round.timer().start_count(), 1);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(45), "00:45");
        assert_eq!(format_clock(125), "02:05");
        assert_eq!(format_clock(-3), "00:00");
    }

    #[test]
    fn test_timer_label_and_warning() {
        let mut round = round(Difficulty::Easy);
        assert_eq!(round.timer_label(), "00:20");
        assert!(!round.is_warning());

        for _ in 0..10 {
            round.tick();
        }
        assert_eq!(round.timer_label(), "00:10");
        assert!(round.is_warning());
    }
}
