//! Page-facing game host
//!
//! Wraps the round state machine with the prompt deck and translates page
//! messages into round operations. Everything the page should hear about is
//! queued as [`GameToUi`] and drained by the caller after each call.

use std::cell::RefCell;
use std::rc::Rc;

use blindsketch_config::{GameConfig, ScoringConfig};
use blindsketch_ipc::{GameToUi, RoundInfo, ScoreReport, ScoreRequest, ToolInfo, UiToGame};
use painting::{
    DisplaySurface, PromptDeck, PromptSource, RoundError, RoundEvent, RoundPhase, RoundSetup, RoundStateMachine,
    TimerSource,
};
use tracing::{debug, warn};

pub struct Game<S: DisplaySurface, T: TimerSource> {
    round: RoundStateMachine<S, T>,
    prompts: PromptDeck,
    scoring: ScoringConfig,
    outbox: Rc<RefCell<Vec<GameToUi>>>,
    /// Round whose drawing was already handed to the scorer
    score_requested: Option<u64>,
    /// Round whose score was already announced
    score_reported: Option<u64>,
}

impl<S: DisplaySurface, T: TimerSource> Game<S, T> {
    pub fn new(
        config: GameConfig,
        scoring: ScoringConfig,
        mut prompts: PromptDeck,
        surface: S,
        timer: T,
    ) -> Result<Self, RoundError> {
        let timer_config = config.timer;
        let setup = prompts.next_round();
        let mut round = RoundStateMachine::new(config, setup, surface, timer)?;

        let outbox = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&outbox);
        round.add_observer(move |event: &RoundEvent| {
            if let Some(message) = GameToUi::from_round_event(event, &timer_config) {
                sink.borrow_mut().push(message);
            }
        });

        let game = Self {
            round,
            prompts,
            scoring,
            outbox,
            score_requested: None,
            score_reported: None,
        };
        game.announce_round();
        Ok(game)
    }

    pub fn round(&self) -> &RoundStateMachine<S, T> {
        &self.round
    }

    /// One interval of the countdown
    pub fn tick(&mut self) {
        self.round.tick();
        self.after_update();
    }

    /// Apply one page message
    pub fn apply(&mut self, message: UiToGame) {
        match message {
            UiToGame::Input(event) => self.round.handle_input(event),
            UiToGame::SelectColor { color } => match self.round.select_color_str(&color) {
                Ok(_) => self.push(GameToUi::ToolChanged(ToolInfo::from_tool(self.round.tool()))),
                Err(e) => self.push_error("invalid_color", &e),
            },
            UiToGame::SelectBrushWidth { width } => match self.round.select_brush_width(width) {
                Ok(()) => self.push(GameToUi::ToolChanged(ToolInfo::from_tool(self.round.tool()))),
                Err(e) => self.push_error("invalid_brush_width", &e),
            },
            UiToGame::Reveal => {
                self.round.request_reveal();
            }
            UiToGame::Restart { difficulty, prompt } => {
                if let Some(difficulty) = difficulty {
                    self.prompts.set_difficulty(difficulty);
                }
                let setup = match prompt {
                    Some(prompt) => RoundSetup::new(prompt, self.prompts.difficulty()),
                    None => self.prompts.next_round(),
                };
                self.round.restart(setup);
                self.announce_round();
            }
            UiToGame::ClearCanvas => {
                self.round.clear_canvas();
            }
            UiToGame::VisibilityChanged { hidden } => {
                if hidden {
                    self.round.pause();
                } else {
                    self.round.resume();
                }
            }
            UiToGame::ReferenceLoaded { width, height } => match self.round.fit_to_reference(width, height) {
                Ok((width, height)) => self.push(GameToUi::CanvasResized { width, height }),
                Err(RoundError::CanvasFrozen) => debug!(width, height, "reference loaded after drawing started"),
                Err(e) => self.push_error("invalid_reference_size", &e),
            },
            UiToGame::Redraw => {
                self.round.redraw();
            }
            UiToGame::ScoreResult { round_id, report } => match report.into_report() {
                Ok(report) => self.report_score(round_id, report, false),
                Err(e) => {
                    warn!(round_id, error = %e, "scorer returned an invalid report");
                    self.report_score(round_id, ScoreReport::fallback(&self.scoring), true);
                }
            },
            UiToGame::ScoreFailed { round_id, message } => {
                warn!(round_id, %message, "scoring failed");
                self.report_score(round_id, ScoreReport::fallback(&self.scoring), true);
            }
        }
        self.after_update();
    }

    /// The page did not answer a score request in time. Falls back unless
    /// the round was already scored.
    pub fn expire_score(&mut self, round_id: u64) {
        if self.score_requested == Some(round_id) && self.score_reported != Some(round_id) {
            warn!(round_id, timeout_secs = self.scoring.timeout_secs, "score request timed out");
        }
        self.report_score(round_id, ScoreReport::fallback(&self.scoring), true);
    }

    pub fn scoring_config(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Drain queued page messages
    pub fn take_messages(&mut self) -> Vec<GameToUi> {
        std::mem::take(&mut *self.outbox.borrow_mut())
    }

    fn after_update(&mut self) {
        let round_id = self.round.round_id();
        if self.round.phase() != RoundPhase::Revealed || self.score_requested == Some(round_id) {
            return;
        }
        self.score_requested = Some(round_id);

        let state = self.round.state();
        let request = ScoreRequest::for_round(
            round_id,
            &state.prompt,
            state.difficulty,
            self.round.surface().size(),
            self.round.log().stroke_count(),
        );
        self.push(GameToUi::ScoreRequested(request));
    }

    fn report_score(&mut self, round_id: u64, report: ScoreReport, fallback: bool) {
        if self.score_requested != Some(round_id) || self.score_reported == Some(round_id) {
            debug!(round_id, "stale score ignored");
            return;
        }
        self.score_reported = Some(round_id);
        self.push(GameToUi::ScoreReady {
            round_id,
            report,
            fallback,
        });
    }

    fn announce_round(&self) {
        let info = RoundInfo::from_state(self.round.round_id(), self.round.state());
        self.push(GameToUi::RoundStarted(info));
    }

    fn push(&self, message: GameToUi) {
        self.outbox.borrow_mut().push(message);
    }

    fn push_error(&self, code: &str, error: &RoundError) {
        self.push(GameToUi::Error {
            code: code.to_string(),
            message: error.to_string(),
        });
    }
}
