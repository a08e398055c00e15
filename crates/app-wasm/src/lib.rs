//! Blindsketch WASM build
//!
//! Hosts one game inside the page: a 2D canvas as the display surface, a
//! `setInterval` countdown and a CustomEvent bridge to the page UI.
//! The page loads the module, then calls [`start_game`] with its prompt list.

use std::cell::RefCell;
use std::time::Duration;

use blindsketch_config::{Difficulty, GameConfig, ScoringConfig};
use blindsketch_ipc::{GameToUi, UiToGame};
use painting::{Prompt, PromptDeck};
use tracing::debug;
use wasm_bindgen::prelude::*;

mod bridge;
mod canvas;
mod game;
mod input;
mod timer;

pub use bridge::{GAME_TO_UI_EVENT, UI_TO_GAME_EVENT};
pub use canvas::{CanvasSurface, SetupError};
pub use game::Game;
pub use timer::IntervalTimer;

/// Default id of the drawing canvas
pub const CANVAS_ID: &str = "drawing-canvas";

type BrowserGame = Game<CanvasSurface, IntervalTimer>;

thread_local! {
    static GAME: RefCell<Option<BrowserGame>> = const { RefCell::new(None) };
}

/// Main entry point for the WASM module
#[wasm_bindgen(start)]
pub fn main() {
    // Panics and tracing output go to the browser console
    #[cfg(target_arch = "wasm32")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default_with_config(
            tracing_wasm::WASMLayerConfigBuilder::new()
                .set_max_level(tracing::Level::INFO)
                .build(),
        );
    }

    if let Err(e) = bridge::init_bridge(pump) {
        web_sys::console::error_2(&"Failed to initialize bridge".into(), &e);
    }
}

/// Start the game on the canvas with id `canvas_id` (empty for the default).
///
/// `prompts_json` is a JSON array of prompts. `config_json` optionally
/// overrides the game config. The difficulty comes from the page's
/// `?difficulty=` query parameter.
#[wasm_bindgen]
pub fn start_game(canvas_id: &str, prompts_json: &str, config_json: Option<String>) -> Result<(), JsValue> {
    let started = GAME.with(|cell| cell.try_borrow().map(|slot| slot.is_some()).unwrap_or(true));
    if started {
        return Err(JsValue::from_str("game already started"));
    }

    let id = if canvas_id.is_empty() { CANVAS_ID } else { canvas_id };
    let canvas = canvas::find_canvas(id)?;
    let window = web_sys::window().ok_or(SetupError::NoWindow)?;
    let document = window.document().ok_or(SetupError::NoDocument)?;

    let difficulty = window
        .location()
        .search()
        .map(|query| Difficulty::from_query(&query))
        .unwrap_or_default();
    let prompts: Vec<Prompt> = serde_json::from_str(prompts_json).map_err(to_js)?;
    let config = match config_json {
        Some(json) => serde_json::from_str::<GameConfig>(&json).map_err(to_js)?,
        None => GameConfig::default(),
    };

    let surface = CanvasSurface::new(canvas.clone())?;
    let game = Game::new(
        config,
        ScoringConfig::default(),
        PromptDeck::new(prompts, difficulty),
        surface,
        IntervalTimer::new(on_tick),
    )
    .map_err(|e| {
        web_sys::console::error_1(&format!("Failed to start round: {}", e).into());
        to_js(e)
    })?;

    input::attach_pointer_input(&canvas, deliver)?;
    input::attach_visibility(&document, deliver)?;

    GAME.with(|cell| *cell.borrow_mut() = Some(game));
    pump();
    Ok(())
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn deliver(msg: UiToGame) {
    bridge::enqueue(msg);
    pump();
}

/// Apply queued page messages and forward everything the game has to say.
///
/// Page listeners may answer synchronously while messages are being sent.
/// Their replies are queued and picked up by the next pass.
fn pump() {
    loop {
        let pending = GAME.with(|cell| {
            let Ok(mut slot) = cell.try_borrow_mut() else {
                return None;
            };
            let game = slot.as_mut()?;

            let mut applied = false;
            while let Some(msg) = bridge::poll_ui_message() {
                game.apply(msg);
                applied = true;
            }
            let outgoing = game.take_messages();
            (applied || !outgoing.is_empty()).then(|| (outgoing, game.scoring_config().timeout()))
        });

        let Some((outgoing, score_timeout)) = pending else {
            break;
        };
        for msg in &outgoing {
            if let GameToUi::ScoreRequested(request) = msg {
                let round_id = request.round_id;
                timer::schedule_once(score_timeout, move || on_score_timeout(round_id));
            }
            bridge::send_to_ui(msg);
        }
    }
}

fn on_score_timeout(round_id: u64) {
    GAME.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(game) = slot.as_mut() {
                game.expire_score(round_id);
            }
        }
        // Busy means a pump is running; retry once it is done
        Err(_) => timer::schedule_once(Duration::ZERO, move || on_score_timeout(round_id)),
    });
    pump();
}

fn on_tick() {
    GAME.with(|cell| match cell.try_borrow_mut() {
        Ok(mut slot) => {
            if let Some(game) = slot.as_mut() {
                game.tick();
            }
        }
        Err(_) => debug!("tick skipped while the game is busy"),
    });
    pump();
}
