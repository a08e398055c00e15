//! JavaScript bridge to the page UI
//!
//! Messages are passed as JSON strings in the `detail` of CustomEvents on the
//! window object. Incoming messages are queued and applied by the host
//! between calls, so a page listener that answers synchronously never
//! re-enters the game.

use blindsketch_ipc::{GameToUi, UiToGame};
use std::cell::RefCell;
use std::collections::VecDeque;
use wasm_bindgen::prelude::*;

/// Event name for game -> UI messages
pub const GAME_TO_UI_EVENT: &str = "blindsketch:game-to-ui";
/// Event name for UI -> game messages
pub const UI_TO_GAME_EVENT: &str = "blindsketch:ui-to-game";

thread_local! {
    /// Queue of messages waiting for the game
    static MESSAGE_QUEUE: RefCell<VecDeque<UiToGame>> = const { RefCell::new(VecDeque::new()) };
}

/// Listen for UI -> game events. `on_message` runs after each one is queued.
pub fn init_bridge(on_message: fn()) -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;

    let closure = Closure::wrap(Box::new(move |event: web_sys::CustomEvent| {
        let Some(detail) = event.detail().as_string() else {
            web_sys::console::error_1(&"UI message detail must be a JSON string".into());
            return;
        };
        match UiToGame::from_json(&detail) {
            Ok(msg) => {
                enqueue(msg);
                on_message();
            }
            Err(e) => {
                web_sys::console::error_1(&format!("Failed to parse UI message: {}", e).into());
                // An unreadable score still has to end its round
                if let Some(msg) = UiToGame::score_failure_from_json(&detail) {
                    enqueue(msg);
                    on_message();
                }
            }
        }
    }) as Box<dyn FnMut(_)>);

    window.add_event_listener_with_callback(UI_TO_GAME_EVENT, closure.as_ref().unchecked_ref())?;

    // Keep the closure alive
    closure.forget();

    web_sys::console::log_1(&"Blindsketch bridge initialized".into());
    Ok(())
}

/// Queue a message for the game
pub fn enqueue(msg: UiToGame) {
    MESSAGE_QUEUE.with(|queue| queue.borrow_mut().push_back(msg));
}

/// Poll for the next queued message (non-blocking)
pub fn poll_ui_message() -> Option<UiToGame> {
    MESSAGE_QUEUE.with(|queue| queue.borrow_mut().pop_front())
}

/// Send a message to the page UI
pub fn send_to_ui(msg: &GameToUi) {
    let Some(window) = web_sys::window() else {
        return;
    };

    let json = match msg.to_json() {
        Ok(json) => json,
        Err(e) => {
            web_sys::console::error_1(&format!("Failed to serialize game message: {}", e).into());
            return;
        }
    };

    let init = web_sys::CustomEventInit::new();
    init.set_detail(&JsValue::from_str(&json));

    let dispatched = web_sys::CustomEvent::new_with_event_init_dict(GAME_TO_UI_EVENT, &init)
        .and_then(|event| window.dispatch_event(&event));
    if let Err(e) = dispatched {
        web_sys::console::error_2(&"Failed to dispatch game message".into(), &e);
    }
}
