//! `setInterval`-backed timer source and one-shot timeouts

use std::time::Duration;

use painting::TimerSource;
use tracing::warn;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::Closure;

/// Run `callback` once after `delay` with `setTimeout`.
pub fn schedule_once(delay: Duration, callback: impl FnOnce() + 'static) {
    let Some(window) = web_sys::window() else {
        warn!("no window, timeout not scheduled");
        return;
    };
    let callback = Closure::once_into_js(callback);
    let millis = delay.as_millis().min(i32::MAX as u128) as i32;
    if let Err(e) =
        window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis)
    {
        warn!(error = ?e, "setTimeout failed");
    }
}

/// Calls `on_tick` every interval until stopped.
///
/// The callback lives as long as the timer; the interval handle is cleared on
/// stop and on drop.
pub struct IntervalTimer {
    callback: Closure<dyn FnMut()>,
    handle: Option<i32>,
}

impl IntervalTimer {
    pub fn new(on_tick: impl FnMut() + 'static) -> Self {
        Self {
            callback: Closure::wrap(Box::new(on_tick) as Box<dyn FnMut()>),
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl TimerSource for IntervalTimer {
    fn start_ticking(&mut self, interval_secs: u32) {
        if self.handle.is_some() {
            return;
        }
        let Some(window) = web_sys::window() else {
            warn!("no window, timer not started");
            return;
        };
        let callback: &js_sys::Function = self.callback.as_ref().unchecked_ref();
        let millis = interval_secs.saturating_mul(1000).min(i32::MAX as u32) as i32;
        match window.set_interval_with_callback_and_timeout_and_arguments_0(callback, millis) {
            Ok(handle) => self.handle = Some(handle),
            Err(e) => warn!(error = ?e, "setInterval failed"),
        }
    }

    fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(handle);
        }
    }
}

impl Drop for IntervalTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
