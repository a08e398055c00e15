//! DOM pointer, touch and visibility listeners
//!
//! Every listener turns its DOM event into a [`UiToGame`] and hands it to
//! `deliver`. The canvas rect is read at event time so CSS scaling and
//! scrolling are always current.

use blindsketch_ipc::UiToGame;
use painting::{ElementRect, InputEvent, InputSource, RawPointer, TouchPhase};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent};

fn element_rect(canvas: &HtmlCanvasElement) -> ElementRect {
    let rect = canvas.get_bounding_client_rect();
    ElementRect::new(
        rect.left() as f32,
        rect.top() as f32,
        rect.width() as f32,
        rect.height() as f32,
    )
}

fn mouse_pointer(canvas: &HtmlCanvasElement, evt: &MouseEvent) -> RawPointer {
    RawPointer::new(evt.client_x() as f32, evt.client_y() as f32, element_rect(canvas))
}

/// Active touches in client coordinates, first touch first
fn touch_pointers(canvas: &HtmlCanvasElement, evt: &TouchEvent) -> Vec<RawPointer> {
    let rect = element_rect(canvas);
    let touches = evt.touches();
    (0..touches.length())
        .filter_map(|i| touches.get(i))
        .map(|t| RawPointer::new(t.client_x() as f32, t.client_y() as f32, rect))
        .collect()
}

fn listen<E, F>(target: &web_sys::EventTarget, name: &str, handler: F) -> Result<(), JsValue>
where
    E: JsCast + 'static,
    F: FnMut(E) + 'static,
    E: wasm_bindgen::convert::FromWasmAbi,
{
    let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(E)>);
    target.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
    // Listeners live as long as the page
    closure.forget();
    Ok(())
}

/// Wire mouse and touch input on `canvas`
pub fn attach_pointer_input(canvas: &HtmlCanvasElement, deliver: fn(UiToGame)) -> Result<(), JsValue> {
    let source = InputSource::Mouse;

    let el = canvas.clone();
    listen(canvas, "mousedown", move |evt: MouseEvent| {
        deliver(UiToGame::Input(InputEvent::Down {
            source,
            at: mouse_pointer(&el, &evt),
        }));
    })?;

    let el = canvas.clone();
    listen(canvas, "mousemove", move |evt: MouseEvent| {
        deliver(UiToGame::Input(InputEvent::Move {
            source,
            at: mouse_pointer(&el, &evt),
        }));
    })?;

    listen(canvas, "mouseup", move |_evt: MouseEvent| {
        deliver(UiToGame::Input(InputEvent::Up { source }));
    })?;

    listen(canvas, "mouseout", move |_evt: MouseEvent| {
        deliver(UiToGame::Input(InputEvent::Leave));
    })?;

    for (name, phase) in [
        ("touchstart", TouchPhase::Start),
        ("touchmove", TouchPhase::Move),
        ("touchend", TouchPhase::End),
        ("touchcancel", TouchPhase::Cancel),
    ] {
        let el = canvas.clone();
        listen(canvas, name, move |evt: TouchEvent| {
            // Keep the page from scrolling under the finger
            evt.prevent_default();
            if let Some(event) = InputEvent::from_touches(phase, &touch_pointers(&el, &evt)) {
                deliver(UiToGame::Input(event));
            }
        })?;
    }

    Ok(())
}

/// Pause the countdown while the page is hidden
pub fn attach_visibility(document: &Document, deliver: fn(UiToGame)) -> Result<(), JsValue> {
    let doc = document.clone();
    listen(document, "visibilitychange", move |_evt: web_sys::Event| {
        deliver(UiToGame::VisibilityChanged { hidden: doc.hidden() });
    })
}
