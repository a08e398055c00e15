//! Browser 2D canvas as a display surface

use painting::{CAPTURE_OPACITY, Color, DisplaySurface};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("No global window")]
    NoWindow,

    #[error("No document")]
    NoDocument,

    #[error("No canvas element with id {0:?}")]
    NoCanvas(String),

    #[error("Canvas has no 2D context")]
    NoContext,
}

impl From<SetupError> for JsValue {
    fn from(err: SetupError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

/// Look up a `<canvas>` by element id
pub fn find_canvas(id: &str) -> Result<HtmlCanvasElement, SetupError> {
    let window = web_sys::window().ok_or(SetupError::NoWindow)?;
    let document = window.document().ok_or(SetupError::NoDocument)?;
    document
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| SetupError::NoCanvas(id.to_string()))
}

/// Draws through `CanvasRenderingContext2d` with round caps and joins.
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, SetupError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(SetupError::NoContext)?;

        let surface = Self { canvas, ctx };
        surface.reset_style();
        Ok(surface)
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }

    /// Setting the canvas size resets context state, so this runs after
    /// every resize. Ink stays invisible until a stroke sets its own opacity.
    fn reset_style(&self) {
        self.ctx.set_line_cap("round");
        self.ctx.set_line_join("round");
        self.ctx.set_global_alpha(CAPTURE_OPACITY as f64);
    }
}

impl DisplaySurface for CanvasSurface {
    fn clear(&mut self) {
        self.ctx.clear_rect(
            0.0,
            0.0,
            self.canvas.width() as f64,
            self.canvas.height() as f64,
        );
    }

    fn begin_path(&mut self) {
        self.ctx.begin_path();
    }

    fn move_to(&mut self, x: f32, y: f32) {
        self.ctx.move_to(x as f64, y as f64);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.ctx.line_to(x as f64, y as f64);
    }

    fn stroke_path(&mut self, color: Color, width: f32, opacity: f32) {
        self.ctx.set_global_alpha(opacity as f64);
        self.ctx.set_stroke_style_str(&color.to_string());
        self.ctx.set_line_width(width as f64);
        self.ctx.stroke();
    }

    fn size(&self) -> (u32, u32) {
        (self.canvas.width(), self.canvas.height())
    }

    fn set_size(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        self.reset_style();
    }
}
