use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::validation::ValidationError;

/// 8-bit RGB ink color.
///
/// Parses `#rrggbb`, `#rgb` and CSS `rgb(r, g, b)`; serializes as lowercase `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Linear RGBA in 0.0..=1.0 with the given alpha
    pub fn to_rgba_f32(self, alpha: f32) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            alpha,
        ]
    }

    fn parse_hex(hex: &str) -> Option<Self> {
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            6 => Some(Self::rgb(
                u8::from_str_radix(&hex[0..2], 16).ok()?,
                u8::from_str_radix(&hex[2..4], 16).ok()?,
                u8::from_str_radix(&hex[4..6], 16).ok()?,
            )),
            3 => {
                let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| v * 17);
                Some(Self::rgb(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            _ => None,
        }
    }

    fn parse_css_rgb(body: &str) -> Option<Self> {
        let mut channels = body.split(',').map(|c| c.trim().parse::<u8>());
        let r = channels.next()?.ok()?;
        let g = channels.next()?.ok()?;
        let b = channels.next()?.ok()?;
        if channels.next().is_some() {
            return None;
        }
        Some(Self::rgb(r, g, b))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::BLACK
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Color {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parsed = if let Some(hex) = trimmed.strip_prefix('#') {
            Self::parse_hex(hex)
        } else if let Some(body) = trimmed
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Self::parse_css_rgb(body)
        } else {
            None
        };
        parsed.ok_or_else(|| ValidationError::InvalidColor(s.to_string()))
    }
}

impl TryFrom<String> for Color {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.to_string()
    }
}

/// A position in canvas pixel space (after device-to-canvas scaling)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f32,
    pub y: f32,
}

impl CanvasPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Tool state sampled onto every logged point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    pub color: Color,
    pub width: f32,
}

impl Default for ToolState {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: blindsketch_config::DEFAULT_BRUSH_WIDTH as f32,
        }
    }
}

/// One entry in the stroke log.
///
/// Coordinates are canvas pixels. Color and width are the tool state at the
/// moment the sample was captured, so replay never consults the live tool.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StrokeEvent {
    PenDown {
        x: f32,
        y: f32,
        color: Color,
        width: f32,
    },
    PenMove {
        x: f32,
        y: f32,
        color: Color,
        width: f32,
    },
    PenUp,
}

impl StrokeEvent {
    pub fn pen_down(at: CanvasPoint, tool: ToolState) -> Self {
        StrokeEvent::PenDown {
            x: at.x,
            y: at.y,
            color: tool.color,
            width: tool.width,
        }
    }

    pub fn pen_move(at: CanvasPoint, tool: ToolState) -> Self {
        StrokeEvent::PenMove {
            x: at.x,
            y: at.y,
            color: tool.color,
            width: tool.width,
        }
    }

    /// Position of down/move events
    pub fn point(&self) -> Option<CanvasPoint> {
        match *self {
            StrokeEvent::PenDown { x, y, .. } | StrokeEvent::PenMove { x, y, .. } => {
                Some(CanvasPoint::new(x, y))
            }
            StrokeEvent::PenUp => None,
        }
    }
}
