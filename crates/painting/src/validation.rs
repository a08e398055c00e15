use blindsketch_config::BrushConfig;
use thiserror::Error;

use crate::constants::MAX_CANVAS_SIZE;
use crate::types::CanvasPoint;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
    #[error("Brush width {width} outside {min}..={max}")]
    BrushWidthOutOfRange { width: u32, min: u32, max: u32 },
    #[error("Invalid canvas size: {width}x{height}")]
    InvalidCanvasSize { width: u32, height: u32 },
    #[error("Non-finite coordinate: ({x}, {y})")]
    NonFiniteCoordinate { x: f32, y: f32 },
}

/// Check a brush width against the configured slider bounds
pub fn validate_brush_width(width: u32, brush: &BrushConfig) -> Result<u32, ValidationError> {
    if width < brush.min_width || width > brush.max_width {
        return Err(ValidationError::BrushWidthOutOfRange {
            width,
            min: brush.min_width,
            max: brush.max_width,
        });
    }
    Ok(width)
}

/// Canvas dimensions must be non-zero and within [`MAX_CANVAS_SIZE`]
pub fn validate_canvas_size(width: u32, height: u32) -> Result<(), ValidationError> {
    if width == 0 || height == 0 || width > MAX_CANVAS_SIZE || height > MAX_CANVAS_SIZE {
        return Err(ValidationError::InvalidCanvasSize { width, height });
    }
    Ok(())
}

/// Reject NaN/infinite points before they reach the log
pub fn validate_point(point: CanvasPoint) -> Result<CanvasPoint, ValidationError> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return Err(ValidationError::NonFiniteCoordinate {
            x: point.x,
            y: point.y,
        });
    }
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_width_bounds() {
        let brush = BrushConfig::default();
        assert_eq!(validate_brush_width(1, &brush), Ok(1));
        assert_eq!(validate_brush_width(20, &brush), Ok(20));
        assert!(validate_brush_width(0, &brush).is_err());
        assert!(validate_brush_width(21, &brush).is_err());
    }

    #[test]
    fn test_canvas_size() {
        assert!(validate_canvas_size(400, 300).is_ok());
        assert!(validate_canvas_size(0, 300).is_err());
        assert!(validate_canvas_size(400, MAX_CANVAS_SIZE + 1).is_err());
    }

    #[test]
    fn test_point_must_be_finite() {
        assert!(validate_point(CanvasPoint::new(1.0, 2.0)).is_ok());
        assert!(validate_point(CanvasPoint::new(f32::NAN, 2.0)).is_err());
        assert!(validate_point(CanvasPoint::new(1.0, f32::INFINITY)).is_err());
    }
}
