/// Opacity used while replaying strokes.
pub const REVEAL_OPACITY: f32 = 1.0;

/// Opacity of capture-time ink. Nothing is drawn during capture; hosts that
/// still trace the live path must use this value.
pub const CAPTURE_OPACITY: f32 = 0.0;

/// Upper bound for either canvas dimension accepted by a resize.
pub const MAX_CANVAS_SIZE: u32 = 4096;
