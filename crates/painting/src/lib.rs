//! Blindsketch drawing core - invisible capture and replay
//!
//! This crate provides the game core with no browser dependency:
//! - [`log`] - Stroke log storage and the stroke recorder
//! - [`capture`] - Invisible capture surface (pointer input to log entries)
//! - [`replay`] - Replay renderer (log to visible ink)
//! - [`round`] - Round state machine, timer and prompt seams
//! - [`surface`] - Display surface trait and a command-recording surface
//! - [`raster`] - CPU RGBA surface with PNG export
//! - [`types`] - Colors, points, tool state and stroke events
//! - [`validation`] - Input validation helpers

pub mod capture;
pub mod constants;
pub mod log;
pub mod raster;
pub mod replay;
pub mod round;
pub mod surface;
pub mod types;
pub mod validation;

pub use capture::*;
pub use constants::*;
pub use log::*;
pub use raster::*;
pub use replay::*;
pub use round::*;
pub use surface::*;
pub use types::*;
pub use validation::*;
