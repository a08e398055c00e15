//! Type definitions for IPC messages.

mod round;
mod score;

pub use round::*;
pub use score::*;
