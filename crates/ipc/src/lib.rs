//! IPC message protocol for Blindsketch
//!
//! Defines the messages exchanged between the game core and the page UI
//! (carried as JSON in DOM `CustomEvent`s), and the wire types spoken with
//! the scoring service.

mod error;
mod messages;
mod types;

pub use error::*;
pub use messages::*;
pub use types::*;
