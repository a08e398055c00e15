//! Stroke log storage and capture-time recording.
//!
//! This module provides:
//! - [`StrokeLog`] - Append-only ordered storage for stroke events
//! - [`StrokeRecorder`] - Grammar enforcement for pen-down / move / up input
//! - [`StrokeLogEvent`] - Lifecycle notifications for observers
//!
//! ## Log grammar
//!
//! ```text
//! log    := stroke*
//! stroke := PenDown PenMove* PenUp
//! ```
//!
//! The recorder only ever produces logs in this shape. The log type itself
//! accepts anything, and readers (replay, [`StrokeLog::strokes`]) skip entries
//! that break the grammar instead of failing.

mod events;
mod recorder;
mod storage;

pub use events::StrokeLogEvent;
pub use recorder::{RecorderError, StrokeRecorder};
pub use storage::{StrokeLog, StrokeView};
