//! Scoring wire types.
//!
//! A scorer connection carries one [`ScoreRequest`] as JSON text followed by
//! the revealed drawing as a binary PNG frame. The scorer answers with one
//! [`ScorerReply`] as JSON text.

use blindsketch_config::{Difficulty, ScoringConfig};
use painting::Prompt;
use serde::{Deserialize, Serialize};

use crate::IpcError;

/// What the scorer needs besides the image itself
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub round_id: u64,
    pub prompt_id: String,
    pub prompt_title: String,
    pub reference_image: Option<String>,
    pub difficulty: Difficulty,
    pub width: u32,
    pub height: u32,
    pub stroke_count: usize,
}

impl ScoreRequest {
    pub fn for_round(
        round_id: u64,
        prompt: &Prompt,
        difficulty: Difficulty,
        canvas_size: (u32, u32),
        stroke_count: usize,
    ) -> Self {
        Self {
            round_id,
            prompt_id: prompt.id.clone(),
            prompt_title: prompt.title.clone(),
            reference_image: prompt.reference_image.clone(),
            difficulty,
            width: canvas_size.0,
            height: canvas_size.1,
            stroke_count,
        }
    }
}

/// A score in `0..=100` with a line of feedback
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub score: u8,
    pub feedback: String,
}

impl ScoreReport {
    pub fn new(score: u8, feedback: impl Into<String>) -> Result<Self, IpcError> {
        Self {
            score,
            feedback: feedback.into(),
        }
        .validate()
    }

    /// Neutral result used when scoring fails
    pub fn fallback(config: &ScoringConfig) -> Self {
        Self {
            score: config.fallback_score.min(100),
            feedback: config.fallback_message.clone(),
        }
    }

    pub fn validate(self) -> Result<Self, IpcError> {
        if self.score > 100 {
            return Err(IpcError::ScoreOutOfRange(f64::from(self.score)));
        }
        Ok(self)
    }
}

/// A score as a scorer sent it, before range checking.
///
/// Scorers are free to answer with any JSON number. Fractions are rounded to
/// the nearest whole point; anything outside `0..=100` is rejected by
/// [`ScoreSubmission::into_report`] rather than at parse time, so the caller
/// can still fall back for the right round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSubmission {
    pub score: f64,
    #[serde(default)]
    pub feedback: String,
}

impl ScoreSubmission {
    pub fn into_report(self) -> Result<ScoreReport, IpcError> {
        if !self.score.is_finite() || !(0.0..=100.0).contains(&self.score) {
            return Err(IpcError::ScoreOutOfRange(self.score));
        }
        Ok(ScoreReport {
            score: self.score.round() as u8,
            feedback: self.feedback,
        })
    }
}

impl From<ScoreReport> for ScoreSubmission {
    fn from(report: ScoreReport) -> Self {
        Self {
            score: f64::from(report.score),
            feedback: report.feedback,
        }
    }
}

/// The scorer's answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ScorerReply {
    Score(ScoreSubmission),
    Error { message: String },
}
