//! Offline scorer - a deterministic heuristic for play without a server

use blindsketch_ipc::ScoreReport;
use tracing::debug;

use crate::{ScoreInput, ScoringBackend, ScoringError};

/// Ink coverage that earns the full coverage bonus
const TARGET_COVERAGE: f32 = 0.12;

/// Scores from ink coverage and stroke count only.
///
/// It never looks at the reference, so it is a stand-in, not a judge. The
/// same drawing always gets the same score.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineScorer;

impl OfflineScorer {
    pub fn new() -> Self {
        Self
    }

    fn evaluate(input: &ScoreInput) -> Result<ScoreReport, ScoringError> {
        let image = image::load_from_memory(&input.png)?.to_rgba8();
        let total = (image.width() as usize * image.height() as usize).max(1);
        let inked = image.pixels().filter(|p| p.0[3] > 0).count();

        if inked == 0 {
            return Ok(ScoreReport {
                score: 0,
                feedback: "Nothing was drawn. Give it a try next round!".into(),
            });
        }

        let coverage = inked as f32 / total as f32;
        let closeness = (1.0 - (coverage - TARGET_COVERAGE).abs() / TARGET_COVERAGE).clamp(0.0, 1.0);
        let stroke_bonus = input.request.stroke_count.min(10) as u32 * 2;
        let score = (30 + (closeness * 50.0).round() as u32 + stroke_bonus).min(100) as u8;

        debug!(coverage, strokes = input.request.stroke_count, score, "offline score");

        let feedback = match score {
            80.. => format!("Impressive! That really looks like {}.", input.request.prompt_title.to_lowercase()),
            60..=79 => "Not bad for drawing blind!".to_string(),
            40..=59 => "There is something there. Keep practicing!".to_string(),
            _ => "Abstract art is art too.".to_string(),
        };

        Ok(ScoreReport { score, feedback })
    }
}

impl ScoringBackend for OfflineScorer {
    async fn score(&mut self, input: &ScoreInput) -> Result<ScoreReport, ScoringError> {
        Self::evaluate(input)
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
