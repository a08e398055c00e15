//! Drawing scoring for Blindsketch
//!
//! Scoring is an opaque collaborator: the core hands over the revealed
//! drawing and the prompt, and gets back a score or nothing. Backends:
//! - [`RemoteScorer`] - a scoring service over WebSocket
//! - [`OfflineScorer`] - a deterministic local heuristic
//!
//! [`ScoringTask`] runs a backend on tokio with bounded retries and an
//! overall timeout, and always ends in a [`ScoreOutcome`].

mod offline;
mod remote;
mod task;

pub use offline::OfflineScorer;
pub use remote::RemoteScorer;
pub use task::{ScoreOutcome, ScoringTask};

use std::future::Future;

use blindsketch_config::ScoringConfig;
use blindsketch_ipc::{ScoreReport, ScoreRequest};
use painting::{RasterError, RasterSurface};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Scoring failed: {0}")]
    Scoring(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Failed to encode drawing: {0}")]
    Encode(#[from] RasterError),

    #[error("Failed to decode drawing: {0}")]
    Decode(#[from] image::ImageError),
}

/// Everything a backend is given: the request metadata and the drawing as PNG
#[derive(Debug, Clone)]
pub struct ScoreInput {
    pub request: ScoreRequest,
    pub png: Vec<u8>,
}

impl ScoreInput {
    /// Encode the revealed drawing on `surface`
    pub fn from_surface(request: ScoreRequest, surface: &RasterSurface) -> Result<Self, ScoringError> {
        Ok(Self {
            request,
            png: surface.to_png()?,
        })
    }
}

/// Trait for scoring backends
pub trait ScoringBackend: Send + 'static {
    /// Score one drawing
    fn score(&mut self, input: &ScoreInput) -> impl Future<Output = Result<ScoreReport, ScoringError>> + Send;

    /// Short name for logs
    fn name(&self) -> &'static str;
}

/// Backend picked from configuration: remote when a server URL is set
pub enum Scorer {
    Remote(RemoteScorer),
    Offline(OfflineScorer),
}

impl Scorer {
    pub fn from_config(config: &ScoringConfig) -> Self {
        match &config.server_url {
            Some(url) => Scorer::Remote(RemoteScorer::new(url.clone())),
            None => Scorer::Offline(OfflineScorer::new()),
        }
    }
}

impl ScoringBackend for Scorer {
    async fn score(&mut self, input: &ScoreInput) -> Result<ScoreReport, ScoringError> {
        match self {
            Scorer::Remote(scorer) => scorer.score(input).await,
            Scorer::Offline(scorer) => scorer.score(input).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Scorer::Remote(scorer) => scorer.name(),
            Scorer::Offline(scorer) => scorer.name(),
        }
    }
}
