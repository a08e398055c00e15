//! Cancelable scoring task with bounded retries

use blindsketch_config::ScoringConfig;
use blindsketch_ipc::{GameToUi, ScoreReport};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::{ScoreInput, ScoringBackend, ScoringError};

/// How a scoring task ended. There is no third state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreOutcome {
    Scored(ScoreReport),
    /// Scoring failed, timed out or was cancelled
    Fallback { report: ScoreReport, reason: String },
}

impl ScoreOutcome {
    fn fallback(config: &ScoringConfig, reason: impl Into<String>) -> Self {
        ScoreOutcome::Fallback {
            report: ScoreReport::fallback(config),
            reason: reason.into(),
        }
    }

    pub fn report(&self) -> &ScoreReport {
        match self {
            ScoreOutcome::Scored(report) | ScoreOutcome::Fallback { report, .. } => report,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, ScoreOutcome::Fallback { .. })
    }

    /// UI message announcing this outcome for `round_id`
    pub fn into_message(self, round_id: u64) -> GameToUi {
        let fallback = self.is_fallback();
        let report = match self {
            ScoreOutcome::Scored(report) | ScoreOutcome::Fallback { report, .. } => report,
        };
        GameToUi::ScoreReady {
            round_id,
            report,
            fallback,
        }
    }
}

/// A spawned scoring run.
///
/// Attempts the backend up to `max_attempts` times with exponential backoff
/// between attempts, all under one overall timeout. Cancelling or timing out
/// resolves to the fallback outcome.
pub struct ScoringTask {
    handle: JoinHandle<ScoreOutcome>,
    cancel: watch::Sender<bool>,
    config: ScoringConfig,
}

impl ScoringTask {
    /// Spawn on the current tokio runtime.
    pub fn spawn<B: ScoringBackend>(backend: B, input: ScoreInput, config: ScoringConfig) -> Self {
        let (cancel, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(run(backend, input, config.clone(), cancel_rx));
        Self {
            handle,
            cancel,
            config,
        }
    }

    pub fn cancel(&self) {
        self.cancel.send_replace(true);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the terminal outcome.
    pub async fn outcome(self) -> ScoreOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(error = %e, "scoring task did not complete");
                ScoreOutcome::fallback(&self.config, e.to_string())
            }
        }
    }
}

async fn run<B: ScoringBackend>(
    mut backend: B,
    input: ScoreInput,
    config: ScoringConfig,
    mut cancel: watch::Receiver<bool>,
) -> ScoreOutcome {
    let round_id = input.request.round_id;

    tokio::select! {
        biased;

        _ = cancelled(&mut cancel) => {
            info!(round_id, "scoring cancelled");
            ScoreOutcome::fallback(&config, "cancelled")
        }
        result = tokio::time::timeout(config.timeout(), attempt_all(&mut backend, &input, &config)) => match result {
            Ok(Ok(report)) => ScoreOutcome::Scored(report),
            Ok(Err(err)) => {
                warn!(round_id, error = %err, "scoring failed, using fallback");
                ScoreOutcome::fallback(&config, err.to_string())
            }
            Err(_) => {
                warn!(round_id, timeout_secs = config.timeout_secs, "scoring timed out, using fallback");
                ScoreOutcome::fallback(&config, "timed out")
            }
        },
    }
}

async fn attempt_all<B: ScoringBackend>(
    backend: &mut B,
    input: &ScoreInput,
    config: &ScoringConfig,
) -> Result<ScoreReport, ScoringError> {
    let attempts = config.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        match backend.score(input).await {
            Ok(report) => {
                info!(
                    backend = backend.name(),
                    attempt,
                    score = report.score,
                    "drawing scored"
                );
                return Ok(report);
            }
            Err(err) => {
                warn!(backend = backend.name(), attempt, attempts, error = %err, "scoring attempt failed");
                last_error = Some(err);
                if attempt < attempts {
                    tokio::time::sleep(config.backoff(attempt)).await;
                }
            }
        }
    }

    Err(last_error.unwrap_or_else(|| ScoringError::Scoring("no attempts made".into())))
}

/// Resolves once cancellation is requested. Never resolves if the sender is
/// dropped first.
async fn cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use blindsketch_config::Difficulty;
    use blindsketch_ipc::ScoreRequest;
    use painting::Prompt;

    /// Fails a fixed number of times, then scores 77
    struct FlakyScorer {
        failures: u32,
        calls: Arc<AtomicU32>,
    }

    impl ScoringBackend for FlakyScorer {
        async fn score(&mut self, _input: &ScoreInput) -> Result<ScoreReport, ScoringError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures {
                return Err(ScoringError::Connection(format!("refused #{call}")));
            }
            Ok(ScoreReport {
                score: 77,
                feedback: "ok".into(),
            })
        }

        fn name(&self) -> &'static str {
            "flaky"
        }
    }

    /// Never answers
    struct StalledScorer;

    impl ScoringBackend for StalledScorer {
        async fn score(&mut self, _input: &ScoreInput) -> Result<ScoreReport, ScoringError> {
            std::future::pending().await
        }

        fn name(&self) -> &'static str {
            "stalled"
        }
    }

    fn input() -> ScoreInput {
        ScoreInput {
            request: ScoreRequest::for_round(9, &Prompt::free_draw(), Difficulty::Medium, (400, 400), 2),
            png: Vec::new(),
        }
    }

    fn config() -> ScoringConfig {
        ScoringConfig {
            max_attempts: 3,
            initial_backoff_ms: 1,
            timeout_secs: 5,
            ..ScoringConfig::default()
        }
    }

    fn flaky(failures: u32) -> (FlakyScorer, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        (
            FlakyScorer {
                failures,
                calls: Arc::clone(&calls),
            },
            calls,
        )
    }

    #[tokio::test]
    async fn test_retries_then_scores() {
        let (backend, calls) = flaky(2);

        let outcome = ScoringTask::spawn(backend, input(), config()).outcome().await;

        assert_eq!(
            outcome,
            ScoreOutcome::Scored(ScoreReport {
                score: 77,
                feedback: "ok".into()
            })
        );
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_always_failing_falls_back_after_max_attempts() {
        let (backend, calls) = flaky(u32::MAX);

        let outcome = ScoringTask::spawn(backend, input(), config()).outcome().await;

        assert!(outcome.is_fallback());
        assert_eq!(outcome.report().score, 50);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_cancel_falls_back() {
        let task = ScoringTask::spawn(StalledScorer, input(), config());
        task.cancel();

        let outcome = task.outcome().await;

        assert!(matches!(outcome, ScoreOutcome::Fallback { ref reason, .. } if reason == "cancelled"));
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let config = ScoringConfig {
            timeout_secs: 1,
            ..config()
        };

        let outcome = ScoringTask::spawn(StalledScorer, input(), config).outcome().await;

        assert!(matches!(outcome, ScoreOutcome::Fallback { ref reason, .. } if reason == "timed out"));
    }

    #[tokio::test]
    async fn test_outcome_as_ui_message() {
        let (backend, _) = flaky(0);
        let outcome = ScoringTask::spawn(backend, input(), config()).outcome().await;

        assert_eq!(
            outcome.into_message(9),
            GameToUi::ScoreReady {
                round_id: 9,
                report: ScoreReport {
                    score: 77,
                    feedback: "ok".into()
                },
                fallback: false
            }
        );
    }
}
