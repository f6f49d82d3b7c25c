//! Attempt submission collaborator.
//!
//! The engine forwards the raw transcript and timing; the sink computes the
//! authoritative word-level accuracy and folds the attempt into the running
//! performance aggregate. A failed submission leaves the session untouched
//! so the caller can retry with the same transcript.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use chrono::Utc;

use dicta_core::diff::word_accuracy;
use dicta_core::error::{DictaError, Result};
use dicta_core::types::{AttemptReceipt, AttemptResult, PerformanceSnapshot};

use crate::catalog::PassageCatalog;

/// Receiving side for completed attempts.
pub trait AttemptSink: Send + Sync {
    /// Record an attempt and return the authoritative receipt.
    fn submit(
        &self,
        attempt: &AttemptResult,
    ) -> impl Future<Output = Result<AttemptReceipt>> + Send;
}

/// In-process attempt sink.
///
/// Scores each transcript against the catalog passage with the word-level
/// diff metric, numbers attempts per passage, and recomputes the aggregate
/// snapshot on every accepted attempt.
pub struct InMemoryAttemptSink<C> {
    catalog: Arc<C>,
    state: Mutex<SinkState>,
}

#[derive(Debug, Default)]
struct SinkState {
    next_id: i64,
    attempts_per_passage: HashMap<i64, i32>,
    total_attempts: i64,
    best_accuracy: f64,
    accuracy_sum: f64,
    time_sum: f64,
}

impl SinkState {
    fn snapshot(&self) -> PerformanceSnapshot {
        PerformanceSnapshot {
            total_attempts: self.total_attempts,
            best_accuracy: self.best_accuracy,
            average_accuracy: self.accuracy_sum / self.total_attempts as f64,
            average_time: self.time_sum / self.total_attempts as f64,
        }
    }
}

impl<C: PassageCatalog> InMemoryAttemptSink<C> {
    pub fn new(catalog: Arc<C>) -> Self {
        Self {
            catalog,
            state: Mutex::new(SinkState::default()),
        }
    }
}

impl<C: PassageCatalog> AttemptSink for InMemoryAttemptSink<C> {
    async fn submit(&self, attempt: &AttemptResult) -> Result<AttemptReceipt> {
        let passage = self
            .catalog
            .find_by_id(attempt.passage_id)
            .await?
            .ok_or_else(|| {
                DictaError::Submission(format!("unknown passage {}", attempt.passage_id))
            })?;

        let accuracy = word_accuracy(&passage.content, &attempt.typed_text);

        let mut state = self
            .state
            .lock()
            .map_err(|e| DictaError::Submission(format!("sink mutex poisoned: {e}")))?;

        state.next_id += 1;
        let attempt_id = state.next_id;
        let attempt_no = {
            let counter = state.attempts_per_passage.entry(attempt.passage_id).or_insert(0);
            *counter += 1;
            *counter
        };

        state.total_attempts += 1;
        state.best_accuracy = state.best_accuracy.max(accuracy);
        state.accuracy_sum += accuracy;
        state.time_sum += attempt.elapsed_seconds;

        tracing::info!(
            attempt_id,
            passage_id = attempt.passage_id,
            attempt_no,
            accuracy,
            elapsed_seconds = attempt.elapsed_seconds,
            "Attempt recorded"
        );

        Ok(AttemptReceipt {
            attempt_id,
            attempt_no,
            accuracy,
            elapsed_seconds: attempt.elapsed_seconds,
            created_at: Utc::now(),
            performance: Some(state.snapshot()),
        })
    }
}

/// Sink that rejects every attempt. Exercises the retry-after-failure path.
#[derive(Debug, Clone, Default)]
pub struct FailingAttemptSink;

impl AttemptSink for FailingAttemptSink {
    async fn submit(&self, _attempt: &AttemptResult) -> Result<AttemptReceipt> {
        Err(DictaError::Submission(
            "submission backend unavailable".to_string(),
        ))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use dicta_core::types::Passage;

    fn sink_with_passages() -> InMemoryAttemptSink<InMemoryCatalog> {
        let catalog = Arc::new(InMemoryCatalog::new(vec![
            Passage::new(1, "the quick fox", "en-US"),
            Passage::new(2, "one two three four", "en-US"),
        ]));
        InMemoryAttemptSink::new(catalog)
    }

    fn attempt(passage_id: i64, typed: &str, elapsed: f64) -> AttemptResult {
        AttemptResult {
            passage_id,
            typed_text: typed.to_string(),
            elapsed_seconds: elapsed,
        }
    }

    #[tokio::test]
    async fn test_submit_scores_word_level() {
        let sink = sink_with_passages();
        let receipt = sink
            .submit(&attempt(1, "the quick", 10.0))
            .await
            .unwrap();
        // Two of three reference words matched.
        assert!((receipt.accuracy - 66.666).abs() < 0.01);
        assert_eq!(receipt.attempt_id, 1);
        assert_eq!(receipt.attempt_no, 1);
        assert_eq!(receipt.elapsed_seconds, 10.0);
    }

    #[tokio::test]
    async fn test_submit_unknown_passage_fails() {
        let sink = sink_with_passages();
        let result = sink.submit(&attempt(99, "anything", 1.0)).await;
        assert!(matches!(result, Err(DictaError::Submission(_))));
    }

    #[tokio::test]
    async fn test_attempt_numbers_are_per_passage() {
        let sink = sink_with_passages();
        let first = sink.submit(&attempt(1, "the quick fox", 5.0)).await.unwrap();
        let second = sink.submit(&attempt(1, "the fox", 5.0)).await.unwrap();
        let other = sink.submit(&attempt(2, "one two", 5.0)).await.unwrap();

        assert_eq!(first.attempt_no, 1);
        assert_eq!(second.attempt_no, 2);
        assert_eq!(other.attempt_no, 1);
        // Attempt ids keep counting globally.
        assert_eq!(other.attempt_id, 3);
    }

    #[tokio::test]
    async fn test_performance_aggregate_math() {
        let sink = sink_with_passages();
        // 100% in 10s, then 50% in 20s.
        sink.submit(&attempt(1, "the quick fox", 10.0)).await.unwrap();
        let receipt = sink
            .submit(&attempt(2, "one three", 20.0))
            .await
            .unwrap();

        let perf = receipt.performance.unwrap();
        assert_eq!(perf.total_attempts, 2);
        assert_eq!(perf.best_accuracy, 100.0);
        assert_eq!(perf.average_accuracy, 75.0);
        assert_eq!(perf.average_time, 15.0);
    }

    #[tokio::test]
    async fn test_failing_sink() {
        let sink = FailingAttemptSink;
        let result = sink.submit(&attempt(1, "x", 1.0)).await;
        assert!(matches!(result, Err(DictaError::Submission(_))));
    }
}
