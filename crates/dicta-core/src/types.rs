use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A reference text to be dictated.
///
/// Owned by the passage catalog; a session only ever reads it. The `language`
/// field is a BCP-47 locale tag (e.g. `en-US`) forwarded to the speech
/// synthesizer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub id: i64,
    pub content: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_language() -> String {
    "en-US".to_string()
}

impl Passage {
    pub fn new(id: i64, content: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            id,
            content: content.into(),
            language: language.into(),
        }
    }

    /// Number of whitespace-separated words in the passage.
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }

    /// Number of characters in the passage (not bytes).
    pub fn char_count(&self) -> usize {
        self.content.chars().count()
    }
}

/// The outcome of one completed practice session.
///
/// Produced once per session and handed to the submission collaborator.
/// Carries the raw transcript and timing only; authoritative scoring happens
/// on the receiving side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptResult {
    pub passage_id: i64,
    pub typed_text: String,
    pub elapsed_seconds: f64,
}

/// Acknowledgement returned by the submission collaborator.
///
/// The `accuracy` here is the record of truth; client-side scoring is
/// advisory and display-only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptReceipt {
    pub attempt_id: i64,
    pub attempt_no: i32,
    pub accuracy: f64,
    pub elapsed_seconds: f64,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<PerformanceSnapshot>,
}

/// Aggregate practice statistics across attempts.
///
/// Consumed, never mutated, by the session side; the submission collaborator
/// recomputes it on every accepted attempt.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSnapshot {
    pub total_attempts: i64,
    pub best_accuracy: f64,
    pub average_accuracy: f64,
    pub average_time: f64,
}

/// Advisory, client-side statistics for an in-progress or completed session.
///
/// Sampled on demand; `wpm` and `accuracy` use the simplified character-based
/// formulas from [`crate::score`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionStats {
    pub accuracy: f64,
    pub wpm: f64,
    pub progress: f64,
    pub elapsed_seconds: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passage_counts() {
        let passage = Passage::new(1, "the quick fox", "en-US");
        assert_eq!(passage.word_count(), 3);
        assert_eq!(passage.char_count(), 13);
    }

    #[test]
    fn test_passage_counts_unicode() {
        let passage = Passage::new(2, "héllo wörld", "de-DE");
        assert_eq!(passage.word_count(), 2);
        assert_eq!(passage.char_count(), 11);
    }

    #[test]
    fn test_passage_default_language() {
        let passage: Passage = serde_json::from_str(r#"{"id": 7, "content": "abc"}"#).unwrap();
        assert_eq!(passage.language, "en-US");
    }

    #[test]
    fn test_attempt_result_roundtrip() {
        let result = AttemptResult {
            passage_id: 3,
            typed_text: "the quick".to_string(),
            elapsed_seconds: 12.5,
        };
        let json = serde_json::to_string(&result).unwrap();
        let back: AttemptResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_receipt_omits_absent_performance() {
        let receipt = AttemptReceipt {
            attempt_id: 1,
            attempt_no: 1,
            accuracy: 92.5,
            elapsed_seconds: 30.0,
            created_at: Utc::now(),
            performance: None,
        };
        let json = serde_json::to_string(&receipt).unwrap();
        assert!(!json.contains("performance"));
    }
}
