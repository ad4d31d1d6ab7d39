use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{ParagraphId, ResultId};
use crate::model::paragraph::Paragraph;
use crate::model::record::{RecordError, ResultRecord};
use crate::rank::{Rank, SessionOutcome, rank_order};
use crate::time::format_elapsed;

/// How one sentence went during a quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceProgress {
    pub sentence: String,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub errors: u32,
}

/// Immutable record of a completed quiz run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ResultRecord")]
pub struct QuizResult {
    id: ResultId,
    paragraph_id: ParagraphId,
    paragraph_text: String,
    rank: Rank,
    total_attempts: u32,
    total_errors: u32,
    sentence_progress: Vec<SentenceProgress>,
    completed_at: DateTime<Utc>,
    #[serde(rename = "elapsedTime")]
    elapsed_seconds: u64,
}

impl QuizResult {
    /// Build the record for a freshly completed run.
    #[must_use]
    pub fn from_outcome(
        id: ResultId,
        paragraph: &Paragraph,
        outcome: SessionOutcome,
        completed_at: DateTime<Utc>,
        elapsed_seconds: u64,
    ) -> Self {
        Self {
            id,
            paragraph_id: paragraph.id().clone(),
            paragraph_text: paragraph.text().to_owned(),
            rank: outcome.rank,
            total_attempts: outcome.total_attempts,
            total_errors: outcome.total_errors,
            sentence_progress: outcome.sentence_progress,
            completed_at,
            elapsed_seconds,
        }
    }

    /// Rehydrate a result from persisted storage.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn from_persisted(
        id: ResultId,
        paragraph_id: ParagraphId,
        paragraph_text: String,
        rank: Rank,
        total_attempts: u32,
        total_errors: u32,
        sentence_progress: Vec<SentenceProgress>,
        completed_at: DateTime<Utc>,
        elapsed_seconds: u64,
    ) -> Self {
        Self {
            id,
            paragraph_id,
            paragraph_text,
            rank,
            total_attempts,
            total_errors,
            sentence_progress,
            completed_at,
            elapsed_seconds,
        }
    }

    #[must_use]
    pub fn id(&self) -> &ResultId {
        &self.id
    }

    #[must_use]
    pub fn paragraph_id(&self) -> &ParagraphId {
        &self.paragraph_id
    }

    #[must_use]
    pub fn paragraph_text(&self) -> &str {
        &self.paragraph_text
    }

    #[must_use]
    pub fn rank(&self) -> &Rank {
        &self.rank
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn total_errors(&self) -> u32 {
        self.total_errors
    }

    #[must_use]
    pub fn sentence_progress(&self) -> &[SentenceProgress] {
        &self.sentence_progress
    }

    #[must_use]
    pub fn completed_at(&self) -> DateTime<Utc> {
        self.completed_at
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Position of this result's rank, best first.
    #[must_use]
    pub fn rank_order(&self) -> u8 {
        rank_order(&self.rank)
    }

    #[must_use]
    pub fn formatted_time(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

impl TryFrom<ResultRecord> for QuizResult {
    type Error = RecordError;

    fn try_from(record: ResultRecord) -> Result<Self, Self::Error> {
        record.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    fn sample() -> QuizResult {
        QuizResult::from_persisted(
            ResultId::new("r-1"),
            ParagraphId::new("p-1"),
            "Uno.".into(),
            Rank::A,
            0,
            2,
            vec![SentenceProgress {
                sentence: "Uno.".into(),
                attempts: 0,
                errors: 2,
            }],
            fixed_now(),
            125,
        )
    }

    #[test]
    fn formatted_time_is_minutes_and_seconds() {
        assert_eq!(sample().formatted_time(), "02:05");
    }

    #[test]
    fn json_uses_storage_field_names() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["paragraphId"], "p-1");
        assert_eq!(json["rank"], "A");
        assert_eq!(json["totalErrors"], 2);
        assert_eq!(json["elapsedTime"], 125);
        assert_eq!(json["sentenceProgress"][0]["errors"], 2);
        assert_eq!(json["completedAt"], "2023-11-14T22:13:20Z");
    }

    #[test]
    fn json_round_trip_preserves_record() {
        let original = sample();
        let json = serde_json::to_string(&original).unwrap();
        let back: QuizResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
