//! Loosely-typed shapes for records arriving from outside the core.
//!
//! Every field is optional so that a missing one can be reported by name
//! instead of failing the whole document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::{ParagraphId, ResultId};
use crate::model::paragraph::{Paragraph, ParagraphError};
use crate::model::result::{QuizResult, SentenceProgress};
use crate::rank::Rank;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RecordError {
    #[error("{record} record is missing `{field}`")]
    MissingField {
        record: &'static str,
        field: &'static str,
    },

    #[error("{record} record has an invalid `{field}` timestamp: {value}")]
    InvalidTimestamp {
        record: &'static str,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Paragraph(#[from] ParagraphError),
}

fn require<T>(
    value: Option<T>,
    record: &'static str,
    field: &'static str,
) -> Result<T, RecordError> {
    value.ok_or(RecordError::MissingField { record, field })
}

fn require_text(
    value: Option<String>,
    record: &'static str,
    field: &'static str,
) -> Result<String, RecordError> {
    require(value, record, field).and_then(|text| {
        if text.trim().is_empty() {
            Err(RecordError::MissingField { record, field })
        } else {
            Ok(text)
        }
    })
}

fn parse_timestamp(
    value: Option<String>,
    record: &'static str,
    field: &'static str,
) -> Result<DateTime<Utc>, RecordError> {
    let raw = require_text(value, record, field)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|parsed| parsed.with_timezone(&Utc))
        .map_err(|_| RecordError::InvalidTimestamp {
            record,
            field,
            value: raw,
        })
}

//
// ─── PARAGRAPH RECORD ──────────────────────────────────────────────────────────
//

/// External paragraph shape: `{id, text, sentences[], createdAt}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphRecord {
    pub id: Option<String>,
    pub text: Option<String>,
    pub sentences: Option<Vec<String>>,
    pub created_at: Option<String>,
}

impl ParagraphRecord {
    /// Validate the record into a domain `Paragraph`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` naming the first missing or malformed field.
    pub fn into_paragraph(self) -> Result<Paragraph, RecordError> {
        const RECORD: &str = "paragraph";
        let id = require_text(self.id, RECORD, "id")?;
        let text = require_text(self.text, RECORD, "text")?;
        let sentences = require(self.sentences, RECORD, "sentences")?;
        let created_at = parse_timestamp(self.created_at, RECORD, "createdAt")?;

        Ok(Paragraph::from_persisted(
            ParagraphId::new(id),
            text,
            sentences,
            created_at,
        )?)
    }
}

//
// ─── RESULT RECORD ─────────────────────────────────────────────────────────────
//

/// External result shape. `paragraphText` and `elapsedTime` are optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultRecord {
    pub id: Option<String>,
    pub paragraph_id: Option<String>,
    pub paragraph_text: Option<String>,
    pub rank: Option<String>,
    pub total_attempts: Option<u32>,
    pub total_errors: Option<u32>,
    pub sentence_progress: Option<Vec<SentenceProgress>>,
    pub completed_at: Option<String>,
    pub elapsed_time: Option<u64>,
}

impl ResultRecord {
    /// Validate the record into a domain `QuizResult`.
    ///
    /// # Errors
    ///
    /// Returns `RecordError` naming the first missing or malformed field.
    pub fn into_result(self) -> Result<QuizResult, RecordError> {
        const RECORD: &str = "result";
        let id = require_text(self.id, RECORD, "id")?;
        let paragraph_id = require_text(self.paragraph_id, RECORD, "paragraphId")?;
        let rank = require_text(self.rank, RECORD, "rank")?;
        let total_attempts = require(self.total_attempts, RECORD, "totalAttempts")?;
        let total_errors = require(self.total_errors, RECORD, "totalErrors")?;
        let sentence_progress = require(self.sentence_progress, RECORD, "sentenceProgress")?;
        let completed_at = parse_timestamp(self.completed_at, RECORD, "completedAt")?;

        Ok(QuizResult::from_persisted(
            ResultId::new(id),
            ParagraphId::new(paragraph_id),
            self.paragraph_text.unwrap_or_default(),
            Rank::from_symbol(&rank),
            total_attempts,
            total_errors,
            sentence_progress,
            completed_at,
            self.elapsed_time.unwrap_or(0),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_paragraph() -> ParagraphRecord {
        ParagraphRecord {
            id: Some("1700000000000".into()),
            text: Some("Uno. Dos.".into()),
            sentences: Some(vec!["Uno.".into(), "Dos.".into()]),
            created_at: Some("2023-11-14T22:13:20.000Z".into()),
        }
    }

    fn full_result() -> ResultRecord {
        ResultRecord {
            id: Some("r1".into()),
            paragraph_id: Some("p1".into()),
            paragraph_text: None,
            rank: Some("B".into()),
            total_attempts: Some(2),
            total_errors: Some(1),
            sentence_progress: Some(Vec::new()),
            completed_at: Some("2023-11-14T22:13:20Z".into()),
            elapsed_time: None,
        }
    }

    #[test]
    fn complete_paragraph_record_validates() {
        let paragraph = full_paragraph().into_paragraph().unwrap();
        assert_eq!(paragraph.id().as_str(), "1700000000000");
        assert_eq!(paragraph.sentence_count(), 2);
    }

    #[test]
    fn missing_paragraph_fields_are_named() {
        let mut record = full_paragraph();
        record.created_at = None;
        assert_eq!(
            record.into_paragraph().unwrap_err(),
            RecordError::MissingField {
                record: "paragraph",
                field: "createdAt"
            }
        );

        let mut record = full_paragraph();
        record.text = Some(String::new());
        assert!(matches!(
            record.into_paragraph(),
            Err(RecordError::MissingField { field: "text", .. })
        ));
    }

    #[test]
    fn paragraph_without_sentences_is_invalid() {
        let mut record = full_paragraph();
        record.sentences = Some(Vec::new());
        assert_eq!(
            record.into_paragraph().unwrap_err(),
            RecordError::Paragraph(ParagraphError::NoSentences)
        );
    }

    #[test]
    fn bad_timestamp_is_reported() {
        let mut record = full_result();
        record.completed_at = Some("yesterday".into());
        assert!(matches!(
            record.into_result(),
            Err(RecordError::InvalidTimestamp { field: "completedAt", .. })
        ));
    }

    #[test]
    fn optional_result_fields_default() {
        let result = full_result().into_result().unwrap();
        assert_eq!(result.paragraph_text(), "");
        assert_eq!(result.elapsed_seconds(), 0);
        assert_eq!(result.rank(), &Rank::B);
    }

    #[test]
    fn unknown_rank_is_preserved() {
        let mut record = full_result();
        record.rank = Some("Z".into());
        let result = record.into_result().unwrap();
        assert_eq!(result.rank(), &Rank::Other("Z".into()));
        assert_eq!(result.rank_order(), 4);
    }

    #[test]
    fn missing_counts_are_invalid() {
        let mut record = full_result();
        record.total_errors = None;
        assert!(matches!(
            record.into_result(),
            Err(RecordError::MissingField { field: "totalErrors", .. })
        ));
    }
}
