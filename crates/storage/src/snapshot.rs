//! Whole-library export/import document.
//!
//! Import validates the full document before anything is replaced: both
//! top-level arrays must be present and every record must carry its
//! required fields. The first bad record is reported by 1-based position.

use chrono::{DateTime, Utc};
use memo_core::model::{Paragraph, ParagraphRecord, QuizResult, ResultRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Format version written into every export.
pub const SNAPSHOT_VERSION: &str = "1.0";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    #[error("snapshot is not a JSON object: {0}")]
    Malformed(String),

    #[error("snapshot is missing the `{0}` section")]
    MissingSection(&'static str),

    #[error("snapshot section `{0}` must be an array")]
    NotAnArray(&'static str),

    #[error("paragraph {position} is invalid: {reason}")]
    InvalidParagraph { position: usize, reason: String },

    #[error("result {position} is invalid: {reason}")]
    InvalidResult { position: usize, reason: String },

    #[error("failed to write snapshot: {0}")]
    Write(String),
}

/// Everything the library holds, as exchanged with the storage collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub version: String,
    #[serde(rename = "exportDate", skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<DateTime<Utc>>,
    pub paragraphs: Vec<Paragraph>,
    pub results: Vec<QuizResult>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    version: Option<String>,
    export_date: Option<String>,
    paragraphs: Option<Value>,
    results: Option<Value>,
}

impl Snapshot {
    #[must_use]
    pub fn new(
        paragraphs: Vec<Paragraph>,
        results: Vec<QuizResult>,
        exported_at: DateTime<Utc>,
    ) -> Self {
        Self {
            version: SNAPSHOT_VERSION.to_owned(),
            exported_at: Some(exported_at),
            paragraphs,
            results,
        }
    }

    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError::Write` if serialization fails.
    pub fn to_json(&self) -> Result<String, SnapshotError> {
        serde_json::to_string_pretty(self).map_err(|e| SnapshotError::Write(e.to_string()))
    }

    /// Parse and validate an exported document.
    ///
    /// # Errors
    ///
    /// Returns `SnapshotError` describing the first structural problem found.
    pub fn from_json(input: &str) -> Result<Self, SnapshotError> {
        let raw: RawSnapshot =
            serde_json::from_str(input).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

        let paragraphs = section(raw.paragraphs, "paragraphs")?;
        let results = section(raw.results, "results")?;

        let paragraphs = paragraphs
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                parse_paragraph(value).map_err(|reason| SnapshotError::InvalidParagraph {
                    position: idx + 1,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let results = results
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                parse_result(value).map_err(|reason| SnapshotError::InvalidResult {
                    position: idx + 1,
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exported_at = raw
            .export_date
            .and_then(|raw| DateTime::parse_from_rfc3339(&raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc));

        Ok(Self {
            version: raw.version.unwrap_or_else(|| SNAPSHOT_VERSION.to_owned()),
            exported_at,
            paragraphs,
            results,
        })
    }
}

fn section(value: Option<Value>, name: &'static str) -> Result<Vec<Value>, SnapshotError> {
    match value {
        None => Err(SnapshotError::MissingSection(name)),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(SnapshotError::NotAnArray(name)),
    }
}

fn parse_paragraph(value: Value) -> Result<Paragraph, String> {
    let record: ParagraphRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
    record.into_paragraph().map_err(|e| e.to_string())
}

fn parse_result(value: Value) -> Result<QuizResult, String> {
    let record: ResultRecord = serde_json::from_value(value).map_err(|e| e.to_string())?;
    record.into_result().map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::model::ParagraphId;
    use memo_core::time::fixed_now;

    const VALID: &str = r#"{
        "version": "1.0",
        "exportDate": "2023-11-14T22:13:20.000Z",
        "paragraphs": [
            {"id": "1700000000000", "text": "Uno. Dos.", "sentences": ["Uno.", "Dos."],
             "createdAt": "2023-11-14T22:13:20.000Z"}
        ],
        "results": [
            {"id": "r1", "paragraphId": "1700000000000", "paragraphText": "Uno. Dos.",
             "rank": "A", "totalAttempts": 0, "totalErrors": 1,
             "sentenceProgress": [{"sentence": "Uno.", "attempts": 0, "errors": 1}],
             "completedAt": "2023-11-14T22:20:00.000Z", "elapsedTime": 42}
        ]
    }"#;

    #[test]
    fn valid_document_imports() {
        let snapshot = Snapshot::from_json(VALID).unwrap();
        assert_eq!(snapshot.version, "1.0");
        assert_eq!(snapshot.exported_at, Some(fixed_now()));
        assert_eq!(snapshot.paragraphs.len(), 1);
        assert_eq!(snapshot.results[0].elapsed_seconds(), 42);
        assert_eq!(snapshot.results[0].total_errors(), 1);
    }

    #[test]
    fn export_round_trips() {
        let paragraph =
            Paragraph::new(ParagraphId::new("p"), "Hola mundo. Adiós", fixed_now()).unwrap();
        let snapshot = Snapshot::new(vec![paragraph], Vec::new(), fixed_now());

        let json = snapshot.to_json().unwrap();
        assert!(json.contains("\"exportDate\""));
        assert_eq!(Snapshot::from_json(&json).unwrap(), snapshot);
    }

    #[test]
    fn missing_sections_are_reported() {
        let err = Snapshot::from_json(r#"{"paragraphs": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::MissingSection("results")));

        let err = Snapshot::from_json(r#"{"paragraphs": {}, "results": []}"#).unwrap_err();
        assert!(matches!(err, SnapshotError::NotAnArray("paragraphs")));
    }

    #[test]
    fn non_object_input_is_malformed() {
        assert!(matches!(
            Snapshot::from_json("[1, 2]"),
            Err(SnapshotError::Malformed(_))
        ));
        assert!(matches!(
            Snapshot::from_json("not json"),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn first_invalid_record_is_located() {
        let input = r#"{
            "paragraphs": [
                {"id": "a", "text": "Uno.", "sentences": ["Uno."], "createdAt": "2023-11-14T22:13:20Z"},
                {"id": "b", "text": "Dos.", "createdAt": "2023-11-14T22:13:20Z"}
            ],
            "results": []
        }"#;
        match Snapshot::from_json(input).unwrap_err() {
            SnapshotError::InvalidParagraph { position, reason } => {
                assert_eq!(position, 2);
                assert!(reason.contains("sentences"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn result_with_wrong_count_type_is_invalid() {
        let input = r#"{
            "paragraphs": [],
            "results": [
                {"id": "r", "paragraphId": "p", "rank": "S", "totalAttempts": "0",
                 "totalErrors": 0, "sentenceProgress": [], "completedAt": "2023-11-14T22:13:20Z"}
            ]
        }"#;
        assert!(matches!(
            Snapshot::from_json(input),
            Err(SnapshotError::InvalidResult { position: 1, .. })
        ));
    }
}
