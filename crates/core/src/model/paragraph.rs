use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::ids::ParagraphId;
use crate::model::record::{ParagraphRecord, RecordError};
use crate::text::{normalize, segment};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ParagraphError {
    #[error("paragraph text cannot be empty")]
    EmptyText,

    #[error("paragraph must contain at least one sentence ending in '.', '!' or '?'")]
    NoSentences,
}

//
// ─── PARAGRAPH ─────────────────────────────────────────────────────────────────
//

/// A stored passage split into the sentences a quiz walks through.
///
/// `sentences` is never empty; both constructors reject input that would leave it so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "ParagraphRecord")]
pub struct Paragraph {
    id: ParagraphId,
    text: String,
    sentences: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Paragraph {
    /// Segment raw input into a new paragraph.
    ///
    /// The stored `text` is the normalized input; sentences are cut from the raw input.
    ///
    /// # Errors
    ///
    /// Returns `ParagraphError::EmptyText` for blank input and
    /// `ParagraphError::NoSentences` if segmentation finds nothing.
    pub fn new(
        id: ParagraphId,
        raw_text: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ParagraphError> {
        let text = normalize(raw_text);
        if text.is_empty() {
            return Err(ParagraphError::EmptyText);
        }
        let sentences = segment(raw_text);
        if sentences.is_empty() {
            return Err(ParagraphError::NoSentences);
        }

        Ok(Self {
            id,
            text,
            sentences,
            created_at,
        })
    }

    /// Rehydrate a paragraph from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `ParagraphError` if the text is blank or the sentence list is empty.
    pub fn from_persisted(
        id: ParagraphId,
        text: String,
        sentences: Vec<String>,
        created_at: DateTime<Utc>,
    ) -> Result<Self, ParagraphError> {
        if text.trim().is_empty() {
            return Err(ParagraphError::EmptyText);
        }
        if sentences.is_empty() {
            return Err(ParagraphError::NoSentences);
        }

        Ok(Self {
            id,
            text,
            sentences,
            created_at,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ParagraphId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn sentences(&self) -> &[String] {
        &self.sentences
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn sentence_count(&self) -> usize {
        self.sentences.len()
    }

    /// First sentence, cut to `max_chars` characters with `...` appended when longer.
    #[must_use]
    pub fn preview(&self, max_chars: usize) -> String {
        let first = self.sentences.first().map_or("", String::as_str);
        match first.char_indices().nth(max_chars) {
            Some((cut, _)) => format!("{}...", &first[..cut]),
            None => first.to_owned(),
        }
    }
}

impl TryFrom<ParagraphRecord> for Paragraph {
    type Error = RecordError;

    fn try_from(record: ParagraphRecord) -> Result<Self, Self::Error> {
        record.into_paragraph()
    }
}
