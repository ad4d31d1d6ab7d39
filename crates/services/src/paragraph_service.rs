use chrono::{DateTime, Utc};
use std::sync::Arc;

use memo_core::model::{Paragraph, ParagraphId, QuizSettings};
use memo_core::rank::{Rank, best_for};
use storage::repository::{ParagraphRepository, ResultRepository};

use crate::Clock;
use crate::decision::Decision;
use crate::error::ParagraphServiceError;

/// Row of the paragraph list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParagraphOverview {
    pub id: ParagraphId,
    pub preview: String,
    pub sentence_count: usize,
    pub created_at: DateTime<Utc>,
    pub best_rank: Option<Rank>,
    pub runs: usize,
}

/// What a delete request ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted { results_removed: usize },
    Kept,
}

/// Orchestrates paragraph creation, listing and removal.
#[derive(Clone)]
pub struct ParagraphService {
    clock: Clock,
    settings: QuizSettings,
    paragraphs: Arc<dyn ParagraphRepository>,
    results: Arc<dyn ResultRepository>,
}

impl ParagraphService {
    #[must_use]
    pub fn new(
        clock: Clock,
        settings: QuizSettings,
        paragraphs: Arc<dyn ParagraphRepository>,
        results: Arc<dyn ResultRepository>,
    ) -> Self {
        Self {
            clock,
            settings,
            paragraphs,
            results,
        }
    }

    /// Segment raw text into a new paragraph and persist it.
    ///
    /// # Errors
    ///
    /// Returns `ParagraphServiceError::Paragraph` if the text has no sentences.
    /// Returns `ParagraphServiceError::Storage` if persistence fails.
    pub async fn add_paragraph(&self, raw_text: &str) -> Result<Paragraph, ParagraphServiceError> {
        let paragraph = Paragraph::new(ParagraphId::generate(), raw_text, self.clock.now())?;
        self.paragraphs.upsert_paragraph(&paragraph).await?;

        tracing::info!(
            paragraph = %paragraph.id(),
            sentences = paragraph.sentence_count(),
            "paragraph added"
        );
        Ok(paragraph)
    }

    /// # Errors
    ///
    /// Returns `ParagraphServiceError::Storage` if the paragraph is missing.
    pub async fn get_paragraph(&self, id: &ParagraphId) -> Result<Paragraph, ParagraphServiceError> {
        let paragraph = self.paragraphs.get_paragraph(id).await?;
        Ok(paragraph)
    }

    /// # Errors
    ///
    /// Returns `ParagraphServiceError::Storage` if repository access fails.
    pub async fn list_paragraphs(&self) -> Result<Vec<Paragraph>, ParagraphServiceError> {
        let paragraphs = self.paragraphs.list_paragraphs().await?;
        Ok(paragraphs)
    }

    /// Paragraph rows with preview text and best rank, in storage order.
    ///
    /// # Errors
    ///
    /// Returns `ParagraphServiceError::Storage` if repository access fails.
    pub async fn overview(&self) -> Result<Vec<ParagraphOverview>, ParagraphServiceError> {
        let paragraphs = self.paragraphs.list_paragraphs().await?;
        let results = self.results.list_results().await?;

        Ok(paragraphs
            .iter()
            .map(|paragraph| {
                let id = paragraph.id();
                ParagraphOverview {
                    id: id.clone(),
                    preview: paragraph.preview(self.settings.preview_length()),
                    sentence_count: paragraph.sentence_count(),
                    created_at: paragraph.created_at(),
                    best_rank: best_for(&results, id).map(|best| best.rank().clone()),
                    runs: results.iter().filter(|r| r.paragraph_id() == id).count(),
                }
            })
            .collect())
    }

    /// Delete a paragraph and all of its results once the user confirms.
    ///
    /// # Errors
    ///
    /// Returns `ParagraphServiceError::Storage` if the paragraph is missing or
    /// repository access fails.
    pub async fn delete_paragraph(
        &self,
        id: &ParagraphId,
        decision: Decision,
    ) -> Result<DeleteOutcome, ParagraphServiceError> {
        if !decision.is_confirmed() {
            return Ok(DeleteOutcome::Kept);
        }

        self.paragraphs.delete_paragraph(id).await?;
        let results_removed = self.results.delete_results_for_paragraph(id).await?;

        tracing::info!(paragraph = %id, results_removed, "paragraph deleted");
        Ok(DeleteOutcome::Deleted { results_removed })
    }
}
