use std::sync::Arc;

use memo_core::model::{ParagraphId, QuizResult, QuizSettings};
use memo_core::rank::{best_for, filter_by_paragraph, retain};
use storage::repository::{ResultRepository, StorageError};

use crate::error::HistoryError;

/// Trim stored results to the newest `max_per_paragraph` per paragraph.
///
/// Returns how many results were dropped. Storage is only rewritten when
/// something was dropped.
pub(crate) async fn enforce_retention(
    results: &dyn ResultRepository,
    max_per_paragraph: usize,
) -> Result<usize, StorageError> {
    let all = results.list_results().await?;
    let before = all.len();
    let kept = retain(all, max_per_paragraph);
    let dropped = before - kept.len();

    if dropped > 0 {
        tracing::warn!(dropped, max_per_paragraph, "retention dropped old results");
        results.replace_results(kept).await?;
    }
    Ok(dropped)
}

/// Read access to past results, plus retention.
#[derive(Clone)]
pub struct ResultHistoryService {
    settings: QuizSettings,
    results: Arc<dyn ResultRepository>,
}

impl ResultHistoryService {
    #[must_use]
    pub fn new(settings: QuizSettings, results: Arc<dyn ResultRepository>) -> Self {
        Self { settings, results }
    }

    /// Results for one paragraph, newest first.
    ///
    /// `limit` defaults to the configured history limit.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if repository access fails.
    pub async fn history(
        &self,
        paragraph_id: &ParagraphId,
        limit: Option<usize>,
    ) -> Result<Vec<QuizResult>, HistoryError> {
        let results = self.results.list_results_for_paragraph(paragraph_id).await?;
        let limit = limit.unwrap_or(self.settings.history_limit());
        Ok(filter_by_paragraph(&results, paragraph_id, Some(limit))
            .into_iter()
            .cloned()
            .collect())
    }

    /// Every stored result, newest first.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if repository access fails.
    pub async fn all_results(&self) -> Result<Vec<QuizResult>, HistoryError> {
        let mut results = self.results.list_results().await?;
        results.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
        Ok(results)
    }

    /// Best result for a paragraph, if it has any.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if repository access fails.
    pub async fn best(&self, paragraph_id: &ParagraphId) -> Result<Option<QuizResult>, HistoryError> {
        let results = self.results.list_results_for_paragraph(paragraph_id).await?;
        Ok(best_for(&results, paragraph_id).cloned())
    }

    /// Apply the configured per-paragraph cap now.
    ///
    /// # Errors
    ///
    /// Returns `HistoryError::Storage` if repository access fails.
    pub async fn enforce_retention(&self) -> Result<usize, HistoryError> {
        let dropped =
            enforce_retention(self.results.as_ref(), self.settings.max_results_per_paragraph())
                .await?;
        Ok(dropped)
    }
}
