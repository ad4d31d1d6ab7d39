use async_trait::async_trait;
use memo_core::model::{Paragraph, ParagraphId, QuizResult};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("conflict")]
    Conflict,

    #[error("connection error: {0}")]
    Connection(String),
}

/// Repository contract for stored paragraphs.
#[async_trait]
pub trait ParagraphRepository: Send + Sync {
    /// Persist or update a paragraph.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the paragraph cannot be stored.
    async fn upsert_paragraph(&self, paragraph: &Paragraph) -> Result<(), StorageError>;

    /// Fetch a paragraph by ID.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_paragraph(&self, id: &ParagraphId) -> Result<Paragraph, StorageError>;

    /// List paragraphs in the order they were first stored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_paragraphs(&self) -> Result<Vec<Paragraph>, StorageError>;

    /// Remove a paragraph.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn delete_paragraph(&self, id: &ParagraphId) -> Result<(), StorageError>;

    /// Replace every stored paragraph.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn replace_paragraphs(&self, paragraphs: Vec<Paragraph>) -> Result<(), StorageError>;
}

/// Repository contract for completed quiz results. Results are append-only;
/// only retention and paragraph deletion remove them.
#[async_trait]
pub trait ResultRepository: Send + Sync {
    /// Append a result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Conflict` if a result with the same ID exists.
    async fn append_result(&self, result: &QuizResult) -> Result<(), StorageError>;

    /// List every stored result in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results(&self) -> Result<Vec<QuizResult>, StorageError>;

    /// List results belonging to one paragraph, unsorted.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn list_results_for_paragraph(
        &self,
        paragraph_id: &ParagraphId,
    ) -> Result<Vec<QuizResult>, StorageError>;

    /// Delete every result of a paragraph and return how many were removed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn delete_results_for_paragraph(
        &self,
        paragraph_id: &ParagraphId,
    ) -> Result<usize, StorageError>;

    /// Replace every stored result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` on backend failures.
    async fn replace_results(&self, results: Vec<QuizResult>) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    paragraphs: Arc<Mutex<Vec<Paragraph>>>,
    results: Arc<Mutex<Vec<QuizResult>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

#[async_trait]
impl ParagraphRepository for InMemoryRepository {
    async fn upsert_paragraph(&self, paragraph: &Paragraph) -> Result<(), StorageError> {
        let mut guard = self.paragraphs.lock().map_err(poisoned)?;
        match guard.iter_mut().find(|p| p.id() == paragraph.id()) {
            Some(existing) => *existing = paragraph.clone(),
            None => guard.push(paragraph.clone()),
        }
        Ok(())
    }

    async fn get_paragraph(&self, id: &ParagraphId) -> Result<Paragraph, StorageError> {
        let guard = self.paragraphs.lock().map_err(poisoned)?;
        guard
            .iter()
            .find(|p| p.id() == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn list_paragraphs(&self) -> Result<Vec<Paragraph>, StorageError> {
        let guard = self.paragraphs.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn delete_paragraph(&self, id: &ParagraphId) -> Result<(), StorageError> {
        let mut guard = self.paragraphs.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|p| p.id() != id);
        if guard.len() == before {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn replace_paragraphs(&self, paragraphs: Vec<Paragraph>) -> Result<(), StorageError> {
        let mut guard = self.paragraphs.lock().map_err(poisoned)?;
        *guard = paragraphs;
        Ok(())
    }
}

#[async_trait]
impl ResultRepository for InMemoryRepository {
    async fn append_result(&self, result: &QuizResult) -> Result<(), StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        if guard.iter().any(|r| r.id() == result.id()) {
            return Err(StorageError::Conflict);
        }
        guard.push(result.clone());
        Ok(())
    }

    async fn list_results(&self) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        Ok(guard.clone())
    }

    async fn list_results_for_paragraph(
        &self,
        paragraph_id: &ParagraphId,
    ) -> Result<Vec<QuizResult>, StorageError> {
        let guard = self.results.lock().map_err(poisoned)?;
        Ok(guard
            .iter()
            .filter(|r| r.paragraph_id() == paragraph_id)
            .cloned()
            .collect())
    }

    async fn delete_results_for_paragraph(
        &self,
        paragraph_id: &ParagraphId,
    ) -> Result<usize, StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        let before = guard.len();
        guard.retain(|r| r.paragraph_id() != paragraph_id);
        Ok(before - guard.len())
    }

    async fn replace_results(&self, results: Vec<QuizResult>) -> Result<(), StorageError> {
        let mut guard = self.results.lock().map_err(poisoned)?;
        *guard = results;
        Ok(())
    }
}

/// Aggregates repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub paragraphs: Arc<dyn ParagraphRepository>,
    pub results: Arc<dyn ResultRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let repo = InMemoryRepository::new();
        let paragraphs: Arc<dyn ParagraphRepository> = Arc::new(repo.clone());
        let results: Arc<dyn ResultRepository> = Arc::new(repo);
        Self {
            paragraphs,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memo_core::model::{ResultId, SentenceProgress};
    use memo_core::rank::Rank;
    use memo_core::time::fixed_now;

    fn build_paragraph(id: &str, text: &str) -> Paragraph {
        Paragraph::new(ParagraphId::new(id), text, fixed_now()).unwrap()
    }

    fn build_result(id: &str, paragraph_id: &str) -> QuizResult {
        QuizResult::from_persisted(
            ResultId::new(id),
            ParagraphId::new(paragraph_id),
            "Uno.".into(),
            Rank::S,
            0,
            0,
            vec![SentenceProgress {
                sentence: "Uno.".into(),
                attempts: 0,
                errors: 0,
            }],
            fixed_now(),
            12,
        )
    }

    #[tokio::test]
    async fn upsert_keeps_insertion_order_and_replaces_in_place() {
        let repo = InMemoryRepository::new();
        repo.upsert_paragraph(&build_paragraph("a", "Uno.")).await.unwrap();
        repo.upsert_paragraph(&build_paragraph("b", "Dos.")).await.unwrap();
        repo.upsert_paragraph(&build_paragraph("a", "Tres. Cuatro."))
            .await
            .unwrap();

        let listed = repo.list_paragraphs().await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id().as_str(), "a");
        assert_eq!(listed[0].sentence_count(), 2);
    }

    #[tokio::test]
    async fn missing_paragraph_is_not_found() {
        let repo = InMemoryRepository::new();
        let id = ParagraphId::new("nope");
        assert!(matches!(
            repo.get_paragraph(&id).await,
            Err(StorageError::NotFound)
        ));
        assert!(matches!(
            repo.delete_paragraph(&id).await,
            Err(StorageError::NotFound)
        ));
    }

    #[tokio::test]
    async fn duplicate_result_id_conflicts() {
        let repo = InMemoryRepository::new();
        repo.append_result(&build_result("r", "p")).await.unwrap();
        assert!(matches!(
            repo.append_result(&build_result("r", "p")).await,
            Err(StorageError::Conflict)
        ));
    }

    #[tokio::test]
    async fn deleting_results_only_touches_one_paragraph() {
        let repo = InMemoryRepository::new();
        repo.append_result(&build_result("r1", "p")).await.unwrap();
        repo.append_result(&build_result("r2", "p")).await.unwrap();
        repo.append_result(&build_result("r3", "q")).await.unwrap();

        let removed = repo
            .delete_results_for_paragraph(&ParagraphId::new("p"))
            .await
            .unwrap();

        assert_eq!(removed, 2);
        let remaining = repo.list_results().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id().as_str(), "r3");
    }

    #[test]
    fn every_error_variant_has_a_message() {
        let errors = [
            StorageError::NotFound,
            StorageError::Conflict,
            StorageError::Connection("lock poisoned".into()),
        ];
        for err in errors {
            let expected = match &err {
                StorageError::NotFound => "not found".to_owned(),
                StorageError::Conflict => "conflict".to_owned(),
                StorageError::Connection(reason) => format!("connection error: {reason}"),
            };
            assert_eq!(err.to_string(), expected);
        }
    }
}
