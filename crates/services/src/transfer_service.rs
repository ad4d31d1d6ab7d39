use std::sync::Arc;

use memo_core::model::QuizSettings;
use storage::repository::{ParagraphRepository, ResultRepository};
use storage::snapshot::Snapshot;

use crate::Clock;
use crate::error::TransferError;
use crate::history_service::enforce_retention;

/// Counts reported after an import.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub paragraphs: usize,
    pub results: usize,
    /// Results removed by retention right after the import.
    pub dropped: usize,
}

/// Moves the whole library in and out as a JSON snapshot.
#[derive(Clone)]
pub struct DataTransferService {
    clock: Clock,
    settings: QuizSettings,
    paragraphs: Arc<dyn ParagraphRepository>,
    results: Arc<dyn ResultRepository>,
}

impl DataTransferService {
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

    /// # Errors
    ///
    /// Returns `TransferError::Storage` if repository access fails.
    pub async fn export(&self) -> Result<Snapshot, TransferError> {
        let paragraphs = self.paragraphs.list_paragraphs().await?;
        let results = self.results.list_results().await?;
        Ok(Snapshot::new(paragraphs, results, self.clock.now()))
    }

    /// # Errors
    ///
    /// Returns `TransferError` if repository access or serialization fails.
    pub async fn export_json(&self) -> Result<String, TransferError> {
        let snapshot = self.export().await?;
        Ok(snapshot.to_json()?)
    }

    /// Validate a JSON export and replace everything with its contents.
    ///
    /// Nothing is replaced when validation fails.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Snapshot` for invalid documents and
    /// `TransferError::Storage` if repository access fails.
    pub async fn import_json(&self, input: &str) -> Result<ImportSummary, TransferError> {
        let snapshot = Snapshot::from_json(input)?;
        self.import(snapshot).await
    }

    /// Replace all paragraphs and results, then apply retention.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::Storage` if repository access fails.
    pub async fn import(&self, snapshot: Snapshot) -> Result<ImportSummary, TransferError> {
        let paragraphs = snapshot.paragraphs.len();
        let results = snapshot.results.len();

        self.paragraphs.replace_paragraphs(snapshot.paragraphs).await?;
        self.results.replace_results(snapshot.results).await?;
        let dropped =
            enforce_retention(self.results.as_ref(), self.settings.max_results_per_paragraph())
                .await?;

        tracing::info!(
            paragraphs,
            results,
            dropped,
            version = %snapshot.version,
            "library imported"
        );
        Ok(ImportSummary {
            paragraphs,
            results,
            dropped,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use memo_core::model::{Paragraph, ParagraphId};
    use memo_core::time::fixed_now;
    use storage::repository::InMemoryRepository;
    use storage::snapshot::SnapshotError;

    fn service(repo: &InMemoryRepository) -> DataTransferService {
        DataTransferService::new(
            Clock::fixed(fixed_now()),
            QuizSettings::default(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn export_carries_version_and_date() {
        let repo = InMemoryRepository::new();
        let paragraph = Paragraph::new(ParagraphId::new("p"), "Uno. Dos.", fixed_now()).unwrap();
        repo.upsert_paragraph(&paragraph).await.unwrap();

        let snapshot = service(&repo).export().await.unwrap();
        assert_eq!(snapshot.version, "1.0");
        assert_eq!(snapshot.exported_at, Some(fixed_now()));
        assert_eq!(snapshot.paragraphs, vec![paragraph]);
        assert!(snapshot.results.is_empty());
    }

    #[tokio::test]
    async fn invalid_import_changes_nothing() {
        let repo = InMemoryRepository::new();
        let paragraph = Paragraph::new(ParagraphId::new("keep"), "Uno.", fixed_now()).unwrap();
        repo.upsert_paragraph(&paragraph).await.unwrap();

        let err = service(&repo)
            .import_json(r#"{"paragraphs": [{"id": "x"}], "results": []}"#)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransferError::Snapshot(SnapshotError::InvalidParagraph { position: 1, .. })
        ));
        assert_eq!(repo.list_paragraphs().await.unwrap(), vec![paragraph]);
    }

    #[tokio::test]
    async fn import_replaces_existing_data() {
        let repo = InMemoryRepository::new();
        let old = Paragraph::new(ParagraphId::new("old"), "Viejo.", fixed_now()).unwrap();
        repo.upsert_paragraph(&old).await.unwrap();

        let summary = service(&repo)
            .import_json(
                r#"{"paragraphs": [
                    {"id": "new", "text": "Nuevo.", "sentences": ["Nuevo."],
                     "createdAt": "2023-11-14T22:13:20Z"}
                ], "results": []}"#,
            )
            .await
            .unwrap();
        assert_eq!(
            summary,
            ImportSummary {
                paragraphs: 1,
                results: 0,
                dropped: 0
            }
        );

        let stored = repo.list_paragraphs().await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id().as_str(), "new");
    }
}
