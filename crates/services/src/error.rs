//! Shared error types for the services crate.

use thiserror::Error;

use memo_core::model::{ParagraphError, SessionError, SessionPhase, SettingsError};
use storage::repository::StorageError;
use storage::snapshot::SnapshotError;

/// Errors emitted by `QuizLoopService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("submission is empty")]
    EmptySubmission,
    #[error("quiz is not finished (currently {phase})")]
    NotFinished { phase: SessionPhase },
    #[error("quiz result was already recorded")]
    AlreadyRecorded,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ParagraphService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ParagraphServiceError {
    #[error(transparent)]
    Paragraph(#[from] ParagraphError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `ResultHistoryService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum HistoryError {
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted by `DataTransferService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TransferError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
