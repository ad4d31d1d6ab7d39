use std::sync::Arc;

use memo_core::model::{QuizSettings, QuizSettingsDraft};
use storage::repository::Storage;

use crate::Clock;
use crate::error::AppServicesError;
use crate::history_service::ResultHistoryService;
use crate::paragraph_service::ParagraphService;
use crate::quiz::QuizLoopService;
use crate::transfer_service::DataTransferService;

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    settings: QuizSettings,
    quiz_loop: Arc<QuizLoopService>,
    paragraphs: Arc<ParagraphService>,
    history: Arc<ResultHistoryService>,
    transfer: Arc<DataTransferService>,
}

impl AppServices {
    /// Build services over the given storage.
    #[must_use]
    pub fn new(storage: &Storage, clock: Clock, settings: QuizSettings) -> Self {
        let quiz_loop = Arc::new(QuizLoopService::new(
            clock,
            settings.clone(),
            Arc::clone(&storage.paragraphs),
            Arc::clone(&storage.results),
        ));
        let paragraphs = Arc::new(ParagraphService::new(
            clock,
            settings.clone(),
            Arc::clone(&storage.paragraphs),
            Arc::clone(&storage.results),
        ));
        let history = Arc::new(ResultHistoryService::new(
            settings.clone(),
            Arc::clone(&storage.results),
        ));
        let transfer = Arc::new(DataTransferService::new(
            clock,
            settings.clone(),
            Arc::clone(&storage.paragraphs),
            Arc::clone(&storage.results),
        ));

        Self {
            settings,
            quiz_loop,
            paragraphs,
            history,
            transfer,
        }
    }

    /// Build services backed by in-memory storage.
    #[must_use]
    pub fn in_memory(clock: Clock, settings: QuizSettings) -> Self {
        Self::new(&Storage::in_memory(), clock, settings)
    }

    /// Build services over the given storage with settings read from `MEMO_*`
    /// environment variables.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError::Settings` if an override is out of range.
    pub fn from_env(storage: &Storage, clock: Clock) -> Result<Self, AppServicesError> {
        let settings = QuizSettingsDraft::from_env().validate()?;
        Ok(Self::new(storage, clock, settings))
    }

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    #[must_use]
    pub fn quiz_loop(&self) -> Arc<QuizLoopService> {
        Arc::clone(&self.quiz_loop)
    }

    #[must_use]
    pub fn paragraphs(&self) -> Arc<ParagraphService> {
        Arc::clone(&self.paragraphs)
    }

    #[must_use]
    pub fn history(&self) -> Arc<ResultHistoryService> {
        Arc::clone(&self.history)
    }

    #[must_use]
    pub fn transfer(&self) -> Arc<DataTransferService> {
        Arc::clone(&self.transfer)
    }
}
