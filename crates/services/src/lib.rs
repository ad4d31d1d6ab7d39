#![forbid(unsafe_code)]

pub mod app_services;
pub mod decision;
pub mod error;
pub mod history_service;
pub mod paragraph_service;
pub mod quiz;
pub mod ticker;
pub mod transfer_service;

pub use memo_core::Clock;

pub use app_services::AppServices;
pub use decision::Decision;
pub use error::{
    AppServicesError, HistoryError, ParagraphServiceError, QuizError, TransferError,
};
pub use history_service::ResultHistoryService;
pub use paragraph_service::{DeleteOutcome, ParagraphOverview, ParagraphService};
pub use quiz::{ActiveQuiz, CompletedQuiz, QuizLoopService, SessionView, Submission};
pub use ticker::SessionTicker;
pub use transfer_service::{DataTransferService, ImportSummary};
