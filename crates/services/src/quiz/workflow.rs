use std::sync::Arc;
use std::time::Duration;

use memo_core::diff::DiffSegment;
use memo_core::model::{
    Judgement, ParagraphId, QuizResult, QuizSession, QuizSettings, ResultId, SessionPhase,
};
use memo_core::rank::aggregate;
use memo_core::text::normalize;
use storage::repository::{ParagraphRepository, ResultRepository};

use super::active::{ActiveQuiz, SessionView};
use crate::Clock;
use crate::decision::Decision;
use crate::error::QuizError;
use crate::history_service::enforce_retention;
use crate::ticker::SessionTicker;

/// Outcome of a submission as reported to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    /// Accepted. `next` is the 1-based number of the following sentence, if any.
    /// `feedback_delay` is how long to hold the confirmation before moving on.
    Correct {
        finished: bool,
        next: Option<usize>,
        feedback_delay: Duration,
    },
    Incorrect {
        similarity: u8,
        segments: Vec<DiffSegment>,
        has_error: bool,
    },
}

/// A finished and stored quiz, ready for the results screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedQuiz {
    pub result: QuizResult,
    pub description: &'static str,
    /// Older results of the same paragraph removed by retention.
    pub dropped: usize,
}

/// Drives a quiz from start to a stored result.
///
/// All session mutation happens through `&mut ActiveQuiz`, one action at a time.
#[derive(Clone)]
pub struct QuizLoopService {
    clock: Clock,
    settings: QuizSettings,
    paragraphs: Arc<dyn ParagraphRepository>,
    results: Arc<dyn ResultRepository>,
}

impl QuizLoopService {
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

    #[must_use]
    pub fn settings(&self) -> &QuizSettings {
        &self.settings
    }

    /// Start a quiz over a stored paragraph, with its clock running.
    ///
    /// Must be called from within a tokio runtime; the ticker is spawned on it.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the paragraph cannot be loaded.
    pub async fn start_quiz(&self, paragraph_id: &ParagraphId) -> Result<ActiveQuiz, QuizError> {
        let paragraph = self.paragraphs.get_paragraph(paragraph_id).await?;
        let mut session = QuizSession::new(Arc::new(paragraph));
        session.start_timer(self.clock.now());
        let ticker = SessionTicker::spawn(self.settings.tick_interval());

        tracing::info!(
            paragraph = %paragraph_id,
            sentences = session.total_sentences(),
            "quiz started"
        );
        Ok(ActiveQuiz::new(session, ticker))
    }

    /// Start over on the paragraph of a finished quiz.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Storage` if the paragraph is gone.
    pub async fn try_again(&self, completed: &CompletedQuiz) -> Result<ActiveQuiz, QuizError> {
        self.start_quiz(completed.result.paragraph_id()).await
    }

    /// Refresh the elapsed time and describe the current step.
    #[must_use]
    pub fn view(&self, quiz: &mut ActiveQuiz) -> SessionView {
        quiz.view(self.clock.now())
    }

    /// Hide the sentence and accept input.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` unless the sentence is being studied.
    pub fn begin_writing(&self, quiz: &mut ActiveQuiz) -> Result<(), QuizError> {
        quiz.session_mut().begin_writing()?;
        Ok(())
    }

    /// Judge the typed recollection of the active sentence.
    ///
    /// Surrounding whitespace is ignored. Blank input is rejected without
    /// touching the session.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::EmptySubmission` for blank input and
    /// `QuizError::Session` outside the writing phase.
    pub fn submit(&self, quiz: &mut ActiveQuiz, input: &str) -> Result<Submission, QuizError> {
        let recalled = input.trim();
        if recalled.is_empty() {
            return Err(QuizError::EmptySubmission);
        }

        let judgement = quiz.session_mut().submit(recalled)?;
        match judgement {
            Judgement::Correct { finished } => {
                let next = if finished {
                    quiz.stop(self.clock.now());
                    None
                } else {
                    Some(quiz.session().current_sentence_number())
                };
                Ok(Submission::Correct {
                    finished,
                    next,
                    feedback_delay: self.settings.feedback_delay(),
                })
            }
            Judgement::Incorrect(mismatch) => {
                let session = quiz.session();
                let expected = session.current_sentence()?;
                tracing::debug!(
                    sentence = session.current_sentence_number(),
                    typed = ?recalled,
                    expected = ?expected,
                    typed_normalized = ?normalize(recalled),
                    expected_normalized = ?normalize(expected),
                    similarity = mismatch.similarity,
                    "incorrect submission"
                );
                let has_error = mismatch.has_error();
                Ok(Submission::Incorrect {
                    similarity: mismatch.similarity,
                    segments: mismatch.segments,
                    has_error,
                })
            }
        }
    }

    /// Show the active sentence again, counting a review.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` unless writing or after a miss.
    pub fn review(&self, quiz: &mut ActiveQuiz) -> Result<(), QuizError> {
        quiz.session_mut().review()?;
        Ok(())
    }

    /// Clear the input and try the same sentence again.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` unless after a miss.
    pub fn retry(&self, quiz: &mut ActiveQuiz) -> Result<(), QuizError> {
        quiz.session_mut().retry()?;
        Ok(())
    }

    /// Grade the finished quiz, store the result and apply retention.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::NotFinished` before the last sentence is accepted,
    /// `QuizError::AlreadyRecorded` on a second call, and `QuizError::Storage`
    /// if the result cannot be stored. A failed retention pass is logged and
    /// reported as `dropped: 0`.
    pub async fn complete(&self, quiz: &mut ActiveQuiz) -> Result<CompletedQuiz, QuizError> {
        let phase = quiz.phase();
        if phase != SessionPhase::Complete {
            return Err(QuizError::NotFinished { phase });
        }
        if quiz.recorded().is_some() {
            return Err(QuizError::AlreadyRecorded);
        }

        let now = self.clock.now();
        let elapsed = quiz.stop(now);
        let outcome = aggregate(quiz.session_mut());
        let description = outcome.description;
        let result = QuizResult::from_outcome(
            ResultId::generate(),
            quiz.session().paragraph(),
            outcome,
            now,
            elapsed,
        );

        self.results.append_result(&result).await?;
        quiz.mark_recorded(result.id().clone());
        // The result is already stored; retention is best effort from here.
        let dropped = match enforce_retention(
            self.results.as_ref(),
            self.settings.max_results_per_paragraph(),
        )
        .await
        {
            Ok(dropped) => dropped,
            Err(err) => {
                tracing::warn!(error = %err, "retention failed after storing result");
                0
            }
        };

        tracing::info!(
            paragraph = %result.paragraph_id(),
            rank = %result.rank(),
            attempts = result.total_attempts(),
            errors = result.total_errors(),
            elapsed = %result.formatted_time(),
            "quiz completed"
        );

        Ok(CompletedQuiz {
            result,
            description,
            dropped,
        })
    }

    /// Abandon the quiz if the user confirms. Returns whether it was abandoned.
    ///
    /// An abandoned quiz never produces a result.
    ///
    /// # Errors
    ///
    /// Returns `QuizError::Session` if the quiz already ended.
    pub fn quit(&self, quiz: &mut ActiveQuiz, decision: Decision) -> Result<bool, QuizError> {
        if !decision.is_confirmed() {
            return Ok(false);
        }

        quiz.session_mut().abandon()?;
        let elapsed = quiz.stop(self.clock.now());
        tracing::info!(
            paragraph = %quiz.session().paragraph().id(),
            sentence = quiz.session().current_sentence_number(),
            elapsed,
            "quiz abandoned"
        );
        Ok(true)
    }
}
