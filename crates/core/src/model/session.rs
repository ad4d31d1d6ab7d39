use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::diff::{self, DiffSegment};
use crate::model::paragraph::Paragraph;
use crate::text::is_match;
use crate::time::whole_seconds_between;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    /// The controller stepped past the last sentence. This is a bug in the caller.
    #[error("sentence index {index} is out of range for {len} sentences")]
    OutOfRange { index: usize, len: usize },

    #[error("cannot {action} while {phase}")]
    InvalidTransition {
        phase: SessionPhase,
        action: &'static str,
    },
}

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Where a quiz run currently stands.
///
/// A correct submission is reported through [`Judgement::Correct`] and moves
/// straight on to `Studying` or `Complete`, so it has no phase of its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SessionPhase {
    /// The sentence is on screen, read-only.
    Studying,
    /// The sentence is hidden and input is active.
    Writing,
    /// The last submission was wrong; waiting for review or retry.
    Incorrect,
    Complete,
    Abandoned,
}

impl SessionPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Complete | Self::Abandoned)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Studying => "studying",
            Self::Writing => "writing",
            Self::Incorrect => "incorrect",
            Self::Complete => "complete",
            Self::Abandoned => "abandoned",
        };
        f.write_str(label)
    }
}

//
// ─── JUDGEMENT ─────────────────────────────────────────────────────────────────
//

/// Where a wrong recollection diverges from the sentence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub similarity: u8,
    pub segments: Vec<DiffSegment>,
}

impl Mismatch {
    #[must_use]
    pub fn has_error(&self) -> bool {
        diff::has_error(&self.segments)
    }
}

/// Outcome of one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Judgement {
    /// Accepted. `finished` is true when that was the last sentence.
    Correct { finished: bool },
    Incorrect(Mismatch),
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Mutable state of one quiz run over a paragraph.
///
/// Counters are sized to the sentence count up front, so every sentence has an
/// entry even if it was never reviewed or missed.
#[derive(Clone)]
pub struct QuizSession {
    paragraph: Arc<Paragraph>,
    phase: SessionPhase,
    current: usize,
    attempts: Vec<u32>,
    errors: Vec<u32>,
    total_attempts: u32,
    started_at: Option<DateTime<Utc>>,
    elapsed_seconds: u64,
    timer_stopped: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new(paragraph: Arc<Paragraph>) -> Self {
        let len = paragraph.sentence_count();
        Self {
            paragraph,
            phase: SessionPhase::Studying,
            current: 0,
            attempts: vec![0; len],
            errors: vec![0; len],
            total_attempts: 0,
            started_at: None,
            elapsed_seconds: 0,
            timer_stopped: false,
        }
    }

    #[must_use]
    pub fn paragraph(&self) -> &Arc<Paragraph> {
        &self.paragraph
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    /// 1-based number of the active sentence.
    #[must_use]
    pub fn current_sentence_number(&self) -> usize {
        self.current + 1
    }

    #[must_use]
    pub fn total_sentences(&self) -> usize {
        self.paragraph.sentence_count()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.current >= self.total_sentences()
    }

    #[must_use]
    pub fn attempts(&self) -> &[u32] {
        &self.attempts
    }

    #[must_use]
    pub fn errors(&self) -> &[u32] {
        &self.errors
    }

    #[must_use]
    pub fn total_attempts(&self) -> u32 {
        self.total_attempts
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Last computed elapsed time, without recomputing.
    #[must_use]
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    fn out_of_range(&self) -> SessionError {
        SessionError::OutOfRange {
            index: self.current,
            len: self.total_sentences(),
        }
    }

    fn checked_index(&self) -> Result<usize, SessionError> {
        if self.current < self.total_sentences() {
            Ok(self.current)
        } else {
            Err(self.out_of_range())
        }
    }

    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` once every sentence has been passed.
    pub fn current_sentence(&self) -> Result<&str, SessionError> {
        let index = self.checked_index()?;
        Ok(&self.paragraph.sentences()[index])
    }

    /// Count a re-study of the active sentence.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` past the last sentence.
    pub fn record_review(&mut self) -> Result<(), SessionError> {
        let index = self.checked_index()?;
        self.attempts[index] = self.attempts[index].saturating_add(1);
        self.total_attempts = self.total_attempts.saturating_add(1);
        Ok(())
    }

    /// Count a wrong submission for the active sentence.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` past the last sentence.
    pub fn record_error(&mut self) -> Result<(), SessionError> {
        let index = self.checked_index()?;
        self.errors[index] = self.errors[index].saturating_add(1);
        Ok(())
    }

    /// Move to the next sentence and report whether any remain.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::OutOfRange` if already past the last sentence.
    pub fn advance(&mut self) -> Result<bool, SessionError> {
        self.checked_index()?;
        self.current += 1;
        Ok(self.current < self.total_sentences())
    }

    /// Record the start instant. Later calls keep the first value.
    pub fn start_timer(&mut self, now: DateTime<Utc>) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Recompute whole seconds since the start and remember the value.
    ///
    /// After [`stop_timer`](Self::stop_timer) the frozen value is returned as is.
    pub fn elapsed(&mut self, now: DateTime<Utc>) -> u64 {
        if self.timer_stopped {
            return self.elapsed_seconds;
        }
        if let Some(start) = self.started_at {
            self.elapsed_seconds = whole_seconds_between(start, now);
        }
        self.elapsed_seconds
    }

    /// Take a final reading and freeze it.
    pub fn stop_timer(&mut self, now: DateTime<Utc>) -> u64 {
        let final_value = self.elapsed(now);
        self.timer_stopped = true;
        final_value
    }

    /// Pad the counters with zeros up to the sentence count.
    ///
    /// Counters are allocated at full length, so this only guards records
    /// built some other way.
    pub fn fill_gaps(&mut self) {
        let len = self.total_sentences();
        if self.attempts.len() < len {
            self.attempts.resize(len, 0);
        }
        if self.errors.len() < len {
            self.errors.resize(len, 0);
        }
    }

    //
    // ─── TRANSITIONS ───────────────────────────────────────────────────────────
    //

    fn expect_phase(
        &self,
        allowed: &[SessionPhase],
        action: &'static str,
    ) -> Result<(), SessionError> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                phase: self.phase,
                action,
            })
        }
    }

    /// Hide the sentence and accept input.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless studying.
    pub fn begin_writing(&mut self) -> Result<(), SessionError> {
        self.expect_phase(&[SessionPhase::Studying], "begin writing")?;
        self.phase = SessionPhase::Writing;
        Ok(())
    }

    /// Judge a recollection of the active sentence.
    ///
    /// A match advances the run; a miss counts an error and waits for
    /// [`review`](Self::review) or [`retry`](Self::retry).
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless writing.
    pub fn submit(&mut self, recalled: &str) -> Result<Judgement, SessionError> {
        self.expect_phase(&[SessionPhase::Writing], "submit")?;
        let canonical = self.current_sentence()?.to_owned();

        if is_match(recalled, &canonical) {
            let more = self.advance()?;
            self.phase = if more {
                SessionPhase::Studying
            } else {
                SessionPhase::Complete
            };
            return Ok(Judgement::Correct { finished: !more });
        }

        self.record_error()?;
        self.phase = SessionPhase::Incorrect;
        Ok(Judgement::Incorrect(Mismatch {
            similarity: diff::similarity(recalled, &canonical),
            segments: diff::align(recalled, &canonical),
        }))
    }

    /// Show the active sentence again, counting a review.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless writing or after a miss.
    pub fn review(&mut self) -> Result<(), SessionError> {
        self.expect_phase(&[SessionPhase::Writing, SessionPhase::Incorrect], "review")?;
        self.record_review()?;
        self.phase = SessionPhase::Studying;
        Ok(())
    }

    /// Try the same sentence again without looking.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless after a miss.
    pub fn retry(&mut self) -> Result<(), SessionError> {
        self.expect_phase(&[SessionPhase::Incorrect], "retry")?;
        self.phase = SessionPhase::Writing;
        Ok(())
    }

    /// Give up on the run. Abandoned runs never produce a result.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` if the run already ended.
    pub fn abandon(&mut self) -> Result<(), SessionError> {
        if self.phase.is_terminal() {
            return Err(SessionError::InvalidTransition {
                phase: self.phase,
                action: "abandon",
            });
        }
        self.phase = SessionPhase::Abandoned;
        Ok(())
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("paragraph_id", self.paragraph.id())
            .field("phase", &self.phase)
            .field("current", &self.current)
            .field("sentences_len", &self.total_sentences())
            .field("total_attempts", &self.total_attempts)
            .field("elapsed_seconds", &self.elapsed_seconds)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::SegmentKind;
    use crate::model::ParagraphId;
    use crate::time::fixed_now;
    use chrono::Duration;

    fn build_session(text: &str) -> QuizSession {
        let paragraph = Paragraph::new(ParagraphId::new("p-1"), text, fixed_now()).unwrap();
        QuizSession::new(Arc::new(paragraph))
    }

    #[test]
    fn counters_start_zeroed_at_full_length() {
        let session = build_session("Uno. Dos. Tres.");
        assert_eq!(session.attempts(), &[0, 0, 0]);
        assert_eq!(session.errors(), &[0, 0, 0]);
        assert_eq!(session.phase(), SessionPhase::Studying);
        assert_eq!(session.current_sentence_number(), 1);
        assert_eq!(session.total_sentences(), 3);
    }

    #[test]
    fn exact_submission_advances_without_error() {
        let mut session = build_session("El sol brilla. La luna calla.");
        session.begin_writing().unwrap();

        let judgement = session.submit("El sol brilla.").unwrap();

        assert_eq!(judgement, Judgement::Correct { finished: false });
        assert_eq!(session.errors()[0], 0);
        assert_eq!(session.current_index(), 1);
        assert_eq!(session.phase(), SessionPhase::Studying);
    }

    #[test]
    fn wrong_submission_counts_error_and_reports_diff() {
        let mut session = build_session("El sol brilla. La luna calla.");
        session.begin_writing().unwrap();

        let Judgement::Incorrect(mismatch) = session.submit("El sol brila.").unwrap() else {
            panic!("expected a mismatch");
        };

        assert_eq!(session.errors()[0], 1);
        assert_eq!(session.phase(), SessionPhase::Incorrect);
        assert!(mismatch.has_error());
        assert!(mismatch.segments.iter().any(|s| s.kind != SegmentKind::Correct));
        assert!(mismatch.similarity < 100);
    }

    #[test]
    fn review_after_miss_counts_an_attempt() {
        let mut session = build_session("Uno. Dos.");
        session.begin_writing().unwrap();
        session.submit("Nada").unwrap();
        session.review().unwrap();

        assert_eq!(session.phase(), SessionPhase::Studying);
        assert_eq!(session.attempts(), &[1, 0]);
        assert_eq!(session.total_attempts(), 1);
        assert_eq!(session.errors(), &[1, 0]);
    }

    #[test]
    fn retry_returns_to_writing_without_an_attempt() {
        let mut session = build_session("Uno. Dos.");
        session.begin_writing().unwrap();
        session.submit("Nada").unwrap();
        session.retry().unwrap();

        assert_eq!(session.phase(), SessionPhase::Writing);
        assert_eq!(session.total_attempts(), 0);
        assert!(matches!(
            session.submit("Uno").unwrap(),
            Judgement::Correct { finished: false }
        ));
    }

    #[test]
    fn last_correct_submission_completes() {
        let mut session = build_session("Uno.");
        session.begin_writing().unwrap();
        assert_eq!(
            session.submit("Uno.").unwrap(),
            Judgement::Correct { finished: true }
        );
        assert_eq!(session.phase(), SessionPhase::Complete);
        assert!(session.is_complete());
    }

    #[test]
    fn stepping_past_the_end_is_out_of_range() {
        let mut session = build_session("Uno.");
        assert!(!session.advance().unwrap());
        assert_eq!(
            session.current_sentence().unwrap_err(),
            SessionError::OutOfRange { index: 1, len: 1 }
        );
        assert!(matches!(
            session.advance(),
            Err(SessionError::OutOfRange { .. })
        ));
        assert!(session.record_review().is_err());
        assert!(session.record_error().is_err());
    }

    #[test]
    fn invalid_transitions_are_rejected() {
        let mut session = build_session("Uno.");
        assert!(matches!(
            session.submit("Uno."),
            Err(SessionError::InvalidTransition { action: "submit", .. })
        ));
        assert!(session.retry().is_err());
        assert!(session.review().is_err());
    }

    #[test]
    fn abandon_is_terminal() {
        let mut session = build_session("Uno. Dos.");
        session.begin_writing().unwrap();
        session.abandon().unwrap();
        assert_eq!(session.phase(), SessionPhase::Abandoned);
        assert!(session.begin_writing().is_err());
        assert!(session.abandon().is_err());
    }

    #[test]
    fn timer_starts_once_and_freezes_when_stopped() {
        let mut session = build_session("Uno.");
        let start = fixed_now();
        session.start_timer(start);
        session.start_timer(start + Duration::seconds(30));
        assert_eq!(session.elapsed(start + Duration::seconds(5)), 5);

        session.begin_writing().unwrap();
        session.submit("Uno.").unwrap();
        assert_eq!(session.stop_timer(start + Duration::seconds(9)), 9);
        assert_eq!(session.elapsed(start + Duration::seconds(60)), 9);
        assert_eq!(session.elapsed_seconds(), 9);
    }

    #[test]
    fn elapsed_without_start_is_zero() {
        let mut session = build_session("Uno.");
        assert_eq!(session.elapsed(fixed_now()), 0);
    }
}
