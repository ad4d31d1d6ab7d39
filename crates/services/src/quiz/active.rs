use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::watch;

use memo_core::model::{QuizSession, ResultId, SessionPhase};
use memo_core::time::format_elapsed;

use crate::ticker::SessionTicker;

//
// ─── VIEW ──────────────────────────────────────────────────────────────────────
//

/// What a renderer needs to draw the current step of a quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    /// The active sentence, only while it is meant to be visible.
    pub sentence: Option<String>,
    /// 1-based position of the active sentence.
    pub number: usize,
    pub total: usize,
    pub phase: SessionPhase,
    /// Elapsed time as `MM:SS`.
    pub elapsed: String,
}

//
// ─── ACTIVE QUIZ ───────────────────────────────────────────────────────────────
//

/// A running quiz: the session plus the ticker that keeps its clock on screen.
///
/// The ticker is released on every exit path. Finishing or quitting cancels it,
/// and dropping the quiz aborts it.
pub struct ActiveQuiz {
    session: QuizSession,
    ticker: SessionTicker,
    recorded: Option<ResultId>,
}

impl ActiveQuiz {
    pub(crate) fn new(session: QuizSession, ticker: SessionTicker) -> Self {
        Self {
            session,
            ticker,
            recorded: None,
        }
    }

    #[must_use]
    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut QuizSession {
        &mut self.session
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    /// Receiver notified once per tick while the quiz runs.
    #[must_use]
    pub fn ticks(&self) -> watch::Receiver<u64> {
        self.ticker.subscribe()
    }

    #[must_use]
    pub fn is_ticking(&self) -> bool {
        !self.ticker.is_cancelled()
    }

    /// ID of the stored result once the quiz has been completed.
    #[must_use]
    pub fn recorded(&self) -> Option<&ResultId> {
        self.recorded.as_ref()
    }

    pub(crate) fn mark_recorded(&mut self, id: ResultId) {
        self.recorded = Some(id);
    }

    /// Freeze the session clock and stop ticking. Safe to call twice.
    pub(crate) fn stop(&mut self, now: DateTime<Utc>) -> u64 {
        self.ticker.cancel();
        self.session.stop_timer(now)
    }

    pub(crate) fn view(&mut self, now: DateTime<Utc>) -> SessionView {
        let elapsed = self.session.elapsed(now);
        let sentence = match self.session.phase() {
            SessionPhase::Studying => self.session.current_sentence().ok().map(str::to_owned),
            _ => None,
        };
        let total = self.session.total_sentences();

        SessionView {
            sentence,
            number: self.session.current_sentence_number().min(total),
            total,
            phase: self.session.phase(),
            elapsed: format_elapsed(elapsed),
        }
    }
}

impl fmt::Debug for ActiveQuiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActiveQuiz")
            .field("session", &self.session)
            .field("ticker", &self.ticker)
            .field("recorded", &self.recorded)
            .finish()
    }
}
