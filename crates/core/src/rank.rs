//! Grading of completed runs and ordering/retention over stored results.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::model::{ParagraphId, QuizResult, QuizSession, SentenceProgress};

//
// ─── RANK ──────────────────────────────────────────────────────────────────────
//

/// Grade for a completed run, best first.
///
/// `Other` keeps symbols this version does not know, so imported history survives.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Rank {
    S,
    A,
    B,
    C,
    Other(String),
}

impl Rank {
    #[must_use]
    pub fn from_symbol(symbol: &str) -> Self {
        match symbol {
            "S" => Self::S,
            "A" => Self::A,
            "B" => Self::B,
            "C" => Self::C,
            other => Self::Other(other.to_owned()),
        }
    }

    #[must_use]
    pub fn symbol(&self) -> &str {
        match self {
            Self::S => "S",
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::Other(symbol) => symbol,
        }
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl From<String> for Rank {
    fn from(value: String) -> Self {
        Self::from_symbol(&value)
    }
}

impl From<Rank> for String {
    fn from(rank: Rank) -> Self {
        rank.symbol().to_owned()
    }
}

/// Sort key for ranks: S=0, A=1, B=2, C=3, anything else 4.
#[must_use]
pub fn rank_order(rank: &Rank) -> u8 {
    match rank {
        Rank::S => 0,
        Rank::A => 1,
        Rank::B => 2,
        Rank::C => 3,
        Rank::Other(_) => 4,
    }
}

#[must_use]
pub fn rank_description(rank: &Rank) -> &'static str {
    match rank {
        Rank::S => "Perfect! Every sentence right on the first try, without reviewing.",
        Rank::A => "Excellent! You got there in the end, but made a few mistakes.",
        Rank::B => "Good work, but there is room to improve.",
        Rank::C => "You need more practice with this technique.",
        Rank::Other(_) => "Unrecognized rank.",
    }
}

/// Grade a run from its review and error totals. First matching row wins.
#[must_use]
pub fn compute_rank(total_attempts: u32, total_errors: u32) -> (Rank, &'static str) {
    let rank = match (total_attempts, total_errors) {
        (0, 0) => Rank::S,
        (0, _) => Rank::A,
        (1..=3, _) => Rank::B,
        _ => Rank::C,
    };
    let description = rank_description(&rank);
    (rank, description)
}

//
// ─── AGGREGATION ───────────────────────────────────────────────────────────────
//

/// Totals and per-sentence breakdown of a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub rank: Rank,
    pub description: &'static str,
    pub total_attempts: u32,
    pub total_errors: u32,
    pub sentence_progress: Vec<SentenceProgress>,
}

/// Reduce a session's counters into its grade and breakdown.
pub fn aggregate(session: &mut QuizSession) -> SessionOutcome {
    session.fill_gaps();

    let total_attempts = session
        .attempts()
        .iter()
        .fold(0_u32, |sum, n| sum.saturating_add(*n));
    let total_errors = session
        .errors()
        .iter()
        .fold(0_u32, |sum, n| sum.saturating_add(*n));
    let (rank, description) = compute_rank(total_attempts, total_errors);

    let sentence_progress = session
        .paragraph()
        .sentences()
        .iter()
        .zip(session.attempts().iter().zip(session.errors()))
        .map(|(sentence, (&attempts, &errors))| SentenceProgress {
            sentence: sentence.clone(),
            attempts,
            errors,
        })
        .collect();

    SessionOutcome {
        rank,
        description,
        total_attempts,
        total_errors,
        sentence_progress,
    }
}

//
// ─── HISTORY ───────────────────────────────────────────────────────────────────
//

fn newest_first(results: &mut [&QuizResult]) {
    results.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
}

/// Results for one paragraph, newest first, optionally capped.
#[must_use]
pub fn filter_by_paragraph<'a>(
    results: &'a [QuizResult],
    paragraph_id: &ParagraphId,
    limit: Option<usize>,
) -> Vec<&'a QuizResult> {
    let mut matching: Vec<&QuizResult> = results
        .iter()
        .filter(|result| result.paragraph_id() == paragraph_id)
        .collect();
    newest_first(&mut matching);
    if let Some(limit) = limit {
        matching.truncate(limit);
    }
    matching
}

/// Best result for a paragraph: lowest rank order, then most recent.
#[must_use]
pub fn best_for<'a>(
    results: &'a [QuizResult],
    paragraph_id: &ParagraphId,
) -> Option<&'a QuizResult> {
    results
        .iter()
        .filter(|result| result.paragraph_id() == paragraph_id)
        .min_by(|a, b| {
            a.rank_order()
                .cmp(&b.rank_order())
                .then_with(|| b.completed_at().cmp(&a.completed_at()))
        })
}

/// Keep only the newest `max_per_paragraph` results of each paragraph.
///
/// Groups come out in order of first appearance; within a group, newest first.
#[must_use]
pub fn retain(results: Vec<QuizResult>, max_per_paragraph: usize) -> Vec<QuizResult> {
    let mut order: Vec<ParagraphId> = Vec::new();
    let mut groups: HashMap<ParagraphId, Vec<QuizResult>> = HashMap::new();
    for result in results {
        let group = groups.entry(result.paragraph_id().clone()).or_insert_with(|| {
            order.push(result.paragraph_id().clone());
            Vec::new()
        });
        group.push(result);
    }

    let mut kept = Vec::new();
    for paragraph_id in order {
        let Some(mut group) = groups.remove(&paragraph_id) else {
            continue;
        };
        group.sort_by(|a, b| b.completed_at().cmp(&a.completed_at()));
        group.truncate(max_per_paragraph);
        kept.extend(group);
    }
    kept
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
