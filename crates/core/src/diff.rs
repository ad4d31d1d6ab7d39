//! Character-level edit distance and alignment between a recollection and its source.
//!
//! Both operations fill a `(|a|+1) × (|b|+1)` table stored row-major in a single
//! `Vec` and walk it with plain indices, so cost is bounded by the product of the
//! input lengths and nothing recurses.

use serde::{Deserialize, Serialize};

use crate::text::normalize;

/// Placeholder emitted for characters the user left out. The missing
/// character itself is never revealed.
pub const MISSING_MARKER: char = '?';

//
// ─── SEGMENTS ──────────────────────────────────────────────────────────────────
//

/// Outcome label for a run of characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentKind {
    /// Typed exactly as in the source.
    Correct,
    /// Typed, but wrong or superfluous.
    Error,
    /// Present in the source, absent from the recollection.
    Missing,
}

/// A maximal run of characters sharing one comparison outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffSegment {
    pub text: String,
    pub kind: SegmentKind,
}

impl DiffSegment {
    #[must_use]
    pub fn new(text: impl Into<String>, kind: SegmentKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }
}

/// Returns true if any segment marks an error or an omission.
#[must_use]
pub fn has_error(segments: &[DiffSegment]) -> bool {
    segments
        .iter()
        .any(|segment| segment.kind != SegmentKind::Correct)
}

//
// ─── TABLE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Match,
    Substitute,
    /// Extra character in the user's text.
    Delete,
    /// Character from the source the user never typed.
    Insert,
}

struct Table<T> {
    cols: usize,
    cells: Vec<T>,
}

impl<T: Copy> Table<T> {
    fn new(rows: usize, cols: usize, fill: T) -> Self {
        Self {
            cols,
            cells: vec![fill; rows * cols],
        }
    }

    fn get(&self, i: usize, j: usize) -> T {
        self.cells[i * self.cols + j]
    }

    fn set(&mut self, i: usize, j: usize, value: T) {
        self.cells[i * self.cols + j] = value;
    }
}

/// Fills the cost table and, alongside it, the step that reached each cell.
///
/// Ties between edits resolve substitution, then deletion, then insertion.
fn fill(a: &[char], b: &[char]) -> (Table<usize>, Table<Step>) {
    let rows = a.len() + 1;
    let cols = b.len() + 1;
    let mut cost = Table::new(rows, cols, 0_usize);
    let mut steps = Table::new(rows, cols, Step::Match);

    for i in 1..rows {
        cost.set(i, 0, i);
        steps.set(i, 0, Step::Delete);
    }
    for j in 1..cols {
        cost.set(0, j, j);
        steps.set(0, j, Step::Insert);
    }

    for i in 1..rows {
        for j in 1..cols {
            if a[i - 1] == b[j - 1] {
                cost.set(i, j, cost.get(i - 1, j - 1));
                steps.set(i, j, Step::Match);
                continue;
            }

            let substitute = cost.get(i - 1, j - 1) + 1;
            let delete = cost.get(i - 1, j) + 1;
            let insert = cost.get(i, j - 1) + 1;

            let (best, step) = if substitute <= delete && substitute <= insert {
                (substitute, Step::Substitute)
            } else if delete <= insert {
                (delete, Step::Delete)
            } else {
                (insert, Step::Insert)
            };
            cost.set(i, j, best);
            steps.set(i, j, step);
        }
    }

    (cost, steps)
}

//
// ─── OPERATIONS ────────────────────────────────────────────────────────────────
//

/// Levenshtein distance with unit costs, counted in characters.
#[must_use]
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (cost, _) = fill(&a, &b);
    cost.get(a.len(), b.len())
}

/// Similarity percentage in `0..=100` between two normalized texts.
#[must_use]
pub fn similarity(a: &str, b: &str) -> u8 {
    let a = normalize(a);
    let b = normalize(b);
    if a == b {
        return 100;
    }

    let distance = edit_distance(&a, &b);
    let longest = a.chars().count().max(b.chars().count());
    #[allow(clippy::cast_precision_loss)]
    let ratio = (longest.saturating_sub(distance)) as f64 / longest as f64;
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let percent = (ratio * 100.0).round().clamp(0.0, 100.0) as u8;
    percent
}

/// Aligns the user's text against the correct text and labels every position.
///
/// Segments come out left to right with adjacent runs of the same kind merged.
/// Identical inputs produce one `Correct` segment; two empty inputs produce none.
#[must_use]
pub fn align(user_text: &str, correct_text: &str) -> Vec<DiffSegment> {
    let user = normalize(user_text);
    let correct = normalize(correct_text);
    if user == correct {
        if user.is_empty() {
            return Vec::new();
        }
        return vec![DiffSegment::new(user, SegmentKind::Correct)];
    }

    let u: Vec<char> = user.chars().collect();
    let c: Vec<char> = correct.chars().collect();
    let (_, steps) = fill(&u, &c);

    let mut labeled = Vec::with_capacity(u.len().max(c.len()));
    let (mut i, mut j) = (u.len(), c.len());
    while i > 0 || j > 0 {
        match steps.get(i, j) {
            Step::Match => {
                labeled.push((u[i - 1], SegmentKind::Correct));
                i -= 1;
                j -= 1;
            }
            Step::Substitute => {
                labeled.push((u[i - 1], SegmentKind::Error));
                i -= 1;
                j -= 1;
            }
            Step::Delete => {
                labeled.push((u[i - 1], SegmentKind::Error));
                i -= 1;
            }
            Step::Insert => {
                labeled.push((MISSING_MARKER, SegmentKind::Missing));
                j -= 1;
            }
        }
    }

    merge(labeled.into_iter().rev())
}

fn merge(labeled: impl Iterator<Item = (char, SegmentKind)>) -> Vec<DiffSegment> {
    let mut segments: Vec<DiffSegment> = Vec::new();
    for (ch, kind) in labeled {
        match segments.last_mut() {
            Some(last) if last.kind == kind => last.text.push(ch),
            _ => segments.push(DiffSegment::new(ch.to_string(), kind)),
        }
    }
    segments
}
