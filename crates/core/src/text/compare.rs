use super::normalize::normalize;

/// Judges whether a recalled sentence reproduces the canonical one.
///
/// Only the canonical side is normalized; recall is graded on the literal
/// keystrokes. A single missing trailing `.` is tolerated. Case, accents and
/// inner punctuation must match exactly.
#[must_use]
pub fn is_match(recalled: &str, canonical: &str) -> bool {
    let canonical = normalize(canonical);
    if recalled == canonical {
        return true;
    }
    strip_trailing_period(recalled) == strip_trailing_period(&canonical)
}

fn strip_trailing_period(text: &str) -> &str {
    text.strip_suffix('.').unwrap_or(text)
}
