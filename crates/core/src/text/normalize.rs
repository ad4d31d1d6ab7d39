/// Curly, low-9, prime and angled double quotes.
const DOUBLE_QUOTE_VARIANTS: [char; 8] = [
    '\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{2033}', '\u{2036}', '\u{00AB}', '\u{00BB}',
];

/// Curly, low-9 and prime single quotes.
const SINGLE_QUOTE_VARIANTS: [char; 6] = [
    '\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{2032}', '\u{2035}',
];

const ZERO_WIDTH_SPACE: char = '\u{200B}';

/// Canonicalizes punctuation variants and surrounding whitespace.
///
/// Quote variants map to `"` or `'`, zero-width spaces are dropped and the
/// result is trimmed. Rewriting happens before trimming so the function is
/// idempotent.
#[must_use]
pub fn normalize(text: &str) -> String {
    let rewritten: String = text
        .chars()
        .filter_map(|c| match c {
            ZERO_WIDTH_SPACE => None,
            c if DOUBLE_QUOTE_VARIANTS.contains(&c) => Some('"'),
            c if SINGLE_QUOTE_VARIANTS.contains(&c) => Some('\''),
            c => Some(c),
        })
        .collect();
    rewritten.trim().to_owned()
}
