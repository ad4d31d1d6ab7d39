use super::normalize::normalize;

/// Returns true for characters that end a sentence.
#[must_use]
pub fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

fn is_closing_quote(c: char) -> bool {
    matches!(c, '"' | '\'')
}

/// Returns true if `text` ends in a terminator, optionally followed by one closing quote.
#[must_use]
pub fn ends_with_terminal(text: &str) -> bool {
    let mut rev = text.chars().rev();
    match rev.next() {
        Some(c) if is_terminator(c) => true,
        Some(c) if is_closing_quote(c) => rev.next().is_some_and(is_terminator),
        _ => false,
    }
}

/// Splits prose into trimmed sentences, left to right.
///
/// A missing final terminator is supplied as `.`. Blank input yields an empty
/// list, which callers must treat as invalid.
#[must_use]
pub fn segment(text: &str) -> Vec<String> {
    let mut normalized = normalize(text);
    if normalized.is_empty() {
        return Vec::new();
    }
    if !ends_with_terminal(&normalized) {
        normalized.push('.');
    }

    split_at_boundaries(&normalized)
        .into_iter()
        .map(str::trim)
        .filter(|piece| !piece.is_empty() && ends_with_terminal(piece))
        .map(str::to_owned)
        .collect()
}

/// Cuts `text` at zero-width boundaries located after a terminator (plus an
/// optional closing quote) and before whitespace or the end of input.
fn split_at_boundaries(text: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut pieces = Vec::new();
    let mut start = 0;
    let mut idx = 0;

    while idx < chars.len() {
        if !is_terminator(chars[idx].1) {
            idx += 1;
            continue;
        }

        let mut end = idx + 1;
        if chars.get(end).is_some_and(|&(_, c)| is_closing_quote(c)) {
            end += 1;
        }

        match chars.get(end) {
            None => {
                pieces.push(&text[start..]);
                start = text.len();
                idx = end;
            }
            Some(&(byte, next)) if next.is_whitespace() => {
                pieces.push(&text[start..byte]);
                start = byte;
                idx = end;
            }
            Some(_) => idx += 1,
        }
    }

    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_terminal_period_to_last_sentence() {
        assert_eq!(segment("Hola mundo. Adiós"), vec!["Hola mundo.", "Adiós."]);
    }

    #[test]
    fn empty_and_blank_input_yield_nothing() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t").is_empty());
        assert!(segment("\u{200B}").is_empty());
    }

    #[test]
    fn splits_on_all_terminators() {
        assert_eq!(
            segment("¿Vienes? ¡Claro! Vamos ya."),
            vec!["¿Vienes?", "¡Claro!", "Vamos ya."]
        );
    }

    #[test]
    fn terminators_inside_words_do_not_split() {
        assert_eq!(
            segment("Cuesta 3.50 euros. Visita example.com hoy."),
            vec!["Cuesta 3.50 euros.", "Visita example.com hoy."]
        );
    }

    #[test]
    fn closing_quote_stays_with_its_sentence() {
        assert_eq!(
            segment("Dijo \u{201C}basta.\u{201D} Luego se fue."),
            vec!["Dijo \"basta.\"", "Luego se fue."]
        );
    }

    #[test]
    fn quoted_ending_does_not_get_extra_period() {
        assert_eq!(segment("Ella gritó \"¡Fuego!\""), vec!["Ella gritó \"¡Fuego!\""]);
    }

    #[test]
    fn repeated_terminators_and_newlines() {
        assert_eq!(
            segment("Espera...\nNo!! Sí?"),
            vec!["Espera...", "No!!", "Sí?"]
        );
    }

    #[test]
    fn every_sentence_ends_in_a_terminator() {
        for sentence in segment("uno dos. tres\ncuatro! cinco") {
            assert!(ends_with_terminal(&sentence), "{sentence:?}");
        }
    }

    #[test]
    fn ends_with_terminal_handles_quotes() {
        assert!(ends_with_terminal("fin."));
        assert!(ends_with_terminal("fin?'"));
        assert!(!ends_with_terminal("fin\""));
        assert!(!ends_with_terminal(""));
    }
}
