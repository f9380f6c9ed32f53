//! Small text helpers shared by the extractor and the synthesizer.

/// Split on `.`, `!` or `?` followed by whitespace.
///
/// Terminal punctuation stays with its sentence; pieces are trimmed and
/// empty pieces dropped. Punctuation not followed by whitespace (as in
/// `N.I.K` or `3.5`) does not split.
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut result = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            if let Some(&(_, next)) = chars.peek() {
                if next.is_whitespace() {
                    let end = i + c.len_utf8();
                    push_trimmed(&mut result, &text[start..end]);
                    start = end;
                }
            }
        }
    }
    if start < text.len() {
        push_trimmed(&mut result, &text[start..]);
    }
    result
}

fn push_trimmed<'a>(out: &mut Vec<&'a str>, piece: &'a str) {
    let piece = piece.trim();
    if !piece.is_empty() {
        out.push(piece);
    }
}

/// Collapse every run of whitespace (including newlines) to a single space.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// True if the text ends in `.`, `!` or `?`.
pub fn has_terminal_punctuation(text: &str) -> bool {
    text.ends_with(['.', '!', '?'])
}
