//! Compound command splitting
//!
//! A single input line may hold several commands joined by the words
//! "and" / "then". Splitting is case-insensitive and word-boundary matched,
//! so words that merely contain a conjunction ("sandwich", "authentic")
//! never split.

/// Word characters for boundary checks.
pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A conjunction starting at byte `i` of `line`, if the position is a word
/// boundary on both sides. Returns the matched length in bytes.
fn conjunction_len(line: &str, i: usize) -> Option<usize> {
    for conj in ["then", "and"] {
        if let Some(candidate) = line.get(i..i + conj.len()) {
            if candidate.eq_ignore_ascii_case(conj) {
                let after_ok = line[i + conj.len()..]
                    .chars()
                    .next()
                    .map_or(true, |c| !is_word_char(c));
                if after_ok {
                    return Some(conj.len());
                }
            }
        }
    }
    None
}

/// Split a raw line into sequential sub-commands.
///
/// Empty fragments are discarded; the returned fragments are trimmed and
/// keep their original left-to-right order.
pub fn split_commands(line: &str) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut start = 0usize;
    let mut i = 0usize;
    let mut prev_is_word = false;

    while i < line.len() {
        let c = match line[i..].chars().next() {
            Some(c) => c,
            None => break,
        };

        if !prev_is_word {
            if let Some(len) = conjunction_len(line, i) {
                parts.push(line[start..i].trim().to_string());
                i += len;
                start = i;
                // The conjunction ends in a word character
                prev_is_word = true;
                continue;
            }
        }

        prev_is_word = is_word_char(c);
        i += c.len_utf8();
    }

    parts.push(line[start..].trim().to_string());
    parts.retain(|p| !p.is_empty());
    parts
}
