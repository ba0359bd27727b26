//! Label alphabet and reference extraction.
//!
//! Labels use a wide Unicode letter alphabet plus `$`, may carry a
//! subscript (`_x` or `_{…}`), apostrophe variants, and an optional
//! `.<integer>` suffix. Matching is maximal: a label that is a prefix
//! of a longer identifier does not match.

use std::collections::HashSet;

/// Whether `c` can start or continue the letter part of a label.
pub fn is_name_letter(c: char) -> bool {
    matches!(c,
        '$'
        | '\''
        | 'A'..='Z'
        | 'a'..='z'
        | '\u{00A5}'..='\u{00AA}'
        | '\u{00C0}'..='\u{00D6}'
        | '\u{00D8}'..='\u{00F6}'
        | '\u{00F8}'..='\u{01BF}'
        | '\u{01C4}'..='\u{02A8}'
        | '\u{038E}'..='\u{03F5}'
        | '\u{0401}'..='\u{0481}'
        | '\u{0490}'..='\u{04F9}'
        | '\u{0531}'..='\u{167F}'
        | '\u{1681}'..='\u{1FFC}'
        | '\u{3041}'..='\u{3357}'
        | '\u{4E00}'..='\u{D7A3}'
        | '\u{F71D}'..='\u{FA2D}'
        | '\u{FB13}'..='\u{FDFB}'
        | '\u{FE80}'..='\u{FEFC}'
        | '\u{FF66}'..='\u{FF9D}'
        | '\u{FFA1}'..='\u{FFDC}'
    )
}

fn is_apostrophe(c: char) -> bool {
    matches!(c, '\'' | '\u{2018}' | '\u{2019}')
}

/// Characters that would extend an identifier; a candidate followed by
/// one of these is part of a longer name and must not match.
fn is_continuation(c: char) -> bool {
    is_name_letter(c) || c.is_ascii_digit() || is_apostrophe(c) || c == '_'
}

/// Tries the maximal label match starting at `start`. Returns the end
/// index (exclusive) when the matched text is a known label and the
/// following character does not extend it. No shorter-match retry.
pub fn match_label(chars: &[char], start: usize, labels: &HashSet<String>) -> Option<usize> {
    if start >= chars.len() || !is_name_letter(chars[start]) {
        return None;
    }
    let mut i = start;
    while i < chars.len() {
        let c = chars[i];
        if is_name_letter(c) || c.is_ascii_digit() || is_apostrophe(c) {
            i += 1;
            continue;
        }
        if c == '_' {
            if chars.get(i + 1) == Some(&'{') {
                let mut depth = 1usize;
                let mut j = i + 2;
                while j < chars.len() && depth > 0 {
                    match chars[j] {
                        '{' => depth += 1,
                        '}' => depth -= 1,
                        _ => {}
                    }
                    j += 1;
                }
                if depth != 0 {
                    break;
                }
                i = j;
                continue;
            }
            if let Some(sub) = chars.get(i + 1) {
                if is_name_letter(*sub) || sub.is_ascii_digit() {
                    i += 2;
                    continue;
                }
            }
        }
        break;
    }
    // Optional `.<digits>` suffix, dropped again if no digits follow
    // the dot.
    if chars.get(i) == Some(&'.') {
        let mut j = i + 1;
        while j < chars.len() && chars[j].is_ascii_digit() {
            j += 1;
        }
        if j > i + 1 {
            i = j;
        }
    }
    let candidate: String = chars[start..i].iter().collect();
    let extended = chars.get(i).map(|c| is_continuation(*c)).unwrap_or(false);
    if !extended && labels.contains(&candidate) {
        Some(i)
    } else {
        None
    }
}

/// Extracts every known label referenced in `text`, in first-match
/// order without duplicates. Matches only start at word boundaries.
pub fn extract_references(text: &str, labels: &HashSet<String>) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut found: Vec<String> = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let at_boundary = i == 0 || !is_continuation(chars[i - 1]);
        if at_boundary {
            if let Some(end) = match_label(&chars, i, labels) {
                let label: String = chars[i..end].iter().collect();
                if !found.contains(&label) {
                    found.push(label);
                }
                i = end;
                continue;
            }
        }
        i += 1;
    }
    found
}

/// Extracts label references from script source, looking only inside
/// its quoted string literals (single, double, or backtick delimited,
/// with backslash escaping) so language syntax never matches a label.
pub fn extract_references_from_script(text: &str, labels: &HashSet<String>) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut literal = String::new();
    let mut delimiter: Option<char> = None;
    let mut escaped = false;
    for c in text.chars() {
        match delimiter {
            None => {
                if matches!(c, '\'' | '"' | '`') {
                    delimiter = Some(c);
                    literal.clear();
                }
            }
            Some(d) => {
                if escaped {
                    literal.push(c);
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == d {
                    for label in extract_references(&literal, labels) {
                        if !found.contains(&label) {
                            found.push(label);
                        }
                    }
                    delimiter = None;
                } else {
                    literal.push(c);
                }
            }
        }
    }
    found
}
