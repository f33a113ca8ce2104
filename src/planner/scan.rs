//! Keyword scanning over query text
//!
//! Keywords are ASCII, so scanning runs over an ASCII-lowercased copy of the
//! query whose byte offsets match the original text exactly. Text inside
//! single or double quotes is never matched.

/// Byte range of a matched keyword in the query text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Bytes that continue a word. Non-ASCII bytes count as word bytes.
pub(crate) fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b >= 0x80
}

/// Bytes allowed in a table identifier
pub(crate) fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Finds the first unquoted whole-word occurrence of a keyword at or after
/// `from`.
///
/// `words` is a multi-word keyword (`["group", "by"]`); its words may be
/// separated by any run of whitespace. `lower` must already be lowercased.
pub fn find_keyword(lower: &str, words: &[&str], from: usize) -> Option<Span> {
    let bytes = lower.as_bytes();
    let mut quote: Option<u8> = None;

    for i in 0..bytes.len() {
        let b = bytes[i];
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        if b == b'\'' || b == b'"' {
            quote = Some(b);
            continue;
        }
        if i < from || (i > 0 && is_word_byte(bytes[i - 1])) {
            continue;
        }
        if let Some(end) = match_words(bytes, i, words) {
            return Some(Span { start: i, end });
        }
    }

    None
}

/// Matches `words` starting exactly at `pos`, returning the end offset
fn match_words(bytes: &[u8], mut pos: usize, words: &[&str]) -> Option<usize> {
    for (k, word) in words.iter().enumerate() {
        if k > 0 {
            let gap_start = pos;
            while pos < bytes.len() && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos == gap_start {
                return None;
            }
        }
        if !bytes[pos..].starts_with(word.as_bytes()) {
            return None;
        }
        pos += word.len();
    }

    if pos < bytes.len() && is_word_byte(bytes[pos]) {
        return None;
    }
    Some(pos)
}

/// Splits on commas that are outside parentheses and quotes
pub fn split_top_level(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in text.char_indices() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(text[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(text[start..].trim());

    parts
}
