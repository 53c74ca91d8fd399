//! Tokenization of normalized source text.

use compact_str::CompactString;

use crate::constants::STRUCTURAL_CHARS;

/// Split normalized text into tokens.
///
/// Whitespace separates tokens, and every structural character (`{ } ( ) [ ] ; , .`) is
/// emitted as a token of its own so bracket and statement shape survive identifier renames.
#[must_use]
pub fn tokenize(normalized: &str) -> Vec<CompactString> {
    let mut tokens = Vec::new();

    for word in normalized.split_whitespace() {
        let mut start = 0;
        for (idx, ch) in word.char_indices() {
            if STRUCTURAL_CHARS.contains(&ch) {
                if idx > start {
                    tokens.push(CompactString::from(&word[start..idx]));
                }
                let end = idx + ch.len_utf8();
                tokens.push(CompactString::from(&word[idx..end]));
                start = end;
            }
        }
        if start < word.len() {
            tokens.push(CompactString::from(&word[start..]));
        }
    }

    tokens
}
