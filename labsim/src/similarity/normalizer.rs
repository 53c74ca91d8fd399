//! Source normalization for similarity comparison.
//!
//! Removes comments, blanks out string literal contents and collapses whitespace so that
//! formatting, commentary and incidental literal text do not move the score.

use crate::constants::{DOUBLE_QUOTED_PLACEHOLDER, SINGLE_QUOTED_PLACEHOLDER};
use crate::similarity::language::{CommentSyntax, Language};

/// Normalizer bound to one language's comment syntax.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    syntax: CommentSyntax,
}

impl Normalizer {
    /// Create a normalizer for the given language.
    #[must_use]
    pub fn for_language(language: &Language) -> Self {
        Self {
            syntax: language.family().comment_syntax(),
        }
    }

    /// Normalize raw source text.
    ///
    /// Comments and string literals are recognised in a single left-to-right pass, so a
    /// comment opener inside a literal stays literal content and vice versa.
    #[must_use]
    pub fn normalize(&self, source: &str) -> String {
        let stripped = self.strip(source);
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        collapsed.to_lowercase()
    }

    /// Remove comments and replace literal contents, keeping whitespace as-is.
    fn strip(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len());
        let mut i = 0;

        'scan: while i < source.len() {
            let rest = &source[i..];

            for (open, close) in self.syntax.block {
                if let Some(body) = rest.strip_prefix(open) {
                    // Unterminated block comments swallow the remainder.
                    i += open.len() + body.find(close).map_or(body.len(), |end| end + close.len());
                    out.push(' ');
                    continue 'scan;
                }
            }

            for opener in self.syntax.line {
                if rest.starts_with(opener) {
                    i += rest.find('\n').unwrap_or(rest.len());
                    out.push(' ');
                    continue 'scan;
                }
            }

            let Some(ch) = rest.chars().next() else {
                break;
            };

            if ch == '"' || ch == '\'' {
                if let Some(len) = literal_len(rest, ch) {
                    out.push_str(if ch == '"' {
                        DOUBLE_QUOTED_PLACEHOLDER
                    } else {
                        SINGLE_QUOTED_PLACEHOLDER
                    });
                    i += len;
                    continue;
                }
            }

            out.push(ch);
            i += ch.len_utf8();
        }

        out
    }
}

/// Byte length of the quoted literal at the start of `text`, quotes included.
///
/// Returns `None` when the literal is not closed before the end of the line.
fn literal_len(text: &str, quote: char) -> Option<usize> {
    let mut chars = text.char_indices().skip(1);
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '\\' => {
                if let Some((_, '\n')) = chars.next() {
                    return None;
                }
            }
            '\n' => return None,
            c if c == quote => return Some(idx + c.len_utf8()),
            _ => {}
        }
    }
    None
}

/// Normalize `source` using the comment rules of `language`.
#[must_use]
pub fn normalize(source: &str, language: &Language) -> String {
    Normalizer::for_language(language).normalize(source)
}
