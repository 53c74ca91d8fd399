//! Source languages and their comment delimiter rules.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::LANGUAGE_ALIASES;

/// Comment delimiters for one language family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentSyntax {
    /// Openers of comments that run to the end of the line.
    pub line: &'static [&'static str],
    /// `(open, close)` pairs of block comments.
    pub block: &'static [(&'static str, &'static str)],
}

/// Groups of languages sharing one comment syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// `//` and `/* */`.
    CFamily,
    /// `#` plus triple-quoted blocks.
    Python,
    /// `#` only.
    HashComment,
}

impl LanguageFamily {
    /// Delimiter table for this family.
    #[must_use]
    pub const fn comment_syntax(self) -> CommentSyntax {
        match self {
            Self::CFamily => CommentSyntax {
                line: &["//"],
                block: &[("/*", "*/")],
            },
            Self::Python => CommentSyntax {
                line: &["#"],
                block: &[("'''", "'''"), ("\"\"\"", "\"\"\"")],
            },
            Self::HashComment => CommentSyntax {
                line: &["#"],
                block: &[],
            },
        }
    }
}

/// Language tag of a submission.
///
/// Unknown tags are kept verbatim in [`Language::Other`] so that two submissions in the
/// same unknown language still pair up, while two different unknown languages never do.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "CompactString", into = "CompactString")]
pub enum Language {
    /// C
    C,
    /// C++
    Cpp,
    /// Java
    Java,
    /// JavaScript
    JavaScript,
    /// TypeScript
    TypeScript,
    /// C#
    CSharp,
    /// Go
    Go,
    /// Rust
    Rust,
    /// Kotlin
    Kotlin,
    /// Swift
    Swift,
    /// Python
    Python,
    /// Ruby
    Ruby,
    /// POSIX shell / bash
    Shell,
    /// R
    R,
    /// Perl
    Perl,
    /// Any other tag, lowercased.
    Other(CompactString),
}

impl Language {
    /// Parse a language tag. Matching is case-insensitive and never fails.
    #[must_use]
    pub fn parse(tag: &str) -> Self {
        let lowered = tag.trim().to_lowercase();
        LANGUAGE_ALIASES()
            .get(lowered.as_str())
            .cloned()
            .unwrap_or_else(|| Self::Other(CompactString::from(lowered)))
    }

    /// Canonical tag.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::C => "c",
            Self::Cpp => "cpp",
            Self::Java => "java",
            Self::JavaScript => "javascript",
            Self::TypeScript => "typescript",
            Self::CSharp => "csharp",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Kotlin => "kotlin",
            Self::Swift => "swift",
            Self::Python => "python",
            Self::Ruby => "ruby",
            Self::Shell => "shell",
            Self::R => "r",
            Self::Perl => "perl",
            Self::Other(tag) => tag.as_str(),
        }
    }

    /// Comment family. Unknown languages use the C family.
    #[must_use]
    pub fn family(&self) -> LanguageFamily {
        match self {
            Self::Python => LanguageFamily::Python,
            Self::Ruby | Self::Shell | Self::R | Self::Perl => LanguageFamily::HashComment,
            Self::C
            | Self::Cpp
            | Self::Java
            | Self::JavaScript
            | Self::TypeScript
            | Self::CSharp
            | Self::Go
            | Self::Rust
            | Self::Kotlin
            | Self::Swift
            | Self::Other(_) => LanguageFamily::CFamily,
        }
    }
}

impl From<CompactString> for Language {
    fn from(tag: CompactString) -> Self {
        Self::parse(&tag)
    }
}

impl From<&str> for Language {
    fn from(tag: &str) -> Self {
        Self::parse(tag)
    }
}

impl From<Language> for CompactString {
    fn from(language: Language) -> Self {
        match language {
            Language::Other(tag) => tag,
            known => CompactString::from(known.as_str()),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_resolve_to_same_language() {
        assert_eq!(Language::parse("C++"), Language::Cpp);
        assert_eq!(Language::parse("cpp"), Language::Cpp);
        assert_eq!(Language::parse(" Python3 "), Language::Python);
    }

    #[test]
    fn test_unknown_language_keeps_tag_and_uses_c_family() {
        let lang = Language::parse("Pascal");
        assert_eq!(lang, Language::Other("pascal".into()));
        assert_eq!(lang.family(), LanguageFamily::CFamily);
        assert_ne!(lang, Language::parse("fortran"));
    }

    #[test]
    fn test_serde_uses_plain_tag() {
        let json = serde_json::to_string(&Language::Cpp).unwrap();
        assert_eq!(json, "\"cpp\"");
        let back: Language = serde_json::from_str("\"PY\"").unwrap();
        assert_eq!(back, Language::Python);
    }
}
