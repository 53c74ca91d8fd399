//! Token-set and n-gram similarity scoring.
//!
//! The combined score blends a flat token-set Jaccard with 3-gram and 5-gram Jaccard.
//! N-grams keep statement order and bracket shape, so they carry the larger weight and
//! resist identifier renaming better than the flat token overlap.

use compact_str::CompactString;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::constants::{
    JACCARD_WEIGHT, LONG_NGRAM, NGRAM3_WEIGHT, NGRAM5_WEIGHT, NGRAM_SEPARATOR, SHORT_NGRAM,
};
use crate::similarity::language::Language;
use crate::similarity::normalizer::Normalizer;
use crate::similarity::tokenizer::tokenize;

/// Weights of the three similarity signals. They are expected to sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Flat token-set Jaccard.
    pub jaccard: f64,
    /// 3-gram Jaccard.
    pub ngram3: f64,
    /// 5-gram Jaccard.
    pub ngram5: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            jaccard: JACCARD_WEIGHT,
            ngram3: NGRAM3_WEIGHT,
            ngram5: NGRAM5_WEIGHT,
        }
    }
}

/// Precomputed token and n-gram sets of one submission.
///
/// Built once per submission per run and shared read-only by every pair it takes part in.
#[derive(Debug, Clone, Default)]
pub struct TokenBundle {
    /// Distinct tokens.
    pub tokens: FxHashSet<CompactString>,
    /// Distinct 3-token windows.
    pub ngram3: FxHashSet<CompactString>,
    /// Distinct 5-token windows.
    pub ngram5: FxHashSet<CompactString>,
    /// Length of the token sequence the sets were built from.
    pub token_count: usize,
}

impl TokenBundle {
    /// Normalize, tokenize and precompute all sets for `source`.
    #[must_use]
    pub fn build(source: &str, language: &Language) -> Self {
        let normalized = Normalizer::for_language(language).normalize(source);
        Self::from_tokens(&tokenize(&normalized))
    }

    /// Precompute sets from an already tokenized sequence.
    #[must_use]
    pub fn from_tokens(tokens: &[CompactString]) -> Self {
        Self {
            tokens: tokens.iter().cloned().collect(),
            ngram3: ngram_set(tokens, SHORT_NGRAM),
            ngram5: ngram_set(tokens, LONG_NGRAM),
            token_count: tokens.len(),
        }
    }
}

/// Per-signal similarities of one comparison, each in `[0, 1]`, plus the combined score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimilarityBreakdown {
    /// Token-set Jaccard.
    pub jaccard: f64,
    /// 3-gram Jaccard.
    pub ngram3: f64,
    /// 5-gram Jaccard.
    pub ngram5: f64,
    /// Weighted score in `[0, 100]`, rounded to 2 decimals.
    pub score: f64,
}

/// Combines the similarity signals with a set of weights.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer {
    weights: ScoreWeights,
}

impl SimilarityScorer {
    /// Create a scorer with custom weights.
    #[must_use]
    pub const fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    /// Weights in use.
    #[must_use]
    pub const fn weights(&self) -> ScoreWeights {
        self.weights
    }

    /// Full breakdown for two prepared bundles.
    #[must_use]
    pub fn breakdown(&self, a: &TokenBundle, b: &TokenBundle) -> SimilarityBreakdown {
        let jaccard = set_jaccard(&a.tokens, &b.tokens);
        let ngram3 = set_jaccard(&a.ngram3, &b.ngram3);
        let ngram5 = set_jaccard(&a.ngram5, &b.ngram5);
        let weighted = self.weights.jaccard * jaccard
            + self.weights.ngram3 * ngram3
            + self.weights.ngram5 * ngram5;

        SimilarityBreakdown {
            jaccard,
            ngram3,
            ngram5,
            score: round2(weighted * 100.0),
        }
    }

    /// Combined score (0-100, 2 decimals) for two prepared bundles.
    #[must_use]
    pub fn score(&self, a: &TokenBundle, b: &TokenBundle) -> f64 {
        self.breakdown(a, b).score
    }

    /// Combined score for two token sequences.
    #[must_use]
    pub fn score_tokens(&self, a: &[CompactString], b: &[CompactString]) -> f64 {
        self.score(&TokenBundle::from_tokens(a), &TokenBundle::from_tokens(b))
    }
}

/// Jaccard similarity of the distinct tokens of two sequences.
#[must_use]
pub fn jaccard(a: &[CompactString], b: &[CompactString]) -> f64 {
    let set_a: FxHashSet<&CompactString> = a.iter().collect();
    let set_b: FxHashSet<&CompactString> = b.iter().collect();
    set_jaccard(&set_a, &set_b)
}

/// Jaccard similarity of the length-`n` windows of two sequences.
///
/// Zero when either side is shorter than `n`.
#[must_use]
pub fn ngram_similarity(a: &[CompactString], b: &[CompactString], n: usize) -> f64 {
    if n == 0 || a.len() < n || b.len() < n {
        return 0.0;
    }
    set_jaccard(&ngram_set(a, n), &ngram_set(b, n))
}

/// Number of distinct non-blank trimmed lines of `code_a` that also occur in `code_b`.
///
/// Works on raw, non-normalized source. Reported next to the score, never folded into it.
#[must_use]
pub fn matching_lines(code_a: &str, code_b: &str) -> usize {
    let lines_b: FxHashSet<&str> = significant_lines(code_b).collect();
    significant_lines(code_a)
        .collect::<FxHashSet<_>>()
        .into_iter()
        .filter(|line| lines_b.contains(line))
        .count()
}

/// Round to two decimal places.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn significant_lines(code: &str) -> impl Iterator<Item = &str> {
    code.lines().map(str::trim).filter(|line| !line.is_empty())
}

fn ngram_set(tokens: &[CompactString], n: usize) -> FxHashSet<CompactString> {
    if n == 0 || tokens.len() < n {
        return FxHashSet::default();
    }
    tokens
        .windows(n)
        .map(|window| {
            let mut key = CompactString::default();
            for (i, token) in window.iter().enumerate() {
                if i > 0 {
                    key.push(NGRAM_SEPARATOR);
                }
                key.push_str(token);
            }
            key
        })
        .collect()
}

fn set_jaccard<T: Eq + Hash>(a: &FxHashSet<T>, b: &FxHashSet<T>) -> f64 {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|item| large.contains(*item)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return 0.0;
    }
    intersection as f64 / union as f64
}
