//! Text similarity for source submissions.
//!
//! Pipeline per submission: [`Normalizer`] (comments, literals, whitespace) then
//! [`tokenize`] then [`TokenBundle`] (token set plus 3-gram and 5-gram sets).
//! [`SimilarityScorer`] compares two bundles; [`matching_lines`] works on raw source.

mod language;
mod normalizer;
mod scorer;
mod tokenizer;

// Re-exports
pub use language::{CommentSyntax, Language, LanguageFamily};
pub use normalizer::{normalize, Normalizer};
pub use scorer::{
    jaccard, matching_lines, ngram_similarity, round2, ScoreWeights, SimilarityBreakdown,
    SimilarityScorer, TokenBundle,
};
pub use tokenizer::tokenize;
