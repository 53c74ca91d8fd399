//! Scoring properties on realistic submissions.
#![allow(clippy::unwrap_used, clippy::float_cmp)]

mod common;

use common::{ACCOUNTS_PROGRAM, PROGRAM_A, PROGRAM_B, PROGRAM_C, PYTHON_PROGRAM};
use labsim::similarity::{
    matching_lines, ngram_similarity, normalize, tokenize, Language, SimilarityScorer,
    TokenBundle,
};

fn bundle(source: &str) -> TokenBundle {
    TokenBundle::build(source, &Language::C)
}

#[test]
fn test_identical_submissions_score_100() {
    let scorer = SimilarityScorer::default();
    assert_eq!(scorer.score(&bundle(PROGRAM_A), &bundle(PROGRAM_A)), 100.0);
}

#[test]
fn test_zero_overlap_scores_0() {
    let scorer = SimilarityScorer::default();
    let a = TokenBundle::build("alpha beta gamma delta epsilon", &Language::C);
    let b = TokenBundle::build("one two three four five six", &Language::C);
    assert_eq!(scorer.score(&a, &b), 0.0);
}

#[test]
fn test_scores_are_symmetric() {
    let scorer = SimilarityScorer::default();
    for (x, y) in [
        (PROGRAM_A, PROGRAM_B),
        (PROGRAM_A, PROGRAM_C),
        (PROGRAM_B, PROGRAM_C),
        (PROGRAM_C, ACCOUNTS_PROGRAM),
    ] {
        assert_eq!(
            scorer.score(&bundle(x), &bundle(y)),
            scorer.score(&bundle(y), &bundle(x))
        );
    }
}

#[test]
fn test_fixture_scores() {
    let scorer = SimilarityScorer::default();
    let (a, b, c) = (bundle(PROGRAM_A), bundle(PROGRAM_B), bundle(PROGRAM_C));
    assert_eq!(scorer.score(&a, &b), 72.82);
    assert_eq!(scorer.score(&a, &c), 55.25);
    assert_eq!(scorer.score(&b, &c), 48.68);
}

#[test]
fn test_renaming_one_identifier_keeps_ngrams_high() {
    let renamed = ACCOUNTS_PROGRAM.replace("amount", "value");
    let original = tokenize(&normalize(ACCOUNTS_PROGRAM, &Language::C));
    let changed = tokenize(&normalize(&renamed, &Language::C));

    assert!(ngram_similarity(&original, &changed, 3) > 0.8);
    assert!(ngram_similarity(&original, &changed, 5) > 0.8);
}

#[test]
fn test_comments_and_formatting_do_not_matter() {
    let decorated = PROGRAM_A
        .replace("int total = 0;", "int total = 0;   // running sum")
        .replace("return 0;", "/* done */\n\n        return 0;");
    let scorer = SimilarityScorer::default();
    assert_eq!(scorer.score(&bundle(PROGRAM_A), &bundle(&decorated)), 100.0);
}

#[test]
fn test_string_contents_do_not_matter() {
    let changed = PROGRAM_A.replace("%d %d\\n", "sum=%d max=%d\\n");
    assert_ne!(changed, PROGRAM_A);
    let scorer = SimilarityScorer::default();
    assert_eq!(scorer.score(&bundle(PROGRAM_A), &bundle(&changed)), 100.0);
}

#[test]
fn test_matching_lines_on_fixtures() {
    assert_eq!(matching_lines(PROGRAM_A, PROGRAM_B), 10);
    assert_eq!(matching_lines(PROGRAM_A, PROGRAM_C), 8);
    assert_eq!(matching_lines(PROGRAM_A, PYTHON_PROGRAM), 0);
}

#[test]
fn test_python_docstrings_ignored() {
    let documented = format!("\"\"\"Greeting helpers.\"\"\"\n{PYTHON_PROGRAM}");
    let scorer = SimilarityScorer::default();
    let a = TokenBundle::build(PYTHON_PROGRAM, &Language::Python);
    let b = TokenBundle::build(&documented, &Language::Python);
    assert_eq!(scorer.score(&a, &b), 100.0);
}
