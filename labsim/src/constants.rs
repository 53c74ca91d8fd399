use rustc_hash::FxHashMap;
use std::sync::OnceLock;

use crate::similarity::Language;

/// Name of the configuration file searched for by [`crate::config::Config::load_from_path`].
pub const CONFIG_FILENAME: &str = "labsim.toml";

/// Environment variable holding the default database path.
pub const DATABASE_ENV: &str = "LABSIM_DB";

/// Environment variable holding the log filter directive.
pub const LOG_ENV: &str = "LABSIM_LOG";

/// Minimum score (0-100) for a pair to be retained when the caller gives no threshold.
pub const DEFAULT_REPORT_THRESHOLD: f64 = 50.0;

/// Score (0-100) at or above which a retained pair is flagged.
///
/// Applied independently of the report threshold.
pub const FLAG_THRESHOLD: f64 = 70.0;

/// Weight of the flat token-set Jaccard similarity.
pub const JACCARD_WEIGHT: f64 = 0.30;

/// Weight of the 3-gram similarity.
pub const NGRAM3_WEIGHT: f64 = 0.40;

/// Weight of the 5-gram similarity.
pub const NGRAM5_WEIGHT: f64 = 0.30;

/// Window length of the short n-gram signal.
pub const SHORT_NGRAM: usize = 3;

/// Window length of the long n-gram signal.
pub const LONG_NGRAM: usize = 5;

/// Characters emitted as standalone tokens by the tokenizer.
pub const STRUCTURAL_CHARS: [char; 9] = ['{', '}', '(', ')', '[', ']', ';', ',', '.'];

/// Replacement for the contents of a double-quoted string literal.
pub const DOUBLE_QUOTED_PLACEHOLDER: &str = "\"str\"";

/// Replacement for the contents of a single-quoted string literal.
pub const SINGLE_QUOTED_PLACEHOLDER: &str = "'str'";

/// Separator used when joining n-gram windows into a single set key.
///
/// Tokens never contain control characters after normalization.
pub const NGRAM_SEPARATOR: char = '\u{1f}';

/// Message returned when a lab has fewer than two distinct authors.
pub const INSUFFICIENT_DATA_MESSAGE: &str = "Not enough submissions to compare";

/// Accepted spellings for each known language tag.
pub fn get_language_aliases() -> &'static FxHashMap<&'static str, Language> {
    static MAP: OnceLock<FxHashMap<&'static str, Language>> = OnceLock::new();
    MAP.get_or_init(|| {
        let mut m = FxHashMap::default();
        m.insert("c", Language::C);
        m.insert("cpp", Language::Cpp);
        m.insert("c++", Language::Cpp);
        m.insert("cxx", Language::Cpp);
        m.insert("java", Language::Java);
        m.insert("javascript", Language::JavaScript);
        m.insert("js", Language::JavaScript);
        m.insert("typescript", Language::TypeScript);
        m.insert("ts", Language::TypeScript);
        m.insert("csharp", Language::CSharp);
        m.insert("c#", Language::CSharp);
        m.insert("go", Language::Go);
        m.insert("rust", Language::Rust);
        m.insert("kotlin", Language::Kotlin);
        m.insert("swift", Language::Swift);
        m.insert("python", Language::Python);
        m.insert("python3", Language::Python);
        m.insert("py", Language::Python);
        m.insert("ruby", Language::Ruby);
        m.insert("rb", Language::Ruby);
        m.insert("shell", Language::Shell);
        m.insert("bash", Language::Shell);
        m.insert("sh", Language::Shell);
        m.insert("r", Language::R);
        m.insert("perl", Language::Perl);
        m
    })
}

pub use get_language_aliases as LANGUAGE_ALIASES;
