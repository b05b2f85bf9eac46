use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref WORD: Regex = Regex::new(r"(?u)[\p{L}\p{N}]+").expect("valid regex");
}

/// The closed set of analyzers a field can be configured with.
///
/// Tokenizing the same input with the same variant always yields the same
/// term sequence, so index-time and query-time tokenization agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Analyzer {
    /// NFKC-normalize, lowercase, emit maximal alphanumeric runs. Pure
    /// punctuation yields no tokens.
    Standard,
    /// Split on Unicode whitespace only; no case folding.
    Whitespace,
    /// The entire input as a single unnormalized term.
    Keyword,
}

impl Analyzer {
    /// Tokenize `text` into (term, token position) pairs.
    pub fn tokenize(&self, text: &str) -> Vec<(String, usize)> {
        match self {
            Analyzer::Standard => {
                let normalized = text.nfkc().collect::<String>().to_lowercase();
                WORD.find_iter(&normalized)
                    .enumerate()
                    .map(|(pos, m)| (m.as_str().to_string(), pos))
                    .collect()
            }
            Analyzer::Whitespace => text
                .split_whitespace()
                .enumerate()
                .map(|(pos, w)| (w.to_string(), pos))
                .collect(),
            Analyzer::Keyword => {
                if text.is_empty() {
                    Vec::new()
                } else {
                    vec![(text.to_string(), 0)]
                }
            }
        }
    }
}
