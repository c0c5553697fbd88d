//! Normalized word frequencies

use crate::nlp::stopwords::StopwordFilter;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::OnceLock;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").expect("static regex"))
}

/// Lowercase `\w+` words of `text`
pub fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    word_re().find_iter(text).map(|m| m.as_str().to_lowercase())
}

/// Word weights in `(0, 1]`, the most frequent word weighing 1.0
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WordFrequencies {
    weights: FxHashMap<String, f64>,
}

impl WordFrequencies {
    /// Count non-stopword words of `text` and normalize by the maximum count
    pub fn from_text(text: &str, stopwords: &StopwordFilter) -> Self {
        let mut counts: FxHashMap<String, usize> = FxHashMap::default();
        for word in words(text) {
            if stopwords.is_stopword(&word) {
                continue;
            }
            *counts.entry(word).or_insert(0) += 1;
        }

        let max = counts.values().copied().max().unwrap_or(0);
        if max == 0 {
            return Self::default();
        }
        let weights = counts
            .into_iter()
            .map(|(word, count)| (word, count as f64 / max as f64))
            .collect();
        Self { weights }
    }

    /// Weight of a lowercase word, 0.0 if unseen
    pub fn weight(&self, word: &str) -> f64 {
        self.weights.get(word).copied().unwrap_or(0.0)
    }

    /// Number of distinct counted words
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }
}
