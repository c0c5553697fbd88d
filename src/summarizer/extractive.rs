//! Frequency-based extractive summarization
//!
//! Each sentence scores `sum(weight(word)) * position * length_fit`:
//! - `position = (n - i) / n` favors early sentences
//! - `length_fit = clamp(1 - |words - preferred| / 50, 0.7, 1.3)` favors
//!   sentences near the preferred length
//!
//! The top sentences are returned in document order.

use super::frequency::{words, WordFrequencies};
use crate::nlp::sentences::{fix_glued_words, split_sentences, SentenceSplitter, UnicodeSentenceSplitter};
use crate::nlp::stopwords::Stopwords;
use crate::types::Lang;
use rayon::prelude::*;
use std::sync::Arc;

/// Default number of sentences in a summary
pub const DEFAULT_SENTENCE_COUNT: usize = 6;

/// Default preferred sentence length in words
pub const DEFAULT_PREFERRED_LENGTH: usize = 15;

const LENGTH_WINDOW: f64 = 50.0;
const MIN_LENGTH_FIT: f64 = 0.7;
const MAX_LENGTH_FIT: f64 = 1.3;

/// Inputs that produce a fixed message instead of a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degenerate {
    EmptyText,
    NoSentences,
    NoWords,
}

impl Degenerate {
    /// Localized message shown in place of a summary
    pub fn message(self, lang: Lang) -> &'static str {
        match (self, lang) {
            (Degenerate::EmptyText, Lang::Ru) => "Текст пуст.",
            (Degenerate::EmptyText, Lang::En) => "Empty text.",
            (Degenerate::NoSentences, Lang::Ru) => "Не удалось разделить текст на предложения.",
            (Degenerate::NoSentences, Lang::En) => "Could not split the text into sentences.",
            (Degenerate::NoWords, Lang::Ru) => "В тексте не найдено значимых слов.",
            (Degenerate::NoWords, Lang::En) => "No meaningful words found in the text.",
        }
    }
}

/// A sentence with its score and document position
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub text: String,
    pub original_index: usize,
    pub score: f64,
}

/// Configuration for summarization
#[derive(Debug, Clone)]
pub struct SummarizerConfig {
    /// Number of sentences to select
    pub sentence_count: usize,
    /// Sentence length in words that scores the full length fit
    pub preferred_length: usize,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            sentence_count: DEFAULT_SENTENCE_COUNT,
            preferred_length: DEFAULT_PREFERRED_LENGTH,
        }
    }
}

/// Extractive summarizer
#[derive(Clone)]
pub struct ExtractiveSummarizer {
    config: SummarizerConfig,
    stopwords: Arc<Stopwords>,
    splitter: Arc<dyn SentenceSplitter>,
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ExtractiveSummarizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractiveSummarizer")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ExtractiveSummarizer {
    /// Create a summarizer with default config and bundled stopwords
    pub fn new() -> Self {
        Self {
            config: SummarizerConfig::default(),
            stopwords: Arc::new(Stopwords::new()),
            splitter: Arc::new(UnicodeSentenceSplitter),
        }
    }

    /// Create with custom config
    pub fn with_config(mut self, config: SummarizerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set number of sentences to select
    pub fn with_sentence_count(mut self, n: usize) -> Self {
        self.config.sentence_count = n;
        self
    }

    /// Set the preferred sentence length
    pub fn with_preferred_length(mut self, words: usize) -> Self {
        self.config.preferred_length = words;
        self
    }

    pub fn with_stopwords(mut self, stopwords: Arc<Stopwords>) -> Self {
        self.stopwords = stopwords;
        self
    }

    pub fn with_splitter(mut self, splitter: Arc<dyn SentenceSplitter>) -> Self {
        self.splitter = splitter;
        self
    }

    pub fn config(&self) -> &SummarizerConfig {
        &self.config
    }

    /// Summarize with the configured sentence count
    pub fn summarize(&self, text: &str, lang: Lang) -> String {
        self.summarize_n(text, lang, self.config.sentence_count)
    }

    /// Summarize into at most `n` sentences, or a localized message
    pub fn summarize_n(&self, text: &str, lang: Lang, n: usize) -> String {
        match self.select(text, lang, n) {
            Ok(selected) => selected
                .into_iter()
                .map(|s| s.text)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(degenerate) => degenerate.message(lang).to_string(),
        }
    }

    /// Top `n` sentences in document order
    pub fn select(&self, text: &str, lang: Lang, n: usize) -> Result<Vec<ScoredSentence>, Degenerate> {
        if text.trim().is_empty() {
            return Err(Degenerate::EmptyText);
        }

        let fixed = fix_glued_words(text);
        let sentences = split_sentences(self.splitter.as_ref(), &fixed, lang);
        if sentences.is_empty() {
            return Err(Degenerate::NoSentences);
        }

        let freq = WordFrequencies::from_text(&fixed, self.stopwords.get(lang));
        if freq.is_empty() {
            return Err(Degenerate::NoWords);
        }

        let mut scored = self.score_sentences(&sentences, &freq);
        // Stable: equal scores keep document order
        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(n);
        scored.sort_by_key(|s| s.original_index);

        tracing::debug!(
            %lang,
            sentences = sentences.len(),
            selected = scored.len(),
            "extractive summary done"
        );
        Ok(scored)
    }

    /// Score every sentence against the word weights
    pub fn score_sentences(&self, sentences: &[String], freq: &WordFrequencies) -> Vec<ScoredSentence> {
        let total = sentences.len() as f64;
        let preferred = self.config.preferred_length as f64;

        sentences
            .par_iter()
            .enumerate()
            .map(|(idx, sentence)| {
                let sentence_words: Vec<String> = words(sentence).collect();
                let base: f64 = sentence_words.iter().map(|w| freq.weight(w)).sum();
                let position = (total - idx as f64) / total;
                let deviation = (sentence_words.len() as f64 - preferred).abs();
                let length_fit =
                    (1.0 - deviation / LENGTH_WINDOW).clamp(MIN_LENGTH_FIT, MAX_LENGTH_FIT);
                ScoredSentence {
                    text: sentence.clone(),
                    original_index: idx,
                    score: base * position * length_fit,
                }
            })
            .collect()
    }
}

/// Convenience function
pub fn summarize(text: &str, lang: Lang, sentence_count: usize) -> String {
    ExtractiveSummarizer::new().summarize_n(text, lang, sentence_count)
}
