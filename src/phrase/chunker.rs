//! Candidate phrase extraction
//!
//! The keyword pipeline consumes candidate phrases through the
//! [`CandidateExtractor`] seam and treats the result as an unordered set
//! capped at `top_k`. [`StopwordChunker`] is the built-in extractor:
//! maximal runs of content words between stopwords and punctuation,
//! scored RAKE-style (word degree over word frequency).

use crate::error::Result;
use crate::nlp::stopwords::Stopwords;
use crate::types::Lang;
use async_trait::async_trait;
use regex::Regex;
use rustc_hash::FxHashMap;
use std::sync::{Arc, OnceLock};

/// Default cap on extracted candidates
pub const DEFAULT_TOP_K: usize = 40;

fn boundary_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s\-]+").expect("static regex"))
}

/// Extracts ranked candidate key phrases from a document
#[async_trait]
pub trait CandidateExtractor: Send + Sync {
    /// Return at most `top_k` candidate phrases
    async fn extract(&self, text: &str, lang: Lang, top_k: usize) -> Result<Vec<String>>;
}

/// Configuration for chunk extraction
#[derive(Debug, Clone)]
pub struct ChunkerConfig {
    /// Maximum number of words in a chunk; longer runs are windowed
    pub max_words: usize,
    /// Words shorter than this many characters break a chunk
    pub min_word_chars: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            max_words: 4,
            min_word_chars: 2,
        }
    }
}

/// A chunk of consecutive content words
#[derive(Debug, Clone, PartialEq)]
pub struct Chunk {
    /// Lowercase words in document order
    pub words: Vec<String>,
    /// Index of the chunk among all chunks of the document
    pub position: usize,
}

impl Chunk {
    /// Space-joined text of the chunk
    pub fn text(&self) -> String {
        self.words.join(" ")
    }
}

/// A deduplicated, scored candidate
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub text: String,
    pub score: f64,
    pub count: usize,
    pub first_position: usize,
}

/// Stopword-delimited chunk extractor
#[derive(Debug, Clone)]
pub struct StopwordChunker {
    config: ChunkerConfig,
    stopwords: Arc<Stopwords>,
}

impl Default for StopwordChunker {
    fn default() -> Self {
        Self::new()
    }
}

impl StopwordChunker {
    /// Create a chunker with default config and bundled stopwords
    pub fn new() -> Self {
        Self::with_stopwords(Arc::new(Stopwords::new()))
    }

    /// Create a chunker with custom stopword lists
    pub fn with_stopwords(stopwords: Arc<Stopwords>) -> Self {
        Self {
            config: ChunkerConfig::default(),
            stopwords,
        }
    }

    /// Create a chunker with custom config
    pub fn with_config(mut self, config: ChunkerConfig) -> Self {
        self.config = config;
        self
    }

    /// Set maximum chunk length in words
    pub fn with_max_words(mut self, max_words: usize) -> Self {
        self.config.max_words = max_words.max(1);
        self
    }

    /// Extract chunks in document order
    pub fn extract_chunks(&self, text: &str, lang: Lang) -> Vec<Chunk> {
        let lowered = text.to_lowercase();
        let mut chunks = Vec::new();

        for segment in boundary_re().split(&lowered) {
            let mut run: Vec<String> = Vec::new();
            for raw in segment.split_whitespace() {
                let word = raw.trim_matches('-');
                if self.is_content_word(word, lang) {
                    run.push(word.to_string());
                } else {
                    self.flush_run(&mut run, &mut chunks);
                }
            }
            self.flush_run(&mut run, &mut chunks);
        }

        chunks
    }

    /// Score and rank deduplicated chunks, capped at `top_k`
    pub fn rank(&self, chunks: &[Chunk], top_k: usize) -> Vec<ScoredCandidate> {
        // Word degree and frequency over all chunk occurrences
        let mut freq: FxHashMap<&str, f64> = FxHashMap::default();
        let mut degree: FxHashMap<&str, f64> = FxHashMap::default();
        for chunk in chunks {
            for word in &chunk.words {
                *freq.entry(word.as_str()).or_insert(0.0) += 1.0;
                *degree.entry(word.as_str()).or_insert(0.0) += chunk.words.len() as f64;
            }
        }

        let mut by_text: FxHashMap<String, usize> = FxHashMap::default();
        let mut candidates: Vec<ScoredCandidate> = Vec::new();
        for chunk in chunks {
            let text = chunk.text();
            if let Some(&idx) = by_text.get(&text) {
                candidates[idx].count += 1;
                continue;
            }
            let score = chunk
                .words
                .iter()
                .map(|w| degree[w.as_str()] / freq[w.as_str()])
                .sum();
            by_text.insert(text.clone(), candidates.len());
            candidates.push(ScoredCandidate {
                text,
                score,
                count: 1,
                first_position: chunk.position,
            });
        }

        candidates.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.first_position.cmp(&b.first_position))
        });
        candidates.truncate(top_k);
        candidates
    }

    /// Extract ranked candidate phrases
    pub fn extract_phrases(&self, text: &str, lang: Lang, top_k: usize) -> Vec<String> {
        let chunks = self.extract_chunks(text, lang);
        self.rank(&chunks, top_k)
            .into_iter()
            .map(|c| c.text)
            .collect()
    }

    fn is_content_word(&self, word: &str, lang: Lang) -> bool {
        if word.chars().count() < self.config.min_word_chars {
            return false;
        }
        if word.chars().all(|c| c.is_numeric() || c == '-') {
            return false;
        }
        !self.stopwords.is_stopword(word, lang)
    }

    fn flush_run(&self, run: &mut Vec<String>, chunks: &mut Vec<Chunk>) {
        if run.is_empty() {
            return;
        }
        let max = self.config.max_words.max(1);
        if run.len() <= max {
            let position = chunks.len();
            chunks.push(Chunk {
                words: std::mem::take(run),
                position,
            });
            return;
        }
        for window in run.windows(max) {
            let position = chunks.len();
            chunks.push(Chunk {
                words: window.to_vec(),
                position,
            });
        }
        run.clear();
    }
}

#[async_trait]
impl CandidateExtractor for StopwordChunker {
    async fn extract(&self, text: &str, lang: Lang, top_k: usize) -> Result<Vec<String>> {
        Ok(self.extract_phrases(text, lang, top_k))
    }
}

/// Convenience function
pub fn extract_candidates(text: &str, lang: Lang, top_k: usize) -> Vec<String> {
    StopwordChunker::new().extract_phrases(text, lang, top_k)
}
