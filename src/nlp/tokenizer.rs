//! Phrase normalization
//!
//! Turns a candidate phrase into its "core": the ordered, deduplicated
//! list of normalized tokens with a parallel list of POS tags. Clustering
//! and tree building only ever look at phrases through this view.
//!
//! Two normalizers are provided:
//! - [`SimpleNormalizer`]: lowercase words minus stopwords, all tagged
//!   [`PosTag::Other`]
//! - [`MorphNormalizer`]: lemmatizes and tags words with a
//!   [`MorphAnalyzer`], degrading to the simple strategy for languages the
//!   analyzer does not cover

use crate::error::Result;
use crate::nlp::stopwords::Stopwords;
use crate::types::{Lang, PosTag};
use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Deserialize;
use std::sync::{Arc, OnceLock};

fn non_word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s\-]").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Lowercase, replace punctuation with spaces, collapse whitespace
///
/// Hyphens survive so compounds like "machine-learning" stay one word.
pub fn normalize_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = non_word_re().replace_all(&lowered, " ");
    whitespace_re().replace_all(&stripped, " ").trim().to_string()
}

/// Ordered, deduplicated core tokens with one POS tag per token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreTokens {
    tokens: Vec<String>,
    pos: Vec<PosTag>,
}

impl CoreTokens {
    /// Create an empty core
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(token, tag)` pairs, keeping the first tag of a repeated token
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, PosTag)>,
        S: Into<String>,
    {
        let mut core = Self::new();
        for (token, pos) in pairs {
            core.push(token, pos);
        }
        core
    }

    /// Append a token unless it is already present
    ///
    /// Returns `true` if the token was added.
    pub fn push(&mut self, token: impl Into<String>, pos: PosTag) -> bool {
        let token = token.into();
        if token.is_empty() || self.contains(&token) {
            return false;
        }
        self.tokens.push(token);
        self.pos.push(pos);
        true
    }

    /// Check if a token is part of the core
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Tag of a token, if present
    pub fn pos_of(&self, token: &str) -> Option<PosTag> {
        self.tokens
            .iter()
            .position(|t| t == token)
            .map(|idx| self.pos[idx])
    }

    /// Tokens in first-appearance order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Tags parallel to [`CoreTokens::tokens`]
    pub fn pos(&self) -> &[PosTag] {
        &self.pos
    }

    /// Iterate over `(token, tag)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&str, PosTag)> + '_ {
        self.tokens
            .iter()
            .map(String::as_str)
            .zip(self.pos.iter().copied())
    }

    /// Set view of the tokens
    pub fn to_set(&self) -> FxHashSet<String> {
        self.tokens.iter().cloned().collect()
    }

    /// Keep at most `n` tokens
    pub fn truncate(&mut self, n: usize) {
        self.tokens.truncate(n);
        self.pos.truncate(n);
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Normalizes a phrase into its core tokens
pub trait PhraseNormalizer: Send + Sync {
    /// Compute the core of `phrase` in language `lang`
    fn core_tokens(&self, phrase: &str, lang: Lang) -> CoreTokens;
}

impl<N: PhraseNormalizer + ?Sized> PhraseNormalizer for Arc<N> {
    fn core_tokens(&self, phrase: &str, lang: Lang) -> CoreTokens {
        (**self).core_tokens(phrase, lang)
    }
}

/// Stopword-filtering normalizer with no morphology
#[derive(Debug, Clone)]
pub struct SimpleNormalizer {
    stopwords: Arc<Stopwords>,
}

impl Default for SimpleNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleNormalizer {
    /// Create a normalizer with the bundled stopword lists
    pub fn new() -> Self {
        Self::with_stopwords(Arc::new(Stopwords::new()))
    }

    /// Create a normalizer with custom stopword lists
    pub fn with_stopwords(stopwords: Arc<Stopwords>) -> Self {
        Self { stopwords }
    }

    /// Stopword lists in use
    pub fn stopwords(&self) -> &Arc<Stopwords> {
        &self.stopwords
    }
}

impl PhraseNormalizer for SimpleNormalizer {
    fn core_tokens(&self, phrase: &str, lang: Lang) -> CoreTokens {
        let mut core = CoreTokens::new();
        for word in normalize_text(phrase).split(' ') {
            if word.is_empty() || self.stopwords.is_stopword(word, lang) {
                continue;
            }
            core.push(word, PosTag::Other);
        }
        core
    }
}

/// Lemma and tag of a single word
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Analysis {
    pub lemma: String,
    #[serde(deserialize_with = "deserialize_tag")]
    pub pos: PosTag,
}

fn deserialize_tag<'de, D>(deserializer: D) -> std::result::Result<PosTag, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let tag = String::deserialize(deserializer)?;
    Ok(PosTag::from_tag(&tag))
}

impl Analysis {
    pub fn new(lemma: impl Into<String>, pos: PosTag) -> Self {
        Self {
            lemma: lemma.into(),
            pos,
        }
    }
}

/// Morphological analyzer for single lowercase words
pub trait MorphAnalyzer: Send + Sync {
    /// Whether the analyzer can handle `lang` at all
    fn supports(&self, lang: Lang) -> bool;

    /// Analyze one word; `None` when the word is unknown
    fn analyze(&self, word: &str, lang: Lang) -> Option<Analysis>;
}

/// Normalizer backed by a [`MorphAnalyzer`]
///
/// Unknown words keep their surface form tagged [`PosTag::Other`].
#[derive(Debug, Clone)]
pub struct MorphNormalizer<A> {
    analyzer: A,
    fallback: SimpleNormalizer,
}

impl<A: MorphAnalyzer> MorphNormalizer<A> {
    /// Wrap an analyzer, using the bundled stopword lists
    pub fn new(analyzer: A) -> Self {
        Self {
            analyzer,
            fallback: SimpleNormalizer::new(),
        }
    }

    /// Wrap an analyzer with custom stopword lists
    pub fn with_stopwords(analyzer: A, stopwords: Arc<Stopwords>) -> Self {
        Self {
            analyzer,
            fallback: SimpleNormalizer::with_stopwords(stopwords),
        }
    }

    pub fn analyzer(&self) -> &A {
        &self.analyzer
    }
}

impl<A: MorphAnalyzer> PhraseNormalizer for MorphNormalizer<A> {
    fn core_tokens(&self, phrase: &str, lang: Lang) -> CoreTokens {
        if !self.analyzer.supports(lang) {
            return self.fallback.core_tokens(phrase, lang);
        }

        let stopwords = self.fallback.stopwords();
        let mut core = CoreTokens::new();
        for word in normalize_text(phrase).split(' ') {
            if word.is_empty() || stopwords.is_stopword(word, lang) {
                continue;
            }
            match self.analyzer.analyze(word, lang) {
                Some(analysis) => {
                    let lemma = analysis.lemma.trim().to_lowercase();
                    core.push(lemma, analysis.pos);
                }
                None => {
                    core.push(word, PosTag::Other);
                }
            }
        }
        core
    }
}

/// Dictionary-backed analyzer
///
/// JSON layout: `{"ru": {"яблони": {"lemma": "яблоня", "pos": "NOUN"}}}`.
#[derive(Debug, Clone, Default)]
pub struct LexiconAnalyzer {
    entries: FxHashMap<Lang, FxHashMap<String, Analysis>>,
}

impl LexiconAnalyzer {
    /// Create an empty lexicon
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a lexicon from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: FxHashMap<String, FxHashMap<String, Analysis>> = serde_json::from_str(json)?;
        let mut lexicon = Self::new();
        for (code, words) in raw {
            let lang: Lang = code.parse()?;
            for (word, analysis) in words {
                lexicon.insert(lang, &word, analysis);
            }
        }
        Ok(lexicon)
    }

    /// Add or replace one entry
    pub fn insert(&mut self, lang: Lang, word: &str, analysis: Analysis) {
        self.entries
            .entry(lang)
            .or_default()
            .insert(word.to_lowercase(), analysis);
    }

    /// Builder-style [`LexiconAnalyzer::insert`]
    pub fn with_entry(mut self, lang: Lang, word: &str, lemma: &str, pos: PosTag) -> Self {
        self.insert(lang, word, Analysis::new(lemma, pos));
        self
    }

    /// Number of entries across languages
    pub fn len(&self) -> usize {
        self.entries.values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MorphAnalyzer for LexiconAnalyzer {
    fn supports(&self, lang: Lang) -> bool {
        self.entries.get(&lang).map_or(false, |words| !words.is_empty())
    }

    fn analyze(&self, word: &str, lang: Lang) -> Option<Analysis> {
        self.entries.get(&lang)?.get(word).cloned()
    }
}
