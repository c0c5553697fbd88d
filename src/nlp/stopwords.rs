//! Russian and English stopword lists
//!
//! The bundled lists come from the `stop-words` crate. Lookups are
//! case-insensitive: every stored word is lowercase and queries are
//! lowercased before the lookup.

use crate::types::Lang;
use rustc_hash::FxHashSet;
use stop_words::{get, LANGUAGE};

/// Lowercase stopword set for a single language
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StopwordFilter {
    words: FxHashSet<String>,
}

impl StopwordFilter {
    /// Bundled list for `lang`
    pub fn new(lang: Lang) -> Self {
        let language = match lang {
            Lang::Ru => LANGUAGE::Russian,
            Lang::En => LANGUAGE::English,
        };
        Self::from_words(get(language))
    }

    /// Filter that matches nothing
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_list(words: &[&str]) -> Self {
        Self::from_words(words)
    }

    fn from_words<I>(words: I) -> Self
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        Self {
            words: words.into_iter().map(|w| w.as_ref().to_lowercase()).collect(),
        }
    }

    /// Extend the list, e.g. with domain words that carry no topic
    pub fn with_extra(mut self, words: &[&str]) -> Self {
        self.words.extend(words.iter().map(|w| w.to_lowercase()));
        self
    }

    pub fn is_stopword(&self, word: &str) -> bool {
        // Common case: callers already pass lowercase words
        self.words.contains(word) || self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Stopword filters for both supported languages
#[derive(Debug, Clone)]
pub struct Stopwords {
    ru: StopwordFilter,
    en: StopwordFilter,
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwords {
    /// Bundled ru and en lists
    pub fn new() -> Self {
        Self {
            ru: StopwordFilter::new(Lang::Ru),
            en: StopwordFilter::new(Lang::En),
        }
    }

    /// No stopwords in either language
    pub fn none() -> Self {
        Self::from_filters(StopwordFilter::empty(), StopwordFilter::empty())
    }

    pub fn from_filters(ru: StopwordFilter, en: StopwordFilter) -> Self {
        Self { ru, en }
    }

    pub fn get(&self, lang: Lang) -> &StopwordFilter {
        match lang {
            Lang::Ru => &self.ru,
            Lang::En => &self.en,
        }
    }

    pub fn is_stopword(&self, word: &str, lang: Lang) -> bool {
        self.get(lang).is_stopword(word)
    }
}
