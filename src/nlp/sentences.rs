//! Sentence segmentation
//!
//! The summarizer segments through a [`SentenceSplitter`]. A splitter may
//! report itself unavailable by returning `None`, in which case
//! [`split_sentences`] falls back to [`RegexSentenceSplitter`].

use crate::types::Lang;
use regex::Regex;
use std::sync::OnceLock;
use unicode_segmentation::UnicodeSegmentation;

fn space_before_punct_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+([,.;:!?—–])").expect("static regex"))
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

fn terminal_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]\s+").expect("static regex"))
}

/// Repair spacing left behind by PDF/DOCX text extraction
///
/// Drops whitespace before punctuation, collapses whitespace runs to a
/// single space and trims the ends.
pub fn fix_glued_words(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let tightened = space_before_punct_re().replace_all(text, "$1");
    whitespace_re()
        .replace_all(&tightened, " ")
        .trim()
        .to_string()
}

/// Splits text into sentences
pub trait SentenceSplitter: Send + Sync {
    /// Split `text`; `None` means the splitter cannot handle the input
    fn split(&self, text: &str, lang: Lang) -> Option<Vec<String>>;
}

/// UAX #29 sentence boundaries
///
/// Segments without letters or digits (`"..."`, `"!!!"`) are kept as
/// sentences; only whitespace-only segments are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeSentenceSplitter;

impl SentenceSplitter for UnicodeSentenceSplitter {
    fn split(&self, text: &str, _lang: Lang) -> Option<Vec<String>> {
        Some(
            text.split_sentence_bounds()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }
}

/// Splits on whitespace that follows `.`, `!` or `?`
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSentenceSplitter;

impl RegexSentenceSplitter {
    /// Split without going through the trait
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for m in terminal_re().find_iter(text) {
            // The terminal is a single ASCII byte
            let end = m.start() + 1;
            let piece = text[start..end].trim();
            if !piece.is_empty() {
                sentences.push(piece.to_string());
            }
            start = m.end();
        }
        let tail = text[start..].trim();
        if !tail.is_empty() {
            sentences.push(tail.to_string());
        }
        sentences
    }
}

impl SentenceSplitter for RegexSentenceSplitter {
    fn split(&self, text: &str, _lang: Lang) -> Option<Vec<String>> {
        Some(self.split_text(text))
    }
}

/// Split with `splitter`, falling back to [`RegexSentenceSplitter`]
pub fn split_sentences(splitter: &dyn SentenceSplitter, text: &str, lang: Lang) -> Vec<String> {
    match splitter.split(text, lang) {
        Some(sentences) => sentences,
        None => {
            tracing::warn!(lang = %lang, "sentence splitter unavailable, using regex fallback");
            RegexSentenceSplitter.split_text(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unavailable;

    impl SentenceSplitter for Unavailable {
        fn split(&self, _text: &str, _lang: Lang) -> Option<Vec<String>> {
            None
        }
    }

    #[test]
    fn test_fix_glued_words() {
        assert_eq!(fix_glued_words("Hello ,  world !"), "Hello, world!");
        assert_eq!(fix_glued_words("  Сад  — это\n\nпарк . "), "Сад— это парк.");
        assert_eq!(fix_glued_words(""), "");
    }

    #[test]
    fn test_unicode_splitter() {
        let sentences = UnicodeSentenceSplitter
            .split("First one. Second one! Third?", Lang::En)
            .unwrap();
        assert_eq!(sentences, vec!["First one.", "Second one!", "Third?"]);
    }

    #[test]
    fn test_unicode_splitter_russian() {
        let sentences = UnicodeSentenceSplitter
            .split("Сад цветёт. Яблони растут.", Lang::Ru)
            .unwrap();
        assert_eq!(sentences, vec!["Сад цветёт.", "Яблони растут."]);
    }

    #[test]
    fn test_unicode_splitter_keeps_punctuation_only_segments() {
        let sentences = UnicodeSentenceSplitter.split("... !!!", Lang::En).unwrap();
        assert!(!sentences.is_empty());
        assert!(sentences.iter().all(|s| !s.trim().is_empty()));

        let sentences = UnicodeSentenceSplitter.split("—...?", Lang::Ru).unwrap();
        assert!(!sentences.is_empty());
        assert!(UnicodeSentenceSplitter.split("  \n ", Lang::En).unwrap().is_empty());
    }

    #[test]
    fn test_regex_splitter() {
        let sentences = RegexSentenceSplitter.split_text("A. B!  C? D");
        assert_eq!(sentences, vec!["A.", "B!", "C?", "D"]);
    }

    #[test]
    fn test_regex_splitter_keeps_unterminated_text() {
        assert_eq!(RegexSentenceSplitter.split_text("no terminal here"), vec!["no terminal here"]);
        assert!(RegexSentenceSplitter.split_text("   ").is_empty());
    }

    #[test]
    fn test_fallback_when_unavailable() {
        let sentences = split_sentences(&Unavailable, "One. Two.", Lang::En);
        assert_eq!(sentences, vec!["One.", "Two."]);
    }
}
