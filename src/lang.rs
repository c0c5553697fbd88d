//! Language detection
//!
//! Detectors answer with one of the supported languages and fall back to
//! [`Lang::En`] whenever the input is empty or ambiguous.

use crate::types::Lang;
use async_trait::async_trait;

/// Share of Cyrillic letters above which text is treated as Russian
pub const CYRILLIC_SHARE_THRESHOLD: f64 = 0.30;

/// Detects the language of a document
#[async_trait]
pub trait LanguageDetector: Send + Sync {
    /// Detect the language of `text`, defaulting to English
    async fn detect(&self, text: &str) -> Lang;
}

/// Script-ratio detector
///
/// Counts Latin and Cyrillic letters and picks Russian when the Cyrillic
/// share exceeds [`CYRILLIC_SHARE_THRESHOLD`].
#[derive(Debug, Clone, Copy)]
pub struct ScriptRatioDetector {
    threshold: f64,
}

impl Default for ScriptRatioDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptRatioDetector {
    pub fn new() -> Self {
        Self {
            threshold: CYRILLIC_SHARE_THRESHOLD,
        }
    }

    /// Set the Cyrillic share threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Synchronous detection
    pub fn detect_sync(&self, text: &str) -> Lang {
        let mut latin = 0usize;
        let mut cyrillic = 0usize;
        for ch in text.chars() {
            if ch.is_ascii_alphabetic() {
                latin += 1;
            } else if is_russian_letter(ch) {
                cyrillic += 1;
            }
        }

        let letters = latin + cyrillic;
        if letters == 0 {
            return Lang::En;
        }
        if cyrillic as f64 / letters as f64 > self.threshold {
            Lang::Ru
        } else {
            Lang::En
        }
    }
}

fn is_russian_letter(ch: char) -> bool {
    matches!(ch, 'А'..='Я' | 'а'..='я' | 'Ё' | 'ё')
}

#[async_trait]
impl LanguageDetector for ScriptRatioDetector {
    async fn detect(&self, text: &str) -> Lang {
        self.detect_sync(text)
    }
}

/// Detector that always answers with the same language
#[derive(Debug, Clone, Copy)]
pub struct FixedLanguage(pub Lang);

#[async_trait]
impl LanguageDetector for FixedLanguage {
    async fn detect(&self, _text: &str) -> Lang {
        self.0
    }
}
