//! Translation
//!
//! Label and document translation goes through the [`Translator`] seam.
//! Language packages are only usable once installed, so readiness is an
//! explicit per-pair capability ([`TranslationReadiness`]) that a
//! [`GatedTranslator`] consults before delegating.

pub mod forest;
pub mod http;

pub use forest::{translate_forest, translate_or_passthrough, ForestTranslator};
pub use http::LibreTranslateClient;

use crate::error::{Error, Result};
use crate::types::Lang;
use async_trait::async_trait;
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Translates plain text between supported languages
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, text: &str, src: Lang, tgt: Lang) -> Result<String>;
}

#[async_trait]
impl<T: Translator + ?Sized> Translator for Arc<T> {
    async fn translate(&self, text: &str, src: Lang, tgt: Lang) -> Result<String> {
        (**self).translate(text, src, tgt).await
    }
}

/// Returns its input unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(&self, text: &str, _src: Lang, _tgt: Lang) -> Result<String> {
        Ok(text.to_string())
    }
}

/// Which language pairs can be translated
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationReadiness {
    ready: FxHashSet<(Lang, Lang)>,
}

impl TranslationReadiness {
    /// No pair is ready
    pub fn new() -> Self {
        Self::default()
    }

    /// Both ru->en and en->ru are ready
    pub fn all_ready() -> Self {
        Self::new()
            .with_ready(Lang::Ru, Lang::En)
            .with_ready(Lang::En, Lang::Ru)
    }

    /// Mark a pair ready
    pub fn mark_ready(&mut self, src: Lang, tgt: Lang) {
        self.ready.insert((src, tgt));
    }

    /// Mark a pair unavailable
    pub fn mark_unavailable(&mut self, src: Lang, tgt: Lang) {
        self.ready.remove(&(src, tgt));
    }

    /// Builder-style [`TranslationReadiness::mark_ready`]
    pub fn with_ready(mut self, src: Lang, tgt: Lang) -> Self {
        self.mark_ready(src, tgt);
        self
    }

    pub fn is_ready(&self, src: Lang, tgt: Lang) -> bool {
        self.ready.contains(&(src, tgt))
    }

    /// Number of ready pairs
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }
}

/// Translator that refuses pairs that are not ready
#[derive(Debug, Clone)]
pub struct GatedTranslator<T> {
    inner: T,
    readiness: TranslationReadiness,
}

impl<T: Translator> GatedTranslator<T> {
    pub fn new(inner: T, readiness: TranslationReadiness) -> Self {
        Self { inner, readiness }
    }

    pub fn readiness(&self) -> &TranslationReadiness {
        &self.readiness
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: Translator> Translator for GatedTranslator<T> {
    async fn translate(&self, text: &str, src: Lang, tgt: Lang) -> Result<String> {
        if src == tgt {
            return Ok(text.to_string());
        }
        if !self.readiness.is_ready(src, tgt) {
            return Err(Error::PairUnavailable { src, tgt });
        }
        self.inner.translate(text, src, tgt).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readiness_per_pair() {
        let mut readiness = TranslationReadiness::new();
        assert!(!readiness.is_ready(Lang::Ru, Lang::En));

        readiness.mark_ready(Lang::Ru, Lang::En);
        assert!(readiness.is_ready(Lang::Ru, Lang::En));
        assert!(!readiness.is_ready(Lang::En, Lang::Ru));

        readiness.mark_unavailable(Lang::Ru, Lang::En);
        assert!(readiness.is_empty());
        assert_eq!(TranslationReadiness::all_ready().len(), 2);
    }

    #[tokio::test]
    async fn test_gated_translator_refuses_unready_pair() {
        let gated = GatedTranslator::new(
            IdentityTranslator,
            TranslationReadiness::new().with_ready(Lang::Ru, Lang::En),
        );

        assert_eq!(gated.translate("сад", Lang::Ru, Lang::En).await.unwrap(), "сад");
        let err = gated.translate("garden", Lang::En, Lang::Ru).await.unwrap_err();
        assert!(matches!(
            err,
            Error::PairUnavailable {
                src: Lang::En,
                tgt: Lang::Ru
            }
        ));
    }

    #[tokio::test]
    async fn test_same_language_is_passthrough() {
        let gated = GatedTranslator::new(IdentityTranslator, TranslationReadiness::new());
        assert_eq!(gated.translate("garden", Lang::En, Lang::En).await.unwrap(), "garden");
    }

    #[tokio::test]
    async fn test_arc_translator() {
        let shared: Arc<dyn Translator> = Arc::new(IdentityTranslator);
        assert_eq!(shared.translate("x", Lang::En, Lang::Ru).await.unwrap(), "x");
    }
}
