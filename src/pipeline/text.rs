//! Bilingual extractive summary service

use std::sync::Arc;

use tracing::Instrument;

use super::keyword::stage_span;
use super::observer::{
    NoopObserver, PipelineObserver, StageClock, StageReport, StageReportBuilder, STAGE_DETECT,
    STAGE_SUMMARIZE, STAGE_TRANSLATE,
};
use super::offload::BlockingPool;
use crate::error::Error;
use crate::lang::{LanguageDetector, ScriptRatioDetector};
use crate::nlp::sentences::fix_glued_words;
use crate::summarizer::{Degenerate, ExtractiveSummarizer};
use crate::translate::{translate_or_passthrough, Translator};
use crate::types::{Lang, TextSummary};

/// Summarizes a document in both languages
#[derive(Clone)]
pub struct TextSummaryService {
    detector: Arc<dyn LanguageDetector>,
    translator: Arc<dyn Translator>,
    summarizer: Arc<ExtractiveSummarizer>,
    pool: BlockingPool,
}

impl std::fmt::Debug for TextSummaryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextSummaryService")
            .field("summarizer", &self.summarizer)
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl TextSummaryService {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            detector: Arc::new(ScriptRatioDetector::new()),
            translator,
            summarizer: Arc::new(ExtractiveSummarizer::new()),
            pool: BlockingPool::default(),
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_summarizer(mut self, summarizer: ExtractiveSummarizer) -> Self {
        self.summarizer = Arc::new(summarizer);
        self
    }

    pub fn with_pool(mut self, pool: BlockingPool) -> Self {
        self.pool = pool;
        self
    }

    /// Summary pair for `text`
    pub async fn generate(&self, text: &str) -> TextSummary {
        self.generate_with_observer(text, &mut NoopObserver).await
    }

    pub async fn generate_with_observer(
        &self,
        text: &str,
        observer: &mut impl PipelineObserver,
    ) -> TextSummary {
        if text.trim().is_empty() {
            return TextSummary {
                ru: Degenerate::EmptyText.message(Lang::Ru).to_string(),
                en: Degenerate::EmptyText.message(Lang::En).to_string(),
            };
        }
        let fixed = fix_glued_words(text);

        observer.on_stage_start(STAGE_DETECT);
        let clock = StageClock::start();
        let lang = self
            .detector
            .detect(&fixed)
            .instrument(stage_span!(STAGE_DETECT))
            .await;
        observer.on_stage_end(STAGE_DETECT, &StageReport::new(clock.elapsed()));
        observer.on_language(lang);

        observer.on_stage_start(STAGE_TRANSLATE);
        let clock = StageClock::start();
        let target = lang.other();
        let translated = translate_or_passthrough(self.translator.as_ref(), &fixed, lang, target)
            .instrument(stage_span!(STAGE_TRANSLATE))
            .await;
        observer.on_stage_end(STAGE_TRANSLATE, &StageReport::new(clock.elapsed()));

        observer.on_stage_start(STAGE_SUMMARIZE);
        let clock = StageClock::start();
        let (source_summary, target_summary) = tokio::join!(
            self.summarize_offloaded(fixed, lang),
            self.summarize_offloaded(translated, target),
        );
        let degraded = source_summary.is_none() || target_summary.is_none();
        let report = StageReportBuilder::new(clock.elapsed())
            .items(2)
            .degraded(degraded)
            .build();
        observer.on_stage_end(STAGE_SUMMARIZE, &report);

        let source_summary = source_summary.unwrap_or_else(|| fallback_message(lang));
        let target_summary = target_summary.unwrap_or_else(|| fallback_message(target));
        match lang {
            Lang::Ru => TextSummary {
                ru: source_summary,
                en: target_summary,
            },
            Lang::En => TextSummary {
                ru: target_summary,
                en: source_summary,
            },
        }
    }

    async fn summarize_offloaded(&self, text: String, lang: Lang) -> Option<String> {
        let summarizer = Arc::clone(&self.summarizer);
        let job = self
            .pool
            .run(move || summarizer.summarize(&text, lang))
            .instrument(stage_span!(STAGE_SUMMARIZE));
        match job.await {
            Ok(summary) => Some(summary),
            Err(Error::PoolClosed) => {
                tracing::warn!(%lang, "worker pool closed, using fallback summary");
                None
            }
            Err(err) => {
                tracing::warn!(%lang, error = %err, "summary job failed");
                None
            }
        }
    }
}

fn fallback_message(lang: Lang) -> String {
    Degenerate::NoSentences.message(lang).to_string()
}
