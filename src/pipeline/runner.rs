//! Document runner: the keyword and text pipelines side by side.
//!
//! [`DocumentSummarizer::summarize`] drives both pipelines concurrently on
//! the current task and joins their results. Dropping the returned future
//! cancels both; each pipeline is also reachable on its own through
//! [`DocumentSummarizer::keywords`] and [`DocumentSummarizer::text`] for
//! callers that want to schedule or cancel them separately.

use std::sync::Arc;

use super::config::SummaryConfig;
use super::keyword::KeywordSummaryAssembler;
use super::observer::{NoopObserver, PipelineObserver};
use super::offload::BlockingPool;
use super::text::TextSummaryService;
use crate::cluster::ClusterEngine;
use crate::error::Result;
use crate::lang::LanguageDetector;
use crate::nlp::stopwords::Stopwords;
use crate::nlp::tokenizer::{PhraseNormalizer, SimpleNormalizer};
use crate::phrase::chunker::StopwordChunker;
use crate::summarizer::ExtractiveSummarizer;
use crate::translate::Translator;
use crate::tree::ForestBuilder;
use crate::types::DocumentSummary;

/// Produces the combined keyword and text summary of a document
#[derive(Debug, Clone)]
pub struct DocumentSummarizer {
    keywords: KeywordSummaryAssembler,
    text: TextSummaryService,
}

impl DocumentSummarizer {
    /// Runner with default settings
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self::build(&SummaryConfig::default(), translator, None)
    }

    /// Runner configured from a validated [`SummaryConfig`]
    pub fn from_config(config: SummaryConfig, translator: Arc<dyn Translator>) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self::build(&config, translator, None))
    }

    /// Runner whose pipelines share a caller-supplied normalizer
    pub fn from_config_with_normalizer(
        config: SummaryConfig,
        translator: Arc<dyn Translator>,
        normalizer: Arc<dyn PhraseNormalizer>,
    ) -> Result<Self> {
        let config = config.validated()?;
        Ok(Self::build(&config, translator, Some(normalizer)))
    }

    fn build(
        config: &SummaryConfig,
        translator: Arc<dyn Translator>,
        normalizer: Option<Arc<dyn PhraseNormalizer>>,
    ) -> Self {
        let stopwords = Arc::new(Stopwords::new());
        let normalizer: Arc<dyn PhraseNormalizer> = match normalizer {
            Some(normalizer) => normalizer,
            None => Arc::new(SimpleNormalizer::with_stopwords(Arc::clone(&stopwords))),
        };
        let pool = BlockingPool::new(config.runtime.max_blocking_jobs);

        let engine = ClusterEngine::new()
            .with_normalizer(Arc::clone(&normalizer))
            .with_stopwords(Arc::clone(&stopwords))
            .with_merge_threshold(config.keywords.merge_threshold);
        let builder = ForestBuilder::new()
            .with_normalizer(normalizer)
            .with_soft_attach_threshold(config.keywords.soft_attach_threshold);
        let keywords = KeywordSummaryAssembler::new(Arc::clone(&translator))
            .with_extractor(Arc::new(StopwordChunker::with_stopwords(Arc::clone(
                &stopwords,
            ))))
            .with_cluster_engine(engine)
            .with_forest_builder(builder)
            .with_top_k(config.keywords.top_k)
            .with_pool(pool.clone());

        let summarizer = ExtractiveSummarizer::new()
            .with_stopwords(stopwords)
            .with_sentence_count(config.summary.sentence_count)
            .with_preferred_length(config.summary.preferred_sentence_length);
        let text = TextSummaryService::new(translator)
            .with_summarizer(summarizer)
            .with_pool(pool);

        Self { keywords, text }
    }

    /// Use `detector` in both pipelines
    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.keywords = self.keywords.with_detector(Arc::clone(&detector));
        self.text = self.text.with_detector(detector);
        self
    }

    pub fn with_keywords(mut self, keywords: KeywordSummaryAssembler) -> Self {
        self.keywords = keywords;
        self
    }

    pub fn with_text(mut self, text: TextSummaryService) -> Self {
        self.text = text;
        self
    }

    pub fn keywords(&self) -> &KeywordSummaryAssembler {
        &self.keywords
    }

    pub fn text(&self) -> &TextSummaryService {
        &self.text
    }

    /// Run both pipelines concurrently and combine their output
    pub async fn summarize(&self, text: &str) -> DocumentSummary {
        self.summarize_with_observers(text, &mut NoopObserver, &mut NoopObserver)
            .await
    }

    /// Same as [`summarize`](Self::summarize) with one observer per pipeline
    pub async fn summarize_with_observers(
        &self,
        text: &str,
        keyword_observer: &mut impl PipelineObserver,
        text_observer: &mut impl PipelineObserver,
    ) -> DocumentSummary {
        let (keywords, summary) = tokio::join!(
            self.keywords.assemble_with_observer(text, keyword_observer),
            self.text.generate_with_observer(text, text_observer),
        );
        tracing::debug!(
            source = %keywords.source_language,
            placeholder = keywords.is_placeholder(),
            "document summary ready"
        );
        DocumentSummary {
            keywords,
            text: summary,
        }
    }
}
