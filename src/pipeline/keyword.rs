//! Keyword summary assembler
//!
//! Runs detection, extraction, clustering, tree building and translation
//! for one document and routes the two forests into their language slots.
//! Every failure along the way degrades to the placeholder forest; callers
//! never see an error or an empty forest.

use std::sync::Arc;

use tracing::Instrument;

use super::observer::{
    NoopObserver, PipelineObserver, StageClock, StageReport, StageReportBuilder, STAGE_CLUSTER,
    STAGE_DETECT, STAGE_EXTRACT, STAGE_TRANSLATE, STAGE_TREE,
};
use super::offload::BlockingPool;
use crate::cluster::ClusterEngine;
use crate::lang::{LanguageDetector, ScriptRatioDetector};
use crate::phrase::chunker::{CandidateExtractor, StopwordChunker, DEFAULT_TOP_K};
use crate::translate::{ForestTranslator, Translator};
use crate::tree::ForestBuilder;
use crate::types::{forest_node_count, KeywordTreeSummary};

/// Span for a pipeline stage. Without the `stage-spans` feature this is a
/// disabled span and instrumenting with it costs nothing.
macro_rules! stage_span {
    ($name:expr) => {{
        #[cfg(feature = "stage-spans")]
        let span = tracing::info_span!("pipeline_stage", stage = $name);
        #[cfg(not(feature = "stage-spans"))]
        let span = {
            let _ = $name;
            tracing::Span::none()
        };
        span
    }};
}
pub(crate) use stage_span;

/// Builds bilingual keyword forests
#[derive(Clone)]
pub struct KeywordSummaryAssembler {
    detector: Arc<dyn LanguageDetector>,
    extractor: Arc<dyn CandidateExtractor>,
    engine: Arc<ClusterEngine>,
    builder: Arc<ForestBuilder>,
    translator: ForestTranslator,
    pool: BlockingPool,
    top_k: usize,
}

impl std::fmt::Debug for KeywordSummaryAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeywordSummaryAssembler")
            .field("engine", &self.engine)
            .field("builder", &self.builder)
            .field("pool", &self.pool)
            .field("top_k", &self.top_k)
            .finish_non_exhaustive()
    }
}

impl KeywordSummaryAssembler {
    /// Assembler with the built-in detector, chunker, engine and builder
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self {
            detector: Arc::new(ScriptRatioDetector::new()),
            extractor: Arc::new(StopwordChunker::new()),
            engine: Arc::new(ClusterEngine::new()),
            builder: Arc::new(ForestBuilder::new()),
            translator: ForestTranslator::new(translator),
            pool: BlockingPool::default(),
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_detector(mut self, detector: Arc<dyn LanguageDetector>) -> Self {
        self.detector = detector;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn CandidateExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_cluster_engine(mut self, engine: ClusterEngine) -> Self {
        self.engine = Arc::new(engine);
        self
    }

    pub fn with_forest_builder(mut self, builder: ForestBuilder) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// Share a blocking pool with other pipelines
    pub fn with_pool(mut self, pool: BlockingPool) -> Self {
        self.pool = pool;
        self
    }

    /// Cap on candidate phrases requested from the extractor
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn top_k(&self) -> usize {
        self.top_k
    }

    /// Build the bilingual keyword summary for `text`
    pub async fn assemble(&self, text: &str) -> KeywordTreeSummary {
        self.assemble_with_observer(text, &mut NoopObserver).await
    }

    /// Same as [`assemble`](Self::assemble), reporting each stage to `observer`
    pub async fn assemble_with_observer(
        &self,
        text: &str,
        observer: &mut impl PipelineObserver,
    ) -> KeywordTreeSummary {
        // Detect
        observer.on_stage_start(STAGE_DETECT);
        let clock = StageClock::start();
        let lang = self
            .detector
            .detect(text)
            .instrument(stage_span!(STAGE_DETECT))
            .await;
        observer.on_stage_end(STAGE_DETECT, &StageReport::new(clock.elapsed()));
        observer.on_language(lang);

        // Extract
        observer.on_stage_start(STAGE_EXTRACT);
        let clock = StageClock::start();
        let (phrases, degraded) = if text.trim().is_empty() {
            (Vec::new(), false)
        } else {
            match self
                .extractor
                .extract(text, lang, self.top_k)
                .instrument(stage_span!(STAGE_EXTRACT))
                .await
            {
                Ok(mut phrases) => {
                    phrases.truncate(self.top_k);
                    (phrases, false)
                }
                Err(err) => {
                    tracing::warn!(%lang, error = %err, "candidate extraction failed, treating as empty");
                    (Vec::new(), true)
                }
            }
        };
        let report = StageReportBuilder::new(clock.elapsed())
            .items(phrases.len())
            .degraded(degraded)
            .build();
        observer.on_stage_end(STAGE_EXTRACT, &report);
        observer.on_phrases(&phrases);

        if phrases.is_empty() {
            tracing::debug!(%lang, "no candidate phrases, returning placeholder");
            return KeywordTreeSummary::placeholder(lang);
        }

        // Cluster
        observer.on_stage_start(STAGE_CLUSTER);
        let clock = StageClock::start();
        let engine = Arc::clone(&self.engine);
        let clusters = match self
            .pool
            .run(move || engine.cluster(&phrases, lang))
            .instrument(stage_span!(STAGE_CLUSTER))
            .await
        {
            Ok(clusters) => clusters,
            Err(err) => {
                tracing::warn!(error = %err, "clustering job failed, returning placeholder");
                return KeywordTreeSummary::placeholder(lang);
            }
        };
        let report = StageReportBuilder::new(clock.elapsed())
            .items(clusters.len())
            .build();
        observer.on_stage_end(STAGE_CLUSTER, &report);
        observer.on_clusters(&clusters);

        if clusters.is_empty() {
            return KeywordTreeSummary::placeholder(lang);
        }

        // Tree
        observer.on_stage_start(STAGE_TREE);
        let clock = StageClock::start();
        let builder = Arc::clone(&self.builder);
        let forest = match self
            .pool
            .run(move || builder.build_forest(&clusters, lang))
            .instrument(stage_span!(STAGE_TREE))
            .await
        {
            Ok(forest) => forest,
            Err(err) => {
                tracing::warn!(error = %err, "tree building job failed, returning placeholder");
                return KeywordTreeSummary::placeholder(lang);
            }
        };
        let report = StageReportBuilder::new(clock.elapsed())
            .items(forest_node_count(&forest))
            .build();
        observer.on_stage_end(STAGE_TREE, &report);
        observer.on_forest(&forest);

        if forest.is_empty() {
            return KeywordTreeSummary::placeholder(lang);
        }

        // Translate
        observer.on_stage_start(STAGE_TRANSLATE);
        let clock = StageClock::start();
        let target = lang.other();
        let translated = self
            .translator
            .translate(&forest, lang, target)
            .instrument(stage_span!(STAGE_TRANSLATE))
            .await;
        let report = StageReportBuilder::new(clock.elapsed())
            .items(forest_node_count(&translated))
            .build();
        observer.on_stage_end(STAGE_TRANSLATE, &report);

        tracing::debug!(
            %lang,
            roots = forest.len(),
            nodes = forest_node_count(&forest),
            "keyword summary assembled"
        );
        KeywordTreeSummary::from_source(lang, forest, translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::lang::FixedLanguage;
    use crate::nlp::stopwords::Stopwords;
    use crate::nlp::tokenizer::{LexiconAnalyzer, MorphNormalizer, PhraseNormalizer};
    use crate::pipeline::observer::{StageTimingObserver, KEYWORD_STAGES};
    use crate::translate::IdentityTranslator;
    use crate::types::{forest_shape, Lang, PosTag, NO_KEYWORDS_LABEL};
    use async_trait::async_trait;

    struct Upper;

    #[async_trait]
    impl Translator for Upper {
        async fn translate(&self, text: &str, _src: Lang, _tgt: Lang) -> Result<String> {
            Ok(text.to_uppercase())
        }
    }

    struct FixedPhrases(Vec<&'static str>);

    #[async_trait]
    impl CandidateExtractor for FixedPhrases {
        async fn extract(&self, _text: &str, _lang: Lang, top_k: usize) -> Result<Vec<String>> {
            Ok(self.0.iter().take(top_k).map(|s| s.to_string()).collect())
        }
    }

    struct BrokenExtractor;

    #[async_trait]
    impl CandidateExtractor for BrokenExtractor {
        async fn extract(&self, _text: &str, _lang: Lang, _top_k: usize) -> Result<Vec<String>> {
            Err(Error::Extraction("model not loaded".into()))
        }
    }

    fn make_garden_assembler() -> KeywordSummaryAssembler {
        let lexicon = LexiconAnalyzer::new()
            .with_entry(Lang::Ru, "сад", "сад", PosTag::Noun)
            .with_entry(Lang::Ru, "яблонь", "яблоня", PosTag::Noun)
            .with_entry(Lang::Ru, "яблони", "яблоня", PosTag::Noun)
            .with_entry(Lang::Ru, "осенний", "осенний", PosTag::Other)
            .with_entry(Lang::Ru, "цветут", "цвести", PosTag::Other);
        let stopwords = Arc::new(Stopwords::none());
        let normalizer: Arc<dyn PhraseNormalizer> = Arc::new(MorphNormalizer::with_stopwords(
            lexicon,
            Arc::clone(&stopwords),
        ));

        KeywordSummaryAssembler::new(Arc::new(Upper))
            .with_detector(Arc::new(FixedLanguage(Lang::Ru)))
            .with_extractor(Arc::new(FixedPhrases(vec![
                "осенний сад",
                "сад яблонь",
                "яблони цветут",
            ])))
            .with_cluster_engine(
                ClusterEngine::new()
                    .with_normalizer(Arc::clone(&normalizer))
                    .with_stopwords(stopwords),
            )
            .with_forest_builder(ForestBuilder::new().with_normalizer(normalizer))
    }

    #[cfg(not(feature = "stage-spans"))]
    #[test]
    fn test_stage_span_disabled_without_feature() {
        assert!(stage_span!(STAGE_DETECT).is_disabled());
        assert!(stage_span!(STAGE_TREE).is_disabled());
    }

    #[tokio::test]
    async fn test_russian_source_fills_ru_slot() {
        let summary = make_garden_assembler().assemble("Осенний сад. Сад яблонь.").await;

        assert_eq!(summary.source_language, Lang::Ru);
        assert!(!summary.is_placeholder());
        assert!(summary.ru.len() <= 2);
        assert!(summary.ru.iter().any(|n| n.label == "сад"));
        assert!(summary.en.iter().any(|n| n.label == "САД"));
    }

    #[tokio::test]
    async fn test_forests_are_isomorphic() {
        let summary = make_garden_assembler().assemble("Осенний сад.").await;

        assert_eq!(forest_node_count(&summary.ru), forest_node_count(&summary.en));
        assert_eq!(forest_shape(&summary.ru), forest_shape(&summary.en));
        for (ru, en) in summary.ru.iter().zip(&summary.en) {
            let upper: Vec<String> = ru.labels().iter().map(|l| l.to_uppercase()).collect();
            assert_eq!(en.labels(), upper);
        }
    }

    #[tokio::test]
    async fn test_english_source_fills_en_slot() {
        let assembler = KeywordSummaryAssembler::new(Arc::new(Upper))
            .with_detector(Arc::new(FixedLanguage(Lang::En)));
        let summary = assembler
            .assemble("Apple gardens bloom early. Old apple gardens need careful pruning.")
            .await;

        assert_eq!(summary.source_language, Lang::En);
        assert!(!summary.is_placeholder());
        assert_eq!(summary.target_forest(), summary.ru.as_slice());
        assert_eq!(forest_shape(&summary.en), forest_shape(&summary.ru));
    }

    #[tokio::test]
    async fn test_empty_text_gives_placeholder() {
        let summary = KeywordSummaryAssembler::new(Arc::new(IdentityTranslator))
            .assemble("")
            .await;

        assert!(summary.is_placeholder());
        assert_eq!(summary.source_language, Lang::En);
        assert_eq!(summary.ru.len(), 1);
        assert_eq!(summary.ru[0].label, NO_KEYWORDS_LABEL);
        assert_eq!(summary.en[0].label, NO_KEYWORDS_LABEL);
    }

    #[tokio::test]
    async fn test_extraction_failure_gives_placeholder() {
        let summary = make_garden_assembler()
            .with_extractor(Arc::new(BrokenExtractor))
            .assemble("Осенний сад.")
            .await;
        assert!(summary.is_placeholder());
        assert_eq!(summary.source_language, Lang::Ru);
    }

    #[tokio::test]
    async fn test_closed_pool_gives_placeholder() {
        let pool = BlockingPool::new(1);
        pool.close();
        let summary = make_garden_assembler()
            .with_pool(pool)
            .assemble("Осенний сад.")
            .await;
        assert!(summary.is_placeholder());
    }

    #[tokio::test]
    async fn test_top_k_caps_phrases() {
        let mut observer = StageTimingObserver::new();
        make_garden_assembler()
            .with_top_k(1)
            .assemble_with_observer("Осенний сад.", &mut observer)
            .await;
        assert_eq!(observer.report(STAGE_EXTRACT).unwrap().items, Some(1));
    }

    #[tokio::test]
    async fn test_observer_sees_every_stage() {
        let mut observer = StageTimingObserver::new();
        make_garden_assembler()
            .assemble_with_observer("Осенний сад.", &mut observer)
            .await;

        assert_eq!(observer.stage_names(), KEYWORD_STAGES.to_vec());
        assert_eq!(observer.report(STAGE_EXTRACT).unwrap().items, Some(3));
        assert_eq!(observer.report(STAGE_CLUSTER).unwrap().items, Some(2));
    }

    #[tokio::test]
    async fn test_failed_extraction_is_reported_degraded() {
        let mut observer = StageTimingObserver::new();
        make_garden_assembler()
            .with_extractor(Arc::new(BrokenExtractor))
            .assemble_with_observer("Осенний сад.", &mut observer)
            .await;

        assert_eq!(observer.stage_names(), vec![STAGE_DETECT, STAGE_EXTRACT]);
        assert!(observer.report(STAGE_EXTRACT).unwrap().degraded);
    }
}
