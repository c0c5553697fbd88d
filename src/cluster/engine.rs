//! Greedy agglomerative clustering
//!
//! Each step scans every live pair, takes the first pair with the highest
//! Jaccard index over core sets and merges it, until the best score falls
//! below the merge threshold. Records live in an append-only arena; a merge
//! allocates a new record and retires both parents from the live list.

use super::Cluster;
use crate::metrics::jaccard;
use crate::nlp::stopwords::Stopwords;
use crate::nlp::tokenizer::{normalize_text, CoreTokens, PhraseNormalizer, SimpleNormalizer};
use crate::types::{Lang, PosTag};
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// Default Jaccard threshold for merging two clusters
pub const DEFAULT_MERGE_THRESHOLD: f64 = 0.3;

/// Core size kept when merging clusters with disjoint cores
const DISJOINT_CORE_SIZE: usize = 3;

/// Tokens drawn from member phrases when a cluster ends with an empty core
const BACKFILL_SIZE: usize = 3;

/// Working record in the clustering arena
#[derive(Debug, Clone)]
struct ClusterItem {
    members: Vec<usize>,
    phrases: Vec<String>,
    core: CoreTokens,
    core_set: FxHashSet<String>,
}

impl ClusterItem {
    fn seed(index: usize, phrase: &str, core: CoreTokens) -> Self {
        let core_set = core.to_set();
        Self {
            members: vec![index],
            phrases: vec![phrase.to_string()],
            core,
            core_set,
        }
    }

    fn merge(a: &ClusterItem, b: &ClusterItem) -> Self {
        let mut members: Vec<usize> = a.members.iter().chain(&b.members).copied().collect();
        members.sort_unstable();
        members.dedup();

        let phrases = a.phrases.iter().chain(&b.phrases).cloned().collect();
        let core = merge_core(a, b);
        let core_set = core.to_set();

        Self {
            members,
            phrases,
            core,
            core_set,
        }
    }
}

/// Core of a merged pair
///
/// Intersecting cores keep the shared tokens in first-appearance order over
/// A's tokens then B's. Disjoint cores keep the most frequent tokens of the
/// concatenation, first appearance breaking ties.
fn merge_core(a: &ClusterItem, b: &ClusterItem) -> CoreTokens {
    let lookup = |token: &str| {
        a.core
            .pos_of(token)
            .or_else(|| b.core.pos_of(token))
            .unwrap_or(PosTag::Other)
    };
    let combined = a.core.tokens().iter().chain(b.core.tokens());

    let mut core = CoreTokens::new();
    if a.core_set.iter().any(|t| b.core_set.contains(t)) {
        for token in combined {
            if a.core_set.contains(token) && b.core_set.contains(token) {
                core.push(token.as_str(), lookup(token.as_str()));
            }
        }
        return core;
    }

    let mut counts: FxHashMap<&str, (usize, usize)> = FxHashMap::default();
    for (idx, token) in combined.enumerate() {
        counts.entry(token.as_str()).or_insert((0, idx)).0 += 1;
    }
    let mut ranked: Vec<(&str, usize, usize)> = counts
        .into_iter()
        .map(|(token, (count, first))| (token, count, first))
        .collect();
    ranked.sort_by(|x, y| y.1.cmp(&x.1).then(x.2.cmp(&y.2)));

    for (token, _, _) in ranked.into_iter().take(DISJOINT_CORE_SIZE) {
        core.push(token, lookup(token));
    }
    core
}

/// Greedy phrase clustering engine
pub struct ClusterEngine {
    merge_threshold: f64,
    normalizer: Arc<dyn PhraseNormalizer>,
    stopwords: Arc<Stopwords>,
}

impl Default for ClusterEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClusterEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterEngine")
            .field("merge_threshold", &self.merge_threshold)
            .finish_non_exhaustive()
    }
}

impl ClusterEngine {
    /// Create an engine with the simple normalizer and bundled stopwords
    pub fn new() -> Self {
        let stopwords = Arc::new(Stopwords::new());
        Self {
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            normalizer: Arc::new(SimpleNormalizer::with_stopwords(Arc::clone(&stopwords))),
            stopwords,
        }
    }

    /// Set the phrase normalizer
    pub fn with_normalizer(mut self, normalizer: Arc<dyn PhraseNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Set the stopword lists used for core backfill
    pub fn with_stopwords(mut self, stopwords: Arc<Stopwords>) -> Self {
        self.stopwords = stopwords;
        self
    }

    /// Set the merge threshold
    pub fn with_merge_threshold(mut self, threshold: f64) -> Self {
        self.merge_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn merge_threshold(&self) -> f64 {
        self.merge_threshold
    }

    /// Cluster candidate phrases
    pub fn cluster(&self, phrases: &[String], lang: Lang) -> Vec<Cluster> {
        if phrases.is_empty() {
            return Vec::new();
        }

        let mut arena: Vec<ClusterItem> = phrases
            .iter()
            .enumerate()
            .map(|(idx, phrase)| {
                ClusterItem::seed(idx, phrase, self.normalizer.core_tokens(phrase, lang))
            })
            .collect();
        let mut live: Vec<usize> = (0..arena.len()).collect();
        let mut merges = 0usize;

        while let Some((i, j, score)) = self.best_pair(&arena, &live) {
            if score < self.merge_threshold {
                break;
            }
            let merged = ClusterItem::merge(&arena[live[i]], &arena[live[j]]);
            arena.push(merged);
            // j > i, so removing j first keeps i valid
            live.remove(j);
            live.remove(i);
            live.push(arena.len() - 1);
            merges += 1;
        }

        let clusters: Vec<Cluster> = live
            .into_iter()
            .map(|handle| self.finalize(&arena[handle], lang))
            .collect();

        tracing::debug!(
            phrases = phrases.len(),
            merges,
            clusters = clusters.len(),
            "phrase clustering done"
        );
        clusters
    }

    /// First pair with the strictly highest score, as positions in `live`
    fn best_pair(&self, arena: &[ClusterItem], live: &[usize]) -> Option<(usize, usize, f64)> {
        let mut best: Option<(usize, usize, f64)> = None;
        let mut best_score = -1.0;
        for i in 0..live.len() {
            for j in (i + 1)..live.len() {
                let score = jaccard(&arena[live[i]].core_set, &arena[live[j]].core_set);
                if score > best_score {
                    best_score = score;
                    best = Some((i, j, score));
                }
            }
        }
        best
    }

    fn finalize(&self, item: &ClusterItem, lang: Lang) -> Cluster {
        let mut core = item.core.clone();
        if core.is_empty() {
            'phrases: for phrase in &item.phrases {
                for word in normalize_text(phrase).split(' ') {
                    if core.len() >= BACKFILL_SIZE {
                        break 'phrases;
                    }
                    if !word.is_empty() && !self.stopwords.is_stopword(word, lang) {
                        core.push(word, PosTag::Other);
                    }
                }
            }
        }
        Cluster::new(core, item.phrases.clone(), item.members.clone())
    }
}

/// Convenience function
pub fn cluster_phrases(phrases: &[String], lang: Lang) -> Vec<Cluster> {
    ClusterEngine::new().cluster(phrases, lang)
}
