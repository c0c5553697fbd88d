//! Forest builder
//!
//! Attachment runs over an index arena: each cluster is a slot with an
//! append-only child list and at most one parent. Owned [`KeywordNode`]s
//! are only materialized once every pass is done, so no node is ever shared
//! between two parents.

use crate::cluster::Cluster;
use crate::metrics::{is_strict_subset, jaccard};
use crate::nlp::tokenizer::{normalize_text, PhraseNormalizer, SimpleNormalizer};
use crate::types::{KeywordNode, Lang};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Default Jaccard threshold for soft attachment
pub const DEFAULT_SOFT_ATTACH_THRESHOLD: f64 = 0.18;

/// Entry in a slot's child list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Child {
    /// Another cluster slot
    Cluster(usize),
    /// A plain phrase leaf
    Leaf(String),
}

/// Parent/child layout over clusters in evaluation order
#[derive(Debug, Clone, PartialEq)]
pub struct ForestLayout {
    labels: Vec<String>,
    children: Vec<Vec<Child>>,
    parent: Vec<Option<usize>>,
    roots: Vec<usize>,
}

impl ForestLayout {
    fn with_labels(labels: Vec<String>) -> Self {
        let n = labels.len();
        Self {
            labels,
            children: vec![Vec::new(); n],
            parent: vec![None; n],
            roots: Vec::new(),
        }
    }

    /// Number of cluster slots
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label of a slot
    pub fn label(&self, slot: usize) -> &str {
        &self.labels[slot]
    }

    /// Children of a slot in attach order
    pub fn children(&self, slot: usize) -> &[Child] {
        &self.children[slot]
    }

    /// Parent of a slot, if attached
    pub fn parent(&self, slot: usize) -> Option<usize> {
        self.parent[slot]
    }

    /// Root slots in evaluation order
    pub fn roots(&self) -> &[usize] {
        &self.roots
    }

    fn is_attached(&self, slot: usize) -> bool {
        self.parent[slot].is_some()
    }

    fn is_ancestor(&self, candidate: usize, mut slot: usize) -> bool {
        loop {
            if slot == candidate {
                return true;
            }
            match self.parent[slot] {
                Some(up) => slot = up,
                None => return false,
            }
        }
    }

    /// Attach `child` under `parent`; returns `false` if refused
    fn attach(&mut self, parent: usize, child: usize) -> bool {
        if parent == child || self.is_attached(child) || self.is_ancestor(child, parent) {
            return false;
        }
        self.children[parent].push(Child::Cluster(child));
        self.parent[child] = Some(parent);
        true
    }

    fn has_child_label(&self, slot: usize, label: &str) -> bool {
        self.children[slot].iter().any(|child| match child {
            Child::Cluster(idx) => self.labels[*idx] == label,
            Child::Leaf(text) => text == label,
        })
    }

    fn push_leaf(&mut self, slot: usize, label: &str) -> bool {
        if self.has_child_label(slot, label) {
            return false;
        }
        self.children[slot].push(Child::Leaf(label.to_string()));
        true
    }

    /// Materialize owned keyword trees from the roots
    pub fn into_forest(self) -> Vec<KeywordNode> {
        self.roots.iter().map(|&root| self.materialize(root)).collect()
    }

    fn materialize(&self, slot: usize) -> KeywordNode {
        let children = self.children[slot]
            .iter()
            .map(|child| match child {
                Child::Cluster(idx) => self.materialize(*idx),
                Child::Leaf(text) => KeywordNode::leaf(text.as_str()),
            })
            .collect();
        KeywordNode::new(self.labels[slot].as_str(), children)
    }
}

/// Builds keyword forests from finalized clusters
pub struct ForestBuilder {
    soft_attach_threshold: f64,
    normalizer: Arc<dyn PhraseNormalizer>,
}

impl Default for ForestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ForestBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForestBuilder")
            .field("soft_attach_threshold", &self.soft_attach_threshold)
            .finish_non_exhaustive()
    }
}

impl ForestBuilder {
    /// Create a builder with the simple normalizer
    pub fn new() -> Self {
        Self {
            soft_attach_threshold: DEFAULT_SOFT_ATTACH_THRESHOLD,
            normalizer: Arc::new(SimpleNormalizer::new()),
        }
    }

    /// Set the normalizer used to re-tokenize member phrases
    pub fn with_normalizer(mut self, normalizer: Arc<dyn PhraseNormalizer>) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Set the soft attachment threshold
    pub fn with_soft_attach_threshold(mut self, threshold: f64) -> Self {
        self.soft_attach_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    pub fn soft_attach_threshold(&self) -> f64 {
        self.soft_attach_threshold
    }

    /// Build the keyword forest
    pub fn build_forest(&self, clusters: &[Cluster], lang: Lang) -> Vec<KeywordNode> {
        let forest = self.layout(clusters, lang).into_forest();
        tracing::debug!(
            clusters = clusters.len(),
            roots = forest.len(),
            "keyword forest built"
        );
        forest
    }

    /// Compute the parent/child layout without materializing nodes
    pub fn layout(&self, clusters: &[Cluster], lang: Lang) -> ForestLayout {
        let mut sorted: Vec<&Cluster> = clusters.iter().collect();
        sorted.sort_by(|a, b| {
            a.core_len()
                .cmp(&b.core_len())
                .then(b.is_strong().cmp(&a.is_strong()))
                .then(a.name().cmp(b.name()))
        });

        let mut layout =
            ForestLayout::with_labels(sorted.iter().map(|c| c.name().to_string()).collect());
        let n = sorted.len();

        // Pass 1: a smaller core contained in a larger one
        for p in 0..n {
            for c in 0..n {
                if p == c || layout.is_attached(c) {
                    continue;
                }
                let parent = sorted[p];
                if !parent.core_set().is_empty()
                    && is_strict_subset(parent.core_set(), sorted[c].core_set())
                {
                    layout.attach(p, c);
                }
            }
        }

        // Pass 2: single-token strong anchors mentioned in member phrases
        for p in 0..n {
            let parent = sorted[p];
            if layout.is_attached(p) || parent.core_len() != 1 || !parent.is_strong() {
                continue;
            }
            let token = parent.core().tokens()[0].as_str();
            for c in 0..n {
                if p == c || layout.is_attached(c) {
                    continue;
                }
                let mentioned = sorted[c]
                    .phrases()
                    .iter()
                    .any(|phrase| normalize_text(phrase).contains(token));
                if mentioned {
                    layout.attach(p, c);
                }
            }
        }

        // Pass 3: soft similarity from smaller to larger cores
        for p in 0..n {
            for c in 0..n {
                if p == c || layout.is_attached(c) {
                    continue;
                }
                let (parent, child) = (sorted[p], sorted[c]);
                if parent.core_set().is_empty() || child.core_set().is_empty() {
                    continue;
                }
                let score = jaccard(parent.core_set(), child.core_set());
                if score >= self.soft_attach_threshold && parent.core_len() < child.core_len() {
                    layout.attach(p, c);
                }
            }
        }

        let roots: Vec<usize> = (0..n).filter(|&slot| !layout.is_attached(slot)).collect();
        let kept = self.fold_weak_roots(&mut layout, &sorted, &roots);
        layout.roots = if kept.is_empty() { roots } else { kept };

        self.decorate_leaves(&mut layout, &sorted, lang);
        layout
    }

    /// Move each weak root's phrases under its closest strong cluster
    ///
    /// Returns the roots that survive.
    fn fold_weak_roots(
        &self,
        layout: &mut ForestLayout,
        sorted: &[&Cluster],
        roots: &[usize],
    ) -> Vec<usize> {
        let mut kept = Vec::with_capacity(roots.len());
        for &root in roots {
            let weak = sorted[root];
            if weak.is_strong() {
                kept.push(root);
                continue;
            }

            let mut best_score = 0.0;
            let mut best: Option<usize> = None;
            for (slot, candidate) in sorted.iter().enumerate() {
                if slot == root || !candidate.is_strong() {
                    continue;
                }
                let score = jaccard(weak.core_set(), candidate.core_set());
                if score > best_score {
                    best_score = score;
                    best = Some(slot);
                }
            }

            match best {
                Some(target) => {
                    for phrase in weak.phrases() {
                        layout.push_leaf(target, phrase);
                    }
                    tracing::trace!(
                        weak = weak.name(),
                        target = sorted[target].name(),
                        score = best_score,
                        "weak root folded"
                    );
                }
                None => kept.push(root),
            }
        }
        kept
    }

    /// Surface member phrases whose core strictly contains the cluster core
    fn decorate_leaves(&self, layout: &mut ForestLayout, sorted: &[&Cluster], lang: Lang) {
        for (slot, cluster) in sorted.iter().enumerate() {
            if cluster.core_set().is_empty() {
                continue;
            }
            for phrase in cluster.phrases() {
                let phrase_set: FxHashSet<String> =
                    self.normalizer.core_tokens(phrase, lang).to_set();
                if !phrase_set.is_empty() && is_strict_subset(cluster.core_set(), &phrase_set) {
                    layout.push_leaf(slot, phrase);
                }
            }
        }
    }
}

/// Convenience function
pub fn build_forest(clusters: &[Cluster], lang: Lang) -> Vec<KeywordNode> {
    ForestBuilder::new().build_forest(clusters, lang)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::ClusterEngine;
    use crate::nlp::stopwords::Stopwords;
    use crate::nlp::tokenizer::{CoreTokens, LexiconAnalyzer, MorphNormalizer};
    use crate::types::{forest_node_count, PosTag};
    use proptest::prelude::*;

    fn plain_builder() -> ForestBuilder {
        ForestBuilder::new().with_normalizer(Arc::new(SimpleNormalizer::with_stopwords(
            Arc::new(Stopwords::none()),
        )))
    }

    fn make_cluster(tokens: &[(&str, PosTag)], phrases: &[&str]) -> Cluster {
        Cluster::new(
            CoreTokens::from_pairs(tokens.iter().map(|(t, p)| (*t, *p))),
            phrases.iter().map(|s| s.to_string()).collect(),
            Vec::new(),
        )
    }

    fn noun(token: &str) -> (&str, PosTag) {
        (token, PosTag::Noun)
    }

    fn other(token: &str) -> (&str, PosTag) {
        (token, PosTag::Other)
    }

    #[test]
    fn test_empty_clusters() {
        assert!(plain_builder().build_forest(&[], Lang::En).is_empty());
    }

    #[test]
    fn test_subset_attach() {
        let clusters = vec![
            make_cluster(&[noun("garden"), other("old")], &["old garden"]),
            make_cluster(&[noun("garden")], &["garden"]),
        ];
        let forest = plain_builder().build_forest(&clusters, Lang::En);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].label, "garden");
        assert_eq!(forest[0].children.len(), 1);
        assert_eq!(forest[0].children[0].label, "garden");
        // A phrase whose core equals the cluster core is not decorated
        assert!(forest[0].children[0].children.is_empty());
    }

    #[test]
    fn test_single_token_anchor() {
        let clusters = vec![
            make_cluster(&[noun("apple")], &["apple"]),
            make_cluster(&[noun("orchard"), other("pineapples")], &["pineapples orchard"]),
        ];
        let layout = plain_builder().layout(&clusters, Lang::En);

        // "apple" is a substring of "pineapples orchard"
        assert_eq!(layout.roots(), &[0]);
        assert_eq!(layout.children(0), &[Child::Cluster(1)]);
        assert_eq!(layout.parent(1), Some(0));
    }

    #[test]
    fn test_soft_attach_needs_smaller_parent() {
        let clusters = vec![
            make_cluster(&[noun("data"), other("mining")], &["data mining"]),
            make_cluster(
                &[noun("data"), other("science"), other("tools")],
                &["data science tools"],
            ),
        ];
        let layout = plain_builder()
            .with_soft_attach_threshold(0.2)
            .layout(&clusters, Lang::En);

        // Jaccard 1/4; pass 2 does not apply to two-token cores
        assert_eq!(layout.label(0), "data");
        assert_eq!(layout.children(0), &[Child::Cluster(1)]);
        assert_eq!(layout.roots(), &[0]);
    }

    #[test]
    fn test_sort_puts_small_strong_first() {
        let clusters = vec![
            make_cluster(&[other("fast"), other("cars")], &["fast cars"]),
            make_cluster(&[other("blue")], &["blue"]),
            make_cluster(&[noun("sky")], &["sky"]),
        ];
        let layout = plain_builder().layout(&clusters, Lang::En);
        assert_eq!(layout.label(0), "sky");
        assert_eq!(layout.label(1), "blue");
        assert_eq!(layout.label(2), "fast");
    }

    #[test]
    fn test_weak_root_folds_into_strong_cluster() {
        let clusters = vec![
            make_cluster(&[noun("river")], &["river"]),
            make_cluster(&[other("river"), other("wide")], &["wide river bank"]),
        ];
        let builder = plain_builder();
        let forest = builder.build_forest(&clusters, Lang::En);

        // Subset pass attaches the weak cluster; check a detached weak root instead
        assert_eq!(forest.len(), 1);

        let clusters = vec![
            make_cluster(&[noun("river"), other("bank")], &["river bank"]),
            make_cluster(&[other("wide"), other("river"), other("flow")], &["wide river flow"]),
        ];
        let forest = builder
            .with_soft_attach_threshold(0.9)
            .build_forest(&clusters, Lang::En);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].label, "river");
        let labels: Vec<_> = forest[0].children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["wide river flow"]);
    }

    #[test]
    fn test_weak_roots_survive_without_strong_match() {
        let clusters = vec![
            make_cluster(&[other("blue")], &["blue"]),
            make_cluster(&[other("green")], &["green"]),
        ];
        let forest = plain_builder().build_forest(&clusters, Lang::En);
        assert_eq!(forest.len(), 2);
    }

    #[test]
    fn test_leaf_decoration() {
        let clusters = vec![make_cluster(
            &[noun("garden")],
            &["garden", "old garden", "garden"],
        )];
        let forest = plain_builder().build_forest(&clusters, Lang::En);

        assert_eq!(forest.len(), 1);
        let labels: Vec<_> = forest[0].children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["old garden"]);
    }

    #[test]
    fn test_pass_two_mutual_anchors_do_not_cycle() {
        // Each single-token strong cluster mentions the other's token
        let clusters = vec![
            make_cluster(&[noun("cat")], &["cat catalog"]),
            make_cluster(&[noun("catalog")], &["catalog"]),
        ];
        let layout = plain_builder().layout(&clusters, Lang::En);

        assert_eq!(layout.roots(), &[0]);
        assert_eq!(layout.parent(0), None);
        assert_eq!(layout.parent(1), Some(0));

        let forest = layout.into_forest();
        assert_eq!(forest_node_count(&forest), 3);
        let labels: Vec<_> = forest[0].children.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["catalog", "cat catalog"]);
    }

    #[test]
    fn test_russian_garden_forest() {
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
        let phrases: Vec<String> = ["осенний сад", "сад яблонь", "яблони цветут"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let clusters = ClusterEngine::new()
            .with_normalizer(Arc::clone(&normalizer))
            .with_stopwords(stopwords)
            .cluster(&phrases, Lang::Ru);
        let forest = ForestBuilder::new()
            .with_normalizer(normalizer)
            .build_forest(&clusters, Lang::Ru);

        assert!(!forest.is_empty());
        assert!(forest.len() <= 2);
        let sad = forest.iter().find(|n| n.label == "сад").unwrap();
        let labels: Vec<_> = sad.children.iter().map(|c| c.label.as_str()).collect();
        assert!(labels.contains(&"осенний сад"));
        assert!(labels.contains(&"сад яблонь"));
    }

    const VOCAB: &[&str] = &["ab", "bc", "cd", "de", "ef", "abc", "bcd"];

    fn arb_cluster() -> impl Strategy<Value = Cluster> {
        (
            proptest::sample::subsequence(VOCAB, 0..4),
            any::<bool>(),
            proptest::sample::subsequence(VOCAB, 0..3),
        )
            .prop_map(|(core, strong, extra)| {
                let tag = if strong { PosTag::Noun } else { PosTag::Other };
                let pairs: Vec<(&str, PosTag)> = core.iter().map(|t| (*t, tag)).collect();
                let phrase: Vec<&str> = core.iter().chain(extra.iter()).copied().collect();
                make_cluster(&pairs, &[phrase.join(" ").as_str()])
            })
    }

    /// Cluster slots reachable from the roots, failing on revisits
    fn reachable_slots(layout: &ForestLayout) -> Option<Vec<usize>> {
        let mut seen = vec![false; layout.len()];
        let mut stack: Vec<usize> = layout.roots().to_vec();
        let mut order = Vec::new();
        while let Some(slot) = stack.pop() {
            if seen[slot] {
                return None;
            }
            seen[slot] = true;
            order.push(slot);
            for child in layout.children(slot) {
                if let Child::Cluster(idx) = child {
                    stack.push(*idx);
                }
            }
        }
        Some(order)
    }

    proptest! {
        #[test]
        fn prop_forest_has_no_shared_or_cyclic_nodes(
            clusters in proptest::collection::vec(arb_cluster(), 0..8)
        ) {
            let layout = plain_builder().layout(&clusters, Lang::En);
            prop_assert!(reachable_slots(&layout).is_some());

            for slot in 0..layout.len() {
                // Parent chains terminate
                let mut steps = 0;
                let mut cur = slot;
                while let Some(up) = layout.parent(cur) {
                    cur = up;
                    steps += 1;
                    prop_assert!(steps <= layout.len());
                }
            }

            if !clusters.is_empty() {
                prop_assert!(!layout.roots().is_empty());
            }
        }

        #[test]
        fn prop_forest_is_deterministic(
            clusters in proptest::collection::vec(arb_cluster(), 0..8)
        ) {
            let builder = plain_builder();
            let first = builder.build_forest(&clusters, Lang::En);
            let second = builder.build_forest(&clusters, Lang::En);
            prop_assert_eq!(first, second);
        }
    }
}
