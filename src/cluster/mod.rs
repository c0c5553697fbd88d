//! Phrase clustering
//!
//! Candidate phrases are grouped into clusters by greedy agglomerative
//! merging on the Jaccard index of their core tokens. A finalized
//! [`Cluster`] is immutable and only consumed by the forest builder.

pub mod engine;

pub use engine::{cluster_phrases, ClusterEngine, DEFAULT_MERGE_THRESHOLD};

use crate::nlp::tokenizer::CoreTokens;
use rustc_hash::FxHashSet;

/// A finalized phrase cluster
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    name: String,
    core: CoreTokens,
    core_set: FxHashSet<String>,
    phrases: Vec<String>,
    members: Vec<usize>,
    strong: bool,
}

impl Cluster {
    /// Finalize a cluster from its core, member phrases and source indices
    ///
    /// The name is the first noun-tagged core token, else the first core
    /// token, else the shortest member phrase.
    pub fn new(core: CoreTokens, phrases: Vec<String>, members: Vec<usize>) -> Self {
        let strong = core.pos().iter().any(|p| p.is_noun());
        let name = core
            .iter()
            .find(|(_, pos)| pos.is_noun())
            .or_else(|| core.iter().next())
            .map(|(token, _)| token.to_string())
            .or_else(|| shortest(&phrases).map(str::to_string))
            .unwrap_or_default();
        let core_set = core.to_set();

        Self {
            name,
            core,
            core_set,
            phrases,
            members,
            strong,
        }
    }

    /// Representative label
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Ordered core tokens with their tags
    pub fn core(&self) -> &CoreTokens {
        &self.core
    }

    /// Core tokens as a set
    pub fn core_set(&self) -> &FxHashSet<String> {
        &self.core_set
    }

    /// Member phrases in merge order
    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }

    /// Sorted indices of the source phrases
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    /// Whether any core token is noun-tagged
    pub fn is_strong(&self) -> bool {
        self.strong
    }

    /// Number of core tokens
    pub fn core_len(&self) -> usize {
        self.core.len()
    }
}

fn shortest(phrases: &[String]) -> Option<&str> {
    // min_by_key keeps the last minimum, so fold to keep the first
    phrases.iter().fold(None, |best: Option<&str>, p| match best {
        Some(b) if b.chars().count() <= p.chars().count() => Some(b),
        _ => Some(p.as_str()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PosTag;

    #[test]
    fn test_name_prefers_first_noun() {
        let core = CoreTokens::from_pairs([
            ("осенний", PosTag::Other),
            ("сад", PosTag::Noun),
            ("яблоня", PosTag::Noun),
        ]);
        let cluster = Cluster::new(core, vec!["осенний сад яблонь".into()], vec![0]);

        assert_eq!(cluster.name(), "сад");
        assert!(cluster.is_strong());
        assert_eq!(cluster.core_len(), 3);
        assert!(cluster.core_set().contains("яблоня"));
    }

    #[test]
    fn test_name_falls_back_to_first_token() {
        let core = CoreTokens::from_pairs([("deep", PosTag::Other), ("learning", PosTag::Other)]);
        let cluster = Cluster::new(core, vec!["deep learning".into()], vec![3]);

        assert_eq!(cluster.name(), "deep");
        assert!(!cluster.is_strong());
        assert_eq!(cluster.members(), &[3]);
    }

    #[test]
    fn test_name_falls_back_to_shortest_phrase() {
        let cluster = Cluster::new(
            CoreTokens::new(),
            vec!["of the".into(), "the".into(), "and".into()],
            vec![0, 1, 2],
        );
        assert_eq!(cluster.name(), "the");
        assert!(!cluster.is_strong());
    }

    #[test]
    fn test_proper_noun_is_strong() {
        let core = CoreTokens::from_pairs([("москва", PosTag::ProperNoun)]);
        let cluster = Cluster::new(core, vec!["Москва".into()], vec![0]);
        assert!(cluster.is_strong());
        assert_eq!(cluster.name(), "москва");
    }
}
