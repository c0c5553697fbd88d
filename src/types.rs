//! Core types shared across the keyword and summary pipelines
//!
//! Languages, part-of-speech tags, keyword forests and the bilingual
//! summary records handed to downstream consumers.

use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed label of the placeholder node returned when no keywords were found
pub const NO_KEYWORDS_LABEL: &str = "No keywords found";

/// Supported document languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Ru,
    En,
}

impl Lang {
    /// ISO 639-1 code
    pub fn code(self) -> &'static str {
        match self {
            Lang::Ru => "ru",
            Lang::En => "en",
        }
    }

    /// The other language of the ru/en pair
    pub fn other(self) -> Lang {
        match self {
            Lang::Ru => Lang::En,
            Lang::En => Lang::Ru,
        }
    }
}

impl Default for Lang {
    fn default() -> Self {
        Lang::En
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "ru" | "rus" | "russian" => Ok(Lang::Ru),
            "en" | "eng" | "english" => Ok(Lang::En),
            other => Err(Error::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Coarse part-of-speech tag attached to a core token
///
/// Only the noun distinction matters to clustering and tree building, so
/// every other tag collapses into [`PosTag::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PosTag {
    Noun,
    ProperNoun,
    Other,
}

impl PosTag {
    /// Map an analyzer tag string (`NOUN`, `PROPN`, `N`, `VERB`, `X`, ...)
    ///
    /// Only `PROPN`, `N` and `NOUN*` count as nouns. Other tags that merely
    /// start with `N`, such as OpenCorpora `NPRO` and `NUMR`, map to
    /// [`PosTag::Other`].
    pub fn from_tag(tag: &str) -> Self {
        let tag = tag.trim().to_uppercase();
        if tag == "PROPN" {
            PosTag::ProperNoun
        } else if tag == "N" || tag.starts_with("NOUN") {
            PosTag::Noun
        } else {
            PosTag::Other
        }
    }

    /// Check if this is a noun-like tag
    pub fn is_noun(&self) -> bool {
        matches!(self, PosTag::Noun | PosTag::ProperNoun)
    }

    /// Universal tag name
    pub fn as_str(&self) -> &'static str {
        match self {
            PosTag::Noun => "NOUN",
            PosTag::ProperNoun => "PROPN",
            PosTag::Other => "X",
        }
    }
}

impl Default for PosTag {
    fn default() -> Self {
        PosTag::Other
    }
}

/// A node of a keyword forest
///
/// A node owns its children outright; forests built from these values can
/// not share subtrees or contain cycles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordNode {
    #[serde(rename = "keyword")]
    pub label: String,
    #[serde(default)]
    pub children: Vec<KeywordNode>,
}

impl KeywordNode {
    /// Create a node with children
    pub fn new(label: impl Into<String>, children: Vec<KeywordNode>) -> Self {
        Self {
            label: label.into(),
            children,
        }
    }

    /// Create a childless node
    pub fn leaf(label: impl Into<String>) -> Self {
        Self::new(label, Vec::new())
    }

    /// The single-node placeholder forest
    pub fn placeholder_forest() -> Vec<KeywordNode> {
        vec![Self::leaf(NO_KEYWORDS_LABEL)]
    }

    /// Number of nodes in this subtree, including itself
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(KeywordNode::node_count).sum::<usize>()
    }

    /// Length of the longest root-to-leaf path, counting nodes
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(KeywordNode::depth).max().unwrap_or(0)
    }

    /// Child counts in pre-order; equal shapes mean isomorphic trees
    pub fn shape(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_shape(&mut out);
        out
    }

    fn collect_shape(&self, out: &mut Vec<usize>) {
        out.push(self.children.len());
        for child in &self.children {
            child.collect_shape(out);
        }
    }

    /// Labels in pre-order
    pub fn labels(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_labels(&mut out);
        out
    }

    fn collect_labels<'a>(&'a self, out: &mut Vec<&'a str>) {
        out.push(self.label.as_str());
        for child in &self.children {
            child.collect_labels(out);
        }
    }
}

/// Total number of nodes in a forest
pub fn forest_node_count(forest: &[KeywordNode]) -> usize {
    forest.iter().map(KeywordNode::node_count).sum()
}

/// Concatenated pre-order shapes of every root, prefixed by the root count
pub fn forest_shape(forest: &[KeywordNode]) -> Vec<usize> {
    let mut out = vec![forest.len()];
    for root in forest {
        out.extend(root.shape());
    }
    out
}

/// Bilingual keyword forests
///
/// The forest built in the detected language sits in its own slot; the
/// other slot holds its translation with an identical shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordTreeSummary {
    pub source_language: Lang,
    pub ru: Vec<KeywordNode>,
    pub en: Vec<KeywordNode>,
}

impl KeywordTreeSummary {
    /// Route a source forest and its translation into their language slots
    pub fn from_source(
        source_language: Lang,
        source: Vec<KeywordNode>,
        translated: Vec<KeywordNode>,
    ) -> Self {
        match source_language {
            Lang::Ru => Self {
                source_language,
                ru: source,
                en: translated,
            },
            Lang::En => Self {
                source_language,
                ru: translated,
                en: source,
            },
        }
    }

    /// Both slots hold the placeholder forest
    pub fn placeholder(source_language: Lang) -> Self {
        Self::from_source(
            source_language,
            KeywordNode::placeholder_forest(),
            KeywordNode::placeholder_forest(),
        )
    }

    /// Forest for a language slot
    pub fn forest(&self, lang: Lang) -> &[KeywordNode] {
        match lang {
            Lang::Ru => &self.ru,
            Lang::En => &self.en,
        }
    }

    /// Forest in the detected language
    pub fn source_forest(&self) -> &[KeywordNode] {
        self.forest(self.source_language)
    }

    /// Translated forest
    pub fn target_forest(&self) -> &[KeywordNode] {
        self.forest(self.source_language.other())
    }

    /// Check if both slots hold the placeholder forest
    pub fn is_placeholder(&self) -> bool {
        let placeholder = KeywordNode::placeholder_forest();
        self.ru == placeholder && self.en == placeholder
    }
}

/// A summary string pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSummary {
    pub ru: String,
    pub en: String,
}

impl TextSummary {
    /// Summary for a language slot
    pub fn get(&self, lang: Lang) -> &str {
        match lang {
            Lang::Ru => &self.ru,
            Lang::En => &self.en,
        }
    }
}

/// Combined output of the keyword and text pipelines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub keywords: KeywordTreeSummary,
    pub text: TextSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> KeywordNode {
        KeywordNode::new(
            "garden",
            vec![
                KeywordNode::new("apple garden", vec![KeywordNode::leaf("old apple garden")]),
                KeywordNode::leaf("autumn garden"),
            ],
        )
    }

    #[test]
    fn test_lang_parse_and_other() {
        assert_eq!("RU".parse::<Lang>().unwrap(), Lang::Ru);
        assert_eq!("english".parse::<Lang>().unwrap(), Lang::En);
        assert!("de".parse::<Lang>().is_err());
        assert_eq!(Lang::Ru.other(), Lang::En);
        assert_eq!(Lang::En.other(), Lang::Ru);
    }

    #[test]
    fn test_pos_from_tag() {
        assert_eq!(PosTag::from_tag("NOUN"), PosTag::Noun);
        assert_eq!(PosTag::from_tag("noun"), PosTag::Noun);
        assert_eq!(PosTag::from_tag("N"), PosTag::Noun);
        assert_eq!(PosTag::from_tag("PROPN"), PosTag::ProperNoun);
        assert_eq!(PosTag::from_tag("VERB"), PosTag::Other);
        assert_eq!(PosTag::from_tag("X"), PosTag::Other);
    }

    #[test]
    fn test_pronoun_and_numeral_tags_are_not_nouns() {
        assert_eq!(PosTag::from_tag("NPRO"), PosTag::Other);
        assert_eq!(PosTag::from_tag("NUMR"), PosTag::Other);
        assert!(!PosTag::from_tag("npro").is_noun());
        assert_eq!(PosTag::from_tag("NOUN,anim"), PosTag::Noun);
        assert!(PosTag::ProperNoun.is_noun());
        assert!(!PosTag::Other.is_noun());
    }

    #[test]
    fn test_node_metrics() {
        let tree = sample_tree();
        assert_eq!(tree.node_count(), 4);
        assert_eq!(tree.depth(), 3);
        assert_eq!(tree.shape(), vec![2, 1, 0, 0]);
        assert_eq!(
            tree.labels(),
            vec!["garden", "apple garden", "old apple garden", "autumn garden"]
        );
    }

    #[test]
    fn test_forest_shape_counts_roots() {
        let forest = vec![sample_tree(), KeywordNode::leaf("rain")];
        assert_eq!(forest_node_count(&forest), 5);
        assert_eq!(forest_shape(&forest), vec![2, 2, 1, 0, 0, 0]);
    }

    #[test]
    fn test_summary_routing() {
        let ru = vec![KeywordNode::leaf("сад")];
        let en = vec![KeywordNode::leaf("garden")];

        let summary = KeywordTreeSummary::from_source(Lang::Ru, ru.clone(), en.clone());
        assert_eq!(summary.ru, ru);
        assert_eq!(summary.en, en);
        assert_eq!(summary.source_forest(), ru.as_slice());

        let summary = KeywordTreeSummary::from_source(Lang::En, en.clone(), ru.clone());
        assert_eq!(summary.ru, ru);
        assert_eq!(summary.en, en);
        assert_eq!(summary.target_forest(), ru.as_slice());
    }

    #[test]
    fn test_placeholder() {
        let summary = KeywordTreeSummary::placeholder(Lang::En);
        assert!(summary.is_placeholder());
        assert_eq!(summary.ru.len(), 1);
        assert_eq!(summary.en[0].label, NO_KEYWORDS_LABEL);
        assert!(summary.en[0].children.is_empty());
    }

    #[test]
    fn test_node_serializes_as_keyword() {
        let json = serde_json::to_value(KeywordNode::leaf("сад")).unwrap();
        assert_eq!(json["keyword"], "сад");
        assert!(json["children"].as_array().unwrap().is_empty());
    }
}
