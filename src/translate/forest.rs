//! Structure-preserving forest translation
//!
//! Every distinct label is translated once, in pre-order of first
//! appearance, then the forest is rebuilt depth-first with the translated
//! labels. A label whose translation fails keeps its original text, so the
//! output always has the same shape as the input.

use super::Translator;
use crate::types::{KeywordNode, Lang};
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Translate `text`, falling back to the original on failure or empty output
pub async fn translate_or_passthrough(
    translator: &dyn Translator,
    text: &str,
    src: Lang,
    tgt: Lang,
) -> String {
    if src == tgt || text.trim().is_empty() {
        return text.to_string();
    }
    match translator.translate(text, src, tgt).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => {
            tracing::warn!(%src, %tgt, "empty translation, keeping original text");
            text.to_string()
        }
        Err(err) => {
            tracing::warn!(%src, %tgt, error = %err, "translation failed, keeping original text");
            text.to_string()
        }
    }
}

/// Translates keyword forests label by label
#[derive(Clone)]
pub struct ForestTranslator {
    translator: Arc<dyn Translator>,
}

impl std::fmt::Debug for ForestTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForestTranslator").finish_non_exhaustive()
    }
}

impl ForestTranslator {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Translate every label of `forest` from `src` to `tgt`
    pub async fn translate(&self, forest: &[KeywordNode], src: Lang, tgt: Lang) -> Vec<KeywordNode> {
        translate_forest(self.translator.as_ref(), forest, src, tgt).await
    }
}

/// Convenience function
pub async fn translate_forest(
    translator: &dyn Translator,
    forest: &[KeywordNode],
    src: Lang,
    tgt: Lang,
) -> Vec<KeywordNode> {
    if src == tgt {
        return forest.to_vec();
    }

    let mut cache: FxHashMap<String, String> = FxHashMap::default();
    let mut requested = 0usize;
    for root in forest {
        for label in root.labels() {
            if cache.contains_key(label) {
                continue;
            }
            let translated = translate_or_passthrough(translator, label, src, tgt).await;
            cache.insert(label.to_string(), translated);
            requested += 1;
        }
    }

    let out: Vec<KeywordNode> = forest.iter().map(|root| rebuild(root, &cache)).collect();
    tracing::debug!(
        %src,
        %tgt,
        labels = requested,
        nodes = crate::types::forest_node_count(&out),
        "keyword forest translated"
    );
    out
}

fn rebuild(node: &KeywordNode, cache: &FxHashMap<String, String>) -> KeywordNode {
    let children = node.children.iter().map(|child| rebuild(child, cache)).collect();
    let label = cache
        .get(&node.label)
        .cloned()
        .unwrap_or_else(|| node.label.clone());
    KeywordNode::new(label, children)
}
