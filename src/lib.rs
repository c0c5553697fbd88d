//! # rapid-keytree
//!
//! Bilingual keyword trees and extractive summaries for Russian and English
//! documents.
//!
//! The keyword path extracts candidate phrases, merges overlapping phrases
//! into clusters by Jaccard similarity of their core tokens, arranges the
//! clusters into a forest of containment relations and translates that
//! forest label by label into the other language. The text path scores
//! sentences by word frequency, position and length and keeps the best ones
//! in document order.
//!
//! ```rust,ignore
//! use rapid_keytree::{DocumentSummarizer, IdentityTranslator};
//! use std::sync::Arc;
//!
//! let runner = DocumentSummarizer::new(Arc::new(IdentityTranslator));
//! let summary = runner.summarize("Apple gardens bloom in early spring.").await;
//! println!("{}", summary.text.en);
//! ```

pub mod cluster;
pub mod error;
pub mod lang;
pub mod metrics;
pub mod nlp;
pub mod phrase;
pub mod pipeline;
pub mod response;
pub mod summarizer;
pub mod translate;
pub mod tree;
pub mod types;

pub use cluster::{cluster_phrases, Cluster, ClusterEngine};
pub use error::{Error, Result};
pub use lang::{LanguageDetector, ScriptRatioDetector};
pub use metrics::jaccard;
pub use phrase::chunker::{CandidateExtractor, StopwordChunker};
pub use pipeline::{
    DocumentSummarizer, KeywordSummaryAssembler, SummaryConfig, TextSummaryService,
};
pub use response::{parse_response, ParseFailure, ParsedResponse};
pub use summarizer::{summarize, ExtractiveSummarizer};
pub use translate::{IdentityTranslator, LibreTranslateClient, Translator};
pub use tree::{build_forest, ForestBuilder};
pub use types::{
    DocumentSummary, KeywordNode, KeywordTreeSummary, Lang, PosTag, TextSummary,
    NO_KEYWORDS_LABEL,
};
