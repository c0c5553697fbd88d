//! Pipeline configuration
//!
//! Every field is optional; missing fields take the defaults below. Fields
//! the schema does not know are captured and reported by the
//! [`super::validation::ValidationEngine`].
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "v": 1,
//!   "keywords": { "top_k": 40, "merge_threshold": 0.3, "soft_attach_threshold": 0.18 },
//!   "summary": { "sentence_count": 6, "preferred_sentence_length": 15 },
//!   "runtime": { "max_blocking_jobs": 4 },
//!   "strict": false
//! }
//! ```

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::validation::{ValidationEngine, ValidationReport};
use crate::cluster::DEFAULT_MERGE_THRESHOLD;
use crate::error::{Error, Result};
use crate::phrase::chunker::DEFAULT_TOP_K;
use crate::summarizer::{DEFAULT_PREFERRED_LENGTH, DEFAULT_SENTENCE_COUNT};
use crate::tree::DEFAULT_SOFT_ATTACH_THRESHOLD;

/// Configuration version understood by this crate
pub const CONFIG_VERSION: u32 = 1;

/// Default cap on concurrent blocking jobs
pub const DEFAULT_MAX_BLOCKING_JOBS: usize = 4;

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

fn default_merge_threshold() -> f64 {
    DEFAULT_MERGE_THRESHOLD
}

fn default_soft_attach_threshold() -> f64 {
    DEFAULT_SOFT_ATTACH_THRESHOLD
}

fn default_sentence_count() -> usize {
    DEFAULT_SENTENCE_COUNT
}

fn default_preferred_length() -> usize {
    DEFAULT_PREFERRED_LENGTH
}

fn default_max_blocking_jobs() -> usize {
    DEFAULT_MAX_BLOCKING_JOBS
}

/// Top-level configuration (v1)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Config version (currently `1`)
    #[serde(default = "default_version")]
    pub v: u32,

    #[serde(default)]
    pub keywords: KeywordSettings,

    #[serde(default)]
    pub summary: SummarySettings,

    #[serde(default)]
    pub runtime: RuntimeSettings,

    /// If `true`, unrecognized fields are errors; if `false`, warnings
    #[serde(default)]
    pub strict: bool,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Keyword tree settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordSettings {
    /// Maximum number of candidate phrases requested from the extractor
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Jaccard threshold for merging clusters
    #[serde(default = "default_merge_threshold")]
    pub merge_threshold: f64,

    /// Jaccard threshold for soft attachment in the forest builder
    #[serde(default = "default_soft_attach_threshold")]
    pub soft_attach_threshold: f64,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Extractive summary settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarySettings {
    #[serde(default = "default_sentence_count")]
    pub sentence_count: usize,

    #[serde(default = "default_preferred_length")]
    pub preferred_sentence_length: usize,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

/// Runtime limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeSettings {
    /// Maximum number of CPU-bound jobs running on blocking threads at once
    #[serde(default = "default_max_blocking_jobs")]
    pub max_blocking_jobs: usize,

    #[serde(flatten)]
    pub unknown_fields: HashMap<String, serde_json::Value>,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            v: CONFIG_VERSION,
            keywords: KeywordSettings::default(),
            summary: SummarySettings::default(),
            runtime: RuntimeSettings::default(),
            strict: false,
            unknown_fields: HashMap::new(),
        }
    }
}

impl Default for KeywordSettings {
    fn default() -> Self {
        Self {
            top_k: DEFAULT_TOP_K,
            merge_threshold: DEFAULT_MERGE_THRESHOLD,
            soft_attach_threshold: DEFAULT_SOFT_ATTACH_THRESHOLD,
            unknown_fields: HashMap::new(),
        }
    }
}

impl Default for SummarySettings {
    fn default() -> Self {
        Self {
            sentence_count: DEFAULT_SENTENCE_COUNT,
            preferred_sentence_length: DEFAULT_PREFERRED_LENGTH,
            unknown_fields: HashMap::new(),
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_blocking_jobs: DEFAULT_MAX_BLOCKING_JOBS,
            unknown_fields: HashMap::new(),
        }
    }
}

impl SummaryConfig {
    /// Parse without validating
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Run the default rule set
    pub fn validate(&self) -> ValidationReport {
        ValidationEngine::with_defaults().validate(self)
    }

    /// Validate, logging warnings and rejecting errors
    pub fn validated(self) -> Result<Self> {
        let report = self.validate();
        for warning in report.warnings() {
            tracing::warn!(code = %warning.code, path = %warning.path, "{}", warning.message);
        }
        if report.has_errors() {
            let messages: Vec<String> = report.errors().map(ToString::to_string).collect();
            return Err(Error::InvalidConfig(messages.join("; ")));
        }
        Ok(self)
    }

    /// Parse and validate
    pub fn load(json: &str) -> Result<Self> {
        Self::from_json(json)?.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_minimal_config() {
        let config = SummaryConfig::from_json("{}").unwrap();
        assert_eq!(config.v, 1);
        assert_eq!(config.keywords.top_k, 40);
        assert_eq!(config.keywords.merge_threshold, 0.3);
        assert_eq!(config.keywords.soft_attach_threshold, 0.18);
        assert_eq!(config.summary.sentence_count, 6);
        assert_eq!(config.summary.preferred_sentence_length, 15);
        assert_eq!(config.runtime.max_blocking_jobs, 4);
        assert!(!config.strict);
    }

    #[test]
    fn test_deserialize_full_config() {
        let json = r#"{
            "v": 1,
            "keywords": { "top_k": 20, "merge_threshold": 0.5, "soft_attach_threshold": 0.25 },
            "summary": { "sentence_count": 3, "preferred_sentence_length": 12 },
            "runtime": { "max_blocking_jobs": 2 },
            "strict": true
        }"#;
        let config = SummaryConfig::from_json(json).unwrap();
        assert_eq!(config.keywords.top_k, 20);
        assert_eq!(config.keywords.merge_threshold, 0.5);
        assert_eq!(config.summary.sentence_count, 3);
        assert_eq!(config.runtime.max_blocking_jobs, 2);
        assert!(config.strict);
    }

    #[test]
    fn test_partial_section_keeps_defaults() {
        let config = SummaryConfig::from_json(r#"{ "keywords": { "top_k": 10 } }"#).unwrap();
        assert_eq!(config.keywords.top_k, 10);
        assert_eq!(config.keywords.merge_threshold, 0.3);
    }

    #[test]
    fn test_unknown_fields_captured() {
        let json = r#"{ "v": 1, "bogus": 1, "summary": { "sentences": 3 } }"#;
        let config = SummaryConfig::from_json(json).unwrap();
        assert!(config.unknown_fields.contains_key("bogus"));
        assert!(config.summary.unknown_fields.contains_key("sentences"));
    }

    #[test]
    fn test_default_matches_empty_json() {
        let parsed = serde_json::to_value(SummaryConfig::from_json("{}").unwrap()).unwrap();
        let built = serde_json::to_value(SummaryConfig::default()).unwrap();
        assert_eq!(parsed, built);
    }

    #[test]
    fn test_validated_rejects_errors() {
        let err = SummaryConfig::load(r#"{ "v": 2 }"#).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig(ref msg) if msg.contains("/v")));
    }

    #[test]
    fn test_validated_accepts_warnings() {
        let config = SummaryConfig::load(r#"{ "bogus": true }"#).unwrap();
        assert_eq!(config.v, 1);
    }

    #[test]
    fn test_bad_json_is_error() {
        assert!(matches!(SummaryConfig::from_json("{"), Err(Error::Json(_))));
    }
}
