//! Validation engine for [`SummaryConfig`].
//!
//! Every registered [`ValidationRule`] runs and all findings land in one
//! [`ValidationReport`], so a bad config reports every problem at once.
//!
//! ```rust,ignore
//! let report = ValidationEngine::with_defaults().validate(&config);
//! for err in report.errors() {
//!     eprintln!("{err}");
//! }
//! ```

use std::collections::HashMap;

use serde::Serialize;

use super::config::{SummaryConfig, CONFIG_VERSION};
use super::errors::{ConfigError, ErrorCode};

// ─── Severity ───────────────────────────────────────────────────────────────

/// Hard error or soft warning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

// ─── Diagnostic ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ValidationDiagnostic {
    pub severity: Severity,
    #[serde(flatten)]
    pub error: ConfigError,
}

impl ValidationDiagnostic {
    pub fn error(err: ConfigError) -> Self {
        Self {
            severity: Severity::Error,
            error: err,
        }
    }

    pub fn warning(err: ConfigError) -> Self {
        Self {
            severity: Severity::Warning,
            error: err,
        }
    }
}

// ─── Report ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub diagnostics: Vec<ValidationDiagnostic>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &ConfigError> {
        self.by_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ConfigError> {
        self.by_severity(Severity::Warning)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &ConfigError> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
            .map(|d| &d.error)
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// No errors; warnings are acceptable
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

// ─── Rule trait ─────────────────────────────────────────────────────────────

/// A stateless check over a [`SummaryConfig`]
pub trait ValidationRule: Send + Sync {
    /// Short, stable identifier (e.g. `"threshold_range"`)
    fn name(&self) -> &str;

    fn validate(&self, config: &SummaryConfig) -> Vec<ValidationDiagnostic>;
}

// ─── Engine ─────────────────────────────────────────────────────────────────

pub struct ValidationEngine {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl ValidationEngine {
    /// Engine with no rules
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// Engine with the built-in rule set
    pub fn with_defaults() -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(VersionRule));
        engine.add_rule(Box::new(ThresholdRangeRule));
        engine.add_rule(Box::new(PositiveCountsRule));
        engine.add_rule(Box::new(UnknownFieldsRule));
        engine
    }

    pub fn add_rule(&mut self, rule: Box<dyn ValidationRule>) {
        self.rules.push(rule);
    }

    /// Names of the registered rules, in run order
    pub fn rule_names(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    pub fn validate(&self, config: &SummaryConfig) -> ValidationReport {
        let mut report = ValidationReport::default();
        for rule in &self.rules {
            report.diagnostics.extend(rule.validate(config));
        }
        report
    }
}

impl Default for ValidationEngine {
    fn default() -> Self {
        Self::with_defaults()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Concrete rules
// ═══════════════════════════════════════════════════════════════════════════

// ─── 1. known config version ────────────────────────────────────────────────

struct VersionRule;

impl ValidationRule for VersionRule {
    fn name(&self) -> &str {
        "version"
    }

    fn validate(&self, config: &SummaryConfig) -> Vec<ValidationDiagnostic> {
        if config.v == CONFIG_VERSION {
            return Vec::new();
        }
        vec![ValidationDiagnostic::error(
            ConfigError::new(
                ErrorCode::UnsupportedVersion,
                "/v",
                format!("unsupported config version {}", config.v),
            )
            .with_hint(format!("Set \"v\": {CONFIG_VERSION}")),
        )]
    }
}

// ─── 2. Jaccard thresholds lie in [0, 1] ────────────────────────────────────

struct ThresholdRangeRule;

impl ThresholdRangeRule {
    fn check(path: &str, value: f64, default: f64) -> Option<ValidationDiagnostic> {
        if (0.0..=1.0).contains(&value) {
            return None;
        }
        Some(ValidationDiagnostic::error(
            ConfigError::new(
                ErrorCode::OutOfRange,
                path,
                format!("threshold {value} is outside [0, 1]"),
            )
            .with_hint(format!("Use a value such as {default}")),
        ))
    }
}

impl ValidationRule for ThresholdRangeRule {
    fn name(&self) -> &str {
        "threshold_range"
    }

    fn validate(&self, config: &SummaryConfig) -> Vec<ValidationDiagnostic> {
        let keywords = &config.keywords;
        [
            Self::check(
                "/keywords/merge_threshold",
                keywords.merge_threshold,
                crate::cluster::DEFAULT_MERGE_THRESHOLD,
            ),
            Self::check(
                "/keywords/soft_attach_threshold",
                keywords.soft_attach_threshold,
                crate::tree::DEFAULT_SOFT_ATTACH_THRESHOLD,
            ),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

// ─── 3. counts must be positive ─────────────────────────────────────────────

struct PositiveCountsRule;

impl ValidationRule for PositiveCountsRule {
    fn name(&self) -> &str {
        "positive_counts"
    }

    fn validate(&self, config: &SummaryConfig) -> Vec<ValidationDiagnostic> {
        let checks = [
            ("/keywords/top_k", config.keywords.top_k),
            ("/summary/sentence_count", config.summary.sentence_count),
            (
                "/summary/preferred_sentence_length",
                config.summary.preferred_sentence_length,
            ),
            ("/runtime/max_blocking_jobs", config.runtime.max_blocking_jobs),
        ];

        checks
            .into_iter()
            .filter(|(_, value)| *value == 0)
            .map(|(path, _)| {
                ValidationDiagnostic::error(
                    ConfigError::new(ErrorCode::InvalidValue, path, "must be greater than 0")
                        .with_hint("Remove the field to use the default"),
                )
            })
            .collect()
    }
}

// ─── 4. unknown fields (warning, or error in strict mode) ───────────────────

struct UnknownFieldsRule;

impl UnknownFieldsRule {
    fn check_unknowns(
        path: &str,
        unknowns: &HashMap<String, serde_json::Value>,
        strict: bool,
    ) -> Vec<ValidationDiagnostic> {
        let diag_fn = if strict {
            ValidationDiagnostic::error
        } else {
            ValidationDiagnostic::warning
        };
        let mut keys: Vec<&String> = unknowns.keys().collect();
        keys.sort();
        keys.into_iter()
            .map(|key| {
                diag_fn(
                    ConfigError::new(
                        ErrorCode::UnknownField,
                        format!("{path}/{key}"),
                        format!("unrecognized field \"{key}\""),
                    )
                    .with_hint("Check spelling or remove this field"),
                )
            })
            .collect()
    }
}

impl ValidationRule for UnknownFieldsRule {
    fn name(&self) -> &str {
        "unknown_fields"
    }

    fn validate(&self, config: &SummaryConfig) -> Vec<ValidationDiagnostic> {
        let strict = config.strict;
        let mut out = Self::check_unknowns("", &config.unknown_fields, strict);
        out.extend(Self::check_unknowns(
            "/keywords",
            &config.keywords.unknown_fields,
            strict,
        ));
        out.extend(Self::check_unknowns(
            "/summary",
            &config.summary.unknown_fields,
            strict,
        ));
        out.extend(Self::check_unknowns(
            "/runtime",
            &config.runtime.unknown_fields,
            strict,
        ));
        out
    }
}

// ═══════════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════════
