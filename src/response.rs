//! Tagged parsing of externally produced JSON
//!
//! Text generated by another service (typically a language model) often
//! arrives wrapped in Markdown code fences or malformed. [`parse_response`]
//! never fails: it returns either the typed value or the reason it could not
//! produce one.

use std::sync::OnceLock;

use regex::Regex;
use serde::de::DeserializeOwned;

fn opening_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^\s*```(?:json)?\s*").expect("static regex"))
}

fn closing_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)```\s*$").expect("static regex"))
}

/// Why a response could not be turned into a value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseFailure {
    /// No text, or only fences and whitespace
    Empty,
    /// Not JSON at all
    Syntax(String),
    /// Valid JSON with the wrong shape
    Schema(String),
}

impl std::fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseFailure::Empty => f.write_str("empty response"),
            ParseFailure::Syntax(msg) => write!(f, "malformed JSON: {msg}"),
            ParseFailure::Schema(msg) => write!(f, "unexpected JSON shape: {msg}"),
        }
    }
}

/// Outcome of [`parse_response`]
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedResponse<T> {
    Valid(T),
    Invalid(ParseFailure),
}

impl<T> ParsedResponse<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParsedResponse::Valid(_))
    }

    /// The value, discarding the failure reason
    pub fn ok(self) -> Option<T> {
        match self {
            ParsedResponse::Valid(value) => Some(value),
            ParsedResponse::Invalid(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            ParsedResponse::Valid(_) => None,
            ParsedResponse::Invalid(failure) => Some(failure),
        }
    }
}

/// Remove Markdown code fences around a JSON payload
pub fn strip_code_fences(text: &str) -> String {
    let opened = opening_fence_re().replace_all(text, "");
    closing_fence_re().replace_all(&opened, "").trim().to_string()
}

/// Parse `raw` into `T`
pub fn parse_response<T: DeserializeOwned>(raw: Option<&str>) -> ParsedResponse<T> {
    let Some(raw) = raw else {
        tracing::warn!("empty response");
        return ParsedResponse::Invalid(ParseFailure::Empty);
    };

    let cleaned = strip_code_fences(raw);
    if cleaned.is_empty() {
        tracing::warn!("empty response");
        return ParsedResponse::Invalid(ParseFailure::Empty);
    }

    let value: serde_json::Value = match serde_json::from_str(&cleaned) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = %err, "response is not valid JSON");
            return ParsedResponse::Invalid(ParseFailure::Syntax(err.to_string()));
        }
    };

    match serde_json::from_value(value) {
        Ok(parsed) => ParsedResponse::Valid(parsed),
        Err(err) => {
            tracing::warn!(
                error = %err,
                target = std::any::type_name::<T>(),
                "response does not match the expected shape"
            );
            ParsedResponse::Invalid(ParseFailure::Schema(err.to_string()))
        }
    }
}
