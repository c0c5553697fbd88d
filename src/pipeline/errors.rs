//! Configuration diagnostics
//!
//! A [`ConfigError`] pins a problem to a JSON-pointer path inside the
//! configuration document and carries a stable [`ErrorCode`] plus an
//! optional hint for fixing it.

use serde::Serialize;
use std::fmt;

/// Stable, machine-readable diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The `v` field names a version this crate does not understand
    UnsupportedVersion,
    /// A numeric value lies outside its allowed range
    OutOfRange,
    /// A count that must be positive is zero
    InvalidValue,
    /// A field the schema does not know
    UnknownField,
    /// Catch-all for custom rules
    ValidationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::UnsupportedVersion => "unsupported_version",
            Self::OutOfRange => "out_of_range",
            Self::InvalidValue => "invalid_value",
            Self::UnknownField => "unknown_field",
            Self::ValidationFailed => "validation_failed",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single configuration problem
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigError {
    pub code: ErrorCode,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ConfigError {
    pub fn new(code: ErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
            hint: None,
        }
    }

    /// Attach a fix-it hint
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = if self.path.is_empty() { "/" } else { &self.path };
        write!(f, "[{}] {}: {}", self.code, path, self.message)?;
        if let Some(hint) = &self.hint {
            write!(f, " ({hint})")?;
        }
        Ok(())
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_code_path_and_hint() {
        let err = ConfigError::new(ErrorCode::OutOfRange, "/keywords/merge_threshold", "must be in [0, 1]")
            .with_hint("Use a value such as 0.3");
        assert_eq!(
            err.to_string(),
            "[out_of_range] /keywords/merge_threshold: must be in [0, 1] (Use a value such as 0.3)"
        );
    }

    #[test]
    fn test_root_path_display() {
        let err = ConfigError::new(ErrorCode::UnknownField, "", "bad");
        assert_eq!(err.to_string(), "[unknown_field] /: bad");
    }

    #[test]
    fn test_serializes_snake_case_code() {
        let err = ConfigError::new(ErrorCode::UnsupportedVersion, "/v", "unsupported");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "unsupported_version");
        assert!(json.get("hint").is_none());
    }
}
