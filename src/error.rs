//! Error types
//!
//! Collaborator seams (translation, extraction, worker offload, config
//! loading) report failures through [`Error`]. The pipelines themselves
//! recover from these locally and never hand them to their callers.

use crate::types::Lang;

/// Result alias for `rapid-keytree`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised at collaborator and configuration boundaries
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The translation pair has not been made ready
    #[error("translation {src}->{tgt} is not available")]
    PairUnavailable { src: Lang, tgt: Lang },

    /// Transport failure talking to a remote service
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote service answered with a non-success status
    #[error("service returned status {status}: {body}")]
    Service { status: u16, body: String },

    /// Candidate phrase extraction failed
    #[error("candidate extraction failed: {0}")]
    Extraction(String),

    /// The blocking worker pool has been shut down
    #[error("worker pool is closed")]
    PoolClosed,

    /// A blocking job panicked or was cancelled
    #[error("background job failed: {0}")]
    Worker(String),

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Language code outside the ru/en pair
    #[error("unsupported language code \"{0}\"")]
    UnsupportedLanguage(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
