//! Summarization components
//!
//! Provides extractive summarization that scores sentences by normalized
//! word frequency, document position and length fit.

pub mod extractive;
pub mod frequency;

pub use extractive::{
    summarize, Degenerate, ExtractiveSummarizer, ScoredSentence, SummarizerConfig,
    DEFAULT_PREFERRED_LENGTH, DEFAULT_SENTENCE_COUNT,
};
pub use frequency::WordFrequencies;
