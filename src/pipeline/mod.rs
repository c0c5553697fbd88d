//! Orchestration layer
//!
//! Wires the algorithmic modules into the keyword path
//! ([`KeywordSummaryAssembler`]), the text path ([`TextSummaryService`]) and
//! the combined [`DocumentSummarizer`]. CPU-bound stages run on a
//! [`BlockingPool`]; collaborator calls are the only suspension points.

pub mod config;
pub mod errors;
pub mod keyword;
pub mod observer;
pub mod offload;
pub mod runner;
pub mod text;
pub mod validation;

pub use config::SummaryConfig;
pub use errors::{ConfigError, ErrorCode};
pub use keyword::KeywordSummaryAssembler;
pub use observer::{NoopObserver, PipelineObserver, StageTimingObserver, TracingObserver};
pub use offload::BlockingPool;
pub use runner::DocumentSummarizer;
pub use text::TextSummaryService;
pub use validation::{ValidationEngine, ValidationReport};
