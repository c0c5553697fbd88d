//! Candidate phrase extraction
//!
//! This module provides the extractor seam used by the keyword pipeline
//! and a stopword-delimited chunker that implements it.

pub mod chunker;
