//! Natural Language Processing components
//!
//! This module provides phrase normalization, sentence segmentation and
//! stopword filtering.

pub mod sentences;
pub mod stopwords;
pub mod tokenizer;
