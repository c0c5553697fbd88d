//! Keyword forest construction
//!
//! Clusters are arranged into parent/child relations by three attach passes
//! (subset containment, single-token anchors, soft Jaccard similarity),
//! weak roots are folded into their closest strong cluster, and member
//! phrases more specific than their cluster are surfaced as leaves.

pub mod builder;

pub use builder::{build_forest, Child, ForestBuilder, ForestLayout, DEFAULT_SOFT_ATTACH_THRESHOLD};
