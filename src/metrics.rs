//! Set similarity
//!
//! The Jaccard index is the only similarity used for merging clusters and
//! for soft attachment in the forest builder.

use rustc_hash::FxHashSet;
use std::hash::{BuildHasher, Hash};
use std::collections::HashSet;

/// Jaccard similarity between two sets: `|A ∩ B| / |A ∪ B|`
///
/// Two empty sets score 0.0, not 1.0; an empty core carries no evidence of
/// similarity.
pub fn jaccard<T, S>(a: &HashSet<T, S>, b: &HashSet<T, S>) -> f64
where
    T: Eq + Hash,
    S: BuildHasher,
{
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = small.iter().filter(|x| large.contains(*x)).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        0.0
    } else {
        intersection as f64 / union as f64
    }
}

/// Check if `a` is a strict subset of `b`
pub fn is_strict_subset<T, S>(a: &HashSet<T, S>, b: &HashSet<T, S>) -> bool
where
    T: Eq + Hash,
    S: BuildHasher,
{
    a.len() < b.len() && a.is_subset(b)
}

/// Build a token set from string slices
pub fn token_set<I, T>(tokens: I) -> FxHashSet<String>
where
    I: IntoIterator<Item = T>,
    T: Into<String>,
{
    tokens.into_iter().map(Into::into).collect()
}
