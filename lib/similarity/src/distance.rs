//! Overlap and match functions for cultural signals
//!
//! All functions return a value in [0.0, 1.0]. An absent signal on either
//! side yields 0.0: it contributes nothing rather than counting as a mismatch.

use std::collections::BTreeSet;

/// 1.0 when both sides are known and equal
pub fn exact_match<T: PartialEq>(a: Option<T>, b: Option<T>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) if a == b => 1.0,
        _ => 0.0,
    }
}

/// 1.0 when both sides are known and differ
pub fn known_difference<T: PartialEq>(a: Option<T>, b: Option<T>) -> f32 {
    match (a, b) {
        (Some(a), Some(b)) if a != b => 1.0,
        _ => 0.0,
    }
}

/// Fraction of `candidate`'s members that also appear in `reference`
pub fn fraction_in<T: Ord>(candidate: &BTreeSet<T>, reference: &BTreeSet<T>) -> f32 {
    if candidate.is_empty() || reference.is_empty() {
        return 0.0;
    }
    let shared = candidate.intersection(reference).count();
    shared as f32 / candidate.len() as f32
}

/// Jaccard index; two empty sets share nothing
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f32 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f32 / union as f32
}

/// Members of both sets, in order
pub fn shared<'a, T: Ord>(a: &'a BTreeSet<T>, b: &'a BTreeSet<T>) -> Vec<&'a T> {
    a.intersection(b).collect()
}
