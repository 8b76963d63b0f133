//! Weighted random selection.
//!
//! Items are scanned in slice order, which is the insertion order of the
//! authoring data, so a scripted [`RandomSource`] gives reproducible picks.

use crate::random::RandomSource;

#[inline]
fn usable(w: f32) -> f32 {
    if w.is_finite() && w > 0.0 {
        w
    } else {
        0.0
    }
}

/// Draw an index with probability proportional to its weight.
///
/// Zero, negative and non-finite weights are never drawn while any positive
/// weight exists. When every weight is unusable the first index is returned.
/// Returns `None` only for an empty input.
pub fn choose_index(weights: &[f32], rng: &mut dyn RandomSource) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let total: f32 = weights.iter().copied().map(usable).sum();
    if total <= 0.0 {
        return Some(0);
    }
    let r = rng.next_f32() * total;
    let mut acc = 0.0;
    let mut last_positive = 0;
    for (i, w) in weights.iter().copied().map(usable).enumerate() {
        if w <= 0.0 {
            continue;
        }
        acc += w;
        last_positive = i;
        if r < acc {
            return Some(i);
        }
    }
    // Rounding can leave r a hair above the running sum.
    Some(last_positive)
}

/// Draw one item from `(item, weight)` pairs.
pub fn choose<'a, T>(items: &'a [(T, f32)], rng: &mut dyn RandomSource) -> Option<&'a T> {
    let weights: Vec<f32> = items.iter().map(|(_, w)| *w).collect();
    choose_index(&weights, rng).map(|i| &items[i].0)
}
