//! Stable-order enumeration of conditioning sets.
//!
//! Both the pruning search and the implication validator depend on the exact
//! enumeration order: subsets are produced smallest-size-first, and within a
//! size in lexicographic index order. The orders here are part of the
//! contract, not an implementation detail.

use smallvec::SmallVec;

/// All subsets of `items` of size `k`, or of every size from 1 to
/// `items.len()` when `k` is `None` (smallest first). With `include_empty`
/// the empty set is appended as the final element regardless of `k`.
pub fn all_possible_sets<T: Clone>(
    items: &[T],
    k: Option<usize>,
    include_empty: bool,
) -> Vec<Vec<T>> {
    let mut sets = Vec::new();
    match k {
        Some(size) => push_combinations(items, size, &mut sets),
        None => {
            for size in 1..=items.len() {
                push_combinations(items, size, &mut sets);
            }
        }
    }
    if include_empty {
        sets.push(Vec::new());
    }
    sets
}

/// Unordered pairs in the same order as size-2 combinations.
pub fn pairs<T: Clone>(items: &[T]) -> Vec<(T, T)> {
    let mut out = Vec::new();
    for i in 0..items.len() {
        for j in i + 1..items.len() {
            out.push((items[i].clone(), items[j].clone()));
        }
    }
    out
}

/// Appends the size-`k` combinations of `items` in lexicographic index
/// order, via the standard index-vector walk. The index buffer stays on the
/// stack for the arities this crate targets.
fn push_combinations<T: Clone>(items: &[T], k: usize, out: &mut Vec<Vec<T>>) {
    let n = items.len();
    if k == 0 {
        out.push(Vec::new());
        return;
    }
    if k > n {
        return;
    }

    let mut indices: SmallVec<[usize; 8]> = (0..k).collect();
    loop {
        out.push(indices.iter().map(|&i| items[i].clone()).collect());

        // Find the rightmost index that can still advance.
        let mut i = k;
        loop {
            if i == 0 {
                return;
            }
            i -= 1;
            if indices[i] != i + n - k {
                break;
            }
            if i == 0 {
                return;
            }
        }
        indices[i] += 1;
        for j in i + 1..k {
            indices[j] = indices[j - 1] + 1;
        }
    }
}
