use super::neighbors::random_pair;
use fastrand::Rng;

/// Order crossover on flattened grids.
///
/// A random slice `[start, end)` of `p1` is copied in place; the remaining
/// cells are filled from `end` onwards (wrapping) with `p2`'s values in
/// `p2`'s order, skipping values already placed. Both parents must be
/// permutations of `1..=len`, and so is the child.
pub fn ordered_crossover(p1: &[u32], p2: &[u32], rng: &mut Rng) -> Vec<u32> {
    match random_pair(rng, p1.len()) {
        Some((a, b)) => ordered_crossover_at(p1, p2, a.min(b), a.max(b)),
        None => p1.to_vec(),
    }
}

pub fn ordered_crossover_at(p1: &[u32], p2: &[u32], start: usize, end: usize) -> Vec<u32> {
    let len = p1.len();
    if len == 0 {
        return Vec::new();
    }
    let mut child = vec![0u32; len];
    let mut placed = vec![false; len + 1];
    for i in start..end {
        child[i] = p1[i];
        placed[p1[i] as usize] = true;
    }

    let mut pos = end % len;
    for &v in p2 {
        if !placed[v as usize] {
            child[pos] = v;
            placed[v as usize] = true;
            pos = (pos + 1) % len;
        }
    }
    child
}

/// Copies a leading block of `p2` over `p1`: either the first `k` levels or
/// the first `k` rows of every level, with `k` in `0..size`. The child
/// usually holds duplicates and must be repaired.
pub fn block_crossover(size: usize, p1: &[u32], p2: &[u32], rng: &mut Rng) -> Vec<u32> {
    let mut child = p1.to_vec();
    if size == 0 {
        return child;
    }
    let sq = size * size;
    let k = rng.usize(..size);
    if rng.bool() {
        child[..k * sq].copy_from_slice(&p2[..k * sq]);
    } else {
        for level in 0..size {
            let s = level * sq;
            child[s..s + k * size].copy_from_slice(&p2[s..s + k * size]);
        }
    }
    child
}
