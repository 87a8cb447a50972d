use super::neighbors::random_pair;
use crate::error::{MagicCubeError, McResult};
use fastrand::Rng;

/// Swaps two distinct random cells. No-op on a single-cell grid.
pub fn swap_mutation(values: &mut [u32], rng: &mut Rng) {
    if let Some((a, b)) = random_pair(rng, values.len()) {
        values.swap(a, b);
    }
}

/// Turns `values` back into a permutation of `1..=len`.
///
/// The first occurrence of each in-range value stays put. Every later
/// duplicate, and every out-of-range cell, takes the smallest value not yet
/// present. Returns the number of cells reassigned.
pub fn repair_duplicates(values: &mut [u32]) -> McResult<usize> {
    let n = values.len();
    let mut seen = vec![false; n + 1];
    let mut conflicts = Vec::new();
    for (i, &v) in values.iter().enumerate() {
        let idx = v as usize;
        if idx == 0 || idx > n || seen[idx] {
            conflicts.push(i);
        } else {
            seen[idx] = true;
        }
    }
    if conflicts.is_empty() {
        return Ok(0);
    }

    // Ascending, so the smallest missing value is handed out first
    let mut missing = (1..=n as u32).filter(|&v| !seen[v as usize]);
    let mut reassigned = 0;
    for &pos in conflicts.iter().take(n) {
        match missing.next() {
            Some(v) => {
                values[pos] = v;
                reassigned += 1;
            }
            None => {
                return Err(MagicCubeError::RepairExhausted {
                    duplicates: conflicts.len() - reassigned,
                })
            }
        }
    }
    Ok(reassigned)
}
