use crate::error::{MagicCubeError, McResult};
use fastrand::Rng;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Grid position addressed as (level, row, col).
///
/// Strategies work on flat indices internally; `Coord` only appears at the
/// reporting boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coord {
    pub level: usize,
    pub row: usize,
    pub col: usize,
}

impl Coord {
    pub fn new(level: usize, row: usize, col: usize) -> Self {
        Self { level, row, col }
    }
}

/// An N×N×N grid holding a permutation of `1..=N³`.
///
/// Values are stored flattened as `level·N² + row·N + col`. Construction
/// validates the permutation invariant; afterwards only swaps (which
/// preserve it) are exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CubeState {
    size: usize,
    values: Vec<u32>,
    magic_number: i64,
}

/// Accepted on-disk shapes for a caller-supplied grid.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum GridInput {
    Flat(Vec<u32>),
    Nested(Vec<Vec<Vec<u32>>>),
}

/// `N·(N³+1)/2`, the sum every line must reach.
pub fn magic_number(size: usize) -> i64 {
    let n = size as i64;
    n * (n * n * n + 1) / 2
}

impl CubeState {
    /// Uniformly shuffled permutation of `1..=size³`.
    pub fn random(size: usize, rng: &mut Rng) -> McResult<Self> {
        if size == 0 {
            return Err(MagicCubeError::InvalidSize(size));
        }
        let cells = size * size * size;
        let mut values: Vec<u32> = (1..=cells as u32).collect();
        rng.shuffle(&mut values);
        Ok(Self {
            size,
            values,
            magic_number: magic_number(size),
        })
    }

    /// Builds a cube from flattened values, rejecting anything that is not
    /// a permutation of `1..=size³`.
    pub fn from_flat(size: usize, values: Vec<u32>) -> McResult<Self> {
        if size == 0 {
            return Err(MagicCubeError::InvalidSize(size));
        }
        let cells = size * size * size;
        if values.len() != cells {
            return Err(MagicCubeError::GridLength {
                expected: cells,
                actual: values.len(),
            });
        }
        check_permutation(&values)?;
        Ok(Self {
            size,
            values,
            magic_number: magic_number(size),
        })
    }

    /// Builds a cube from a `[level][row][col]` nested array.
    pub fn from_nested(grid: &[Vec<Vec<u32>>]) -> McResult<Self> {
        let size = grid.len();
        if size == 0 {
            return Err(MagicCubeError::InvalidSize(size));
        }
        let mut values = Vec::with_capacity(size * size * size);
        for (l, level) in grid.iter().enumerate() {
            if level.len() != size {
                return Err(MagicCubeError::Shape(format!(
                    "level {} has {} rows, expected {}",
                    l,
                    level.len(),
                    size
                )));
            }
            for (r, row) in level.iter().enumerate() {
                if row.len() != size {
                    return Err(MagicCubeError::Shape(format!(
                        "level {} row {} has {} columns, expected {}",
                        l,
                        r,
                        row.len(),
                        size
                    )));
                }
                values.extend_from_slice(row);
            }
        }
        Self::from_flat(size, values)
    }

    /// Resolves a parsed grid. A flat grid takes its size from `size`, or
    /// from the cube root of its length when `size` is `None`.
    pub fn from_input(input: GridInput, size: Option<usize>) -> McResult<Self> {
        match input {
            GridInput::Nested(grid) => {
                let cube = Self::from_nested(&grid)?;
                if let Some(expected) = size {
                    if expected != cube.size {
                        return Err(MagicCubeError::GridLength {
                            expected: expected * expected * expected,
                            actual: cube.len(),
                        });
                    }
                }
                Ok(cube)
            }
            GridInput::Flat(values) => {
                let size = match size {
                    Some(s) => s,
                    None => cube_root(values.len()).ok_or(MagicCubeError::GridLength {
                        expected: nearest_cube(values.len()),
                        actual: values.len(),
                    })?,
                };
                Self::from_flat(size, values)
            }
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P, size: Option<usize>) -> McResult<Self> {
        let content = fs::read_to_string(path)?;
        let input: GridInput = serde_json::from_str(&content)?;
        Self::from_input(input, size)
    }

    /// Wraps values already known to be a permutation (GA offspring after
    /// repair, crossover output).
    pub(crate) fn from_permutation(size: usize, values: Vec<u32>) -> Self {
        debug_assert_eq!(values.len(), size * size * size);
        Self {
            size,
            values,
            magic_number: magic_number(size),
        }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[inline(always)]
    pub fn magic_number(&self) -> i64 {
        self.magic_number
    }

    #[inline(always)]
    pub fn values(&self) -> &[u32] {
        &self.values
    }

    pub fn into_values(self) -> Vec<u32> {
        self.values
    }

    #[inline(always)]
    pub fn value(&self, index: usize) -> u32 {
        self.values[index]
    }

    pub fn get(&self, coord: Coord) -> u32 {
        self.values[self.index_of(coord)]
    }

    #[inline(always)]
    pub fn index_of(&self, coord: Coord) -> usize {
        coord.level * self.size * self.size + coord.row * self.size + coord.col
    }

    #[inline(always)]
    pub fn coord_of(&self, index: usize) -> Coord {
        coord_of(self.size, index)
    }

    /// Exchanges two cells in place.
    #[inline(always)]
    pub fn swap(&mut self, a: usize, b: usize) {
        self.values.swap(a, b);
    }

    /// Copy of this cube with two cells exchanged.
    pub fn swapped(&self, a: usize, b: usize) -> Self {
        let mut next = self.clone();
        next.swap(a, b);
        next
    }

    /// Replaces the grid contents with a fresh uniform shuffle.
    pub fn reshuffle(&mut self, rng: &mut Rng) {
        for (i, v) in self.values.iter_mut().enumerate() {
            *v = i as u32 + 1;
        }
        rng.shuffle(&mut self.values);
    }

    /// Nested `[level][row][col]` view for reporting.
    pub fn to_nested(&self) -> Vec<Vec<Vec<u32>>> {
        self.values
            .chunks(self.size * self.size)
            .map(|level| level.chunks(self.size).map(|row| row.to_vec()).collect())
            .collect()
    }
}

pub fn coord_of(size: usize, index: usize) -> Coord {
    let sq = size * size;
    Coord {
        level: index / sq,
        row: (index % sq) / size,
        col: index % size,
    }
}

/// True when `values` holds each of `1..=values.len()` exactly once.
pub fn is_permutation(values: &[u32]) -> bool {
    check_permutation(values).is_ok()
}

fn check_permutation(values: &[u32]) -> McResult<()> {
    let n = values.len();
    let mut seen = vec![false; n + 1];
    for &v in values {
        let idx = v as usize;
        if idx == 0 || idx > n {
            return Err(MagicCubeError::NotPermutation(format!(
                "value {} outside 1..={}",
                v, n
            )));
        }
        if seen[idx] {
            return Err(MagicCubeError::NotPermutation(format!(
                "value {} appears more than once",
                v
            )));
        }
        seen[idx] = true;
    }
    Ok(())
}

fn cube_root(len: usize) -> Option<usize> {
    let mut n = 1;
    while n * n * n < len {
        n += 1;
    }
    (n * n * n == len).then_some(n)
}

fn nearest_cube(len: usize) -> usize {
    let mut n = 1;
    while n * n * n < len {
        n += 1;
    }
    n * n * n
}
