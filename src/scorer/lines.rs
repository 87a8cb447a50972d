use serde::Serialize;
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LineCategory {
    Row,
    Column,
    Pillar,
    LevelDiagonal,
    SpaceDiagonal,
}

impl LineCategory {
    pub const COUNT: usize = 5;

    pub const ALL: [LineCategory; 5] = [
        LineCategory::Row,
        LineCategory::Column,
        LineCategory::Pillar,
        LineCategory::LevelDiagonal,
        LineCategory::SpaceDiagonal,
    ];

    #[inline(always)]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Every line of an N-cube whose sum must equal the magic number.
///
/// Lines are stored in a fixed order: rows (level, row), columns
/// (level, col), pillars (row, col), level diagonals (main then anti per
/// level), then the four space diagonals. Each line owns exactly N cells.
#[derive(Debug, Clone)]
pub struct LineSet {
    size: usize,
    categories: Vec<LineCategory>,
    cells: Vec<usize>,

    // --- Cell -> Line index (CSR Format) ---
    cell_line_starts: Vec<usize>,
    cell_lines: Vec<u32>,
}

impl LineSet {
    pub fn new(size: usize) -> Self {
        let n = size;
        let sq = n * n;
        let idx = |l: usize, r: usize, c: usize| l * sq + r * n + c;

        let mut categories = Vec::new();
        let mut cells = Vec::new();
        let mut push = |cat: LineCategory, line: &mut dyn Iterator<Item = usize>| {
            categories.push(cat);
            cells.extend(line);
        };

        // 1. Rows
        for l in 0..n {
            for r in 0..n {
                push(LineCategory::Row, &mut (0..n).map(|c| idx(l, r, c)));
            }
        }
        // 2. Columns
        for l in 0..n {
            for c in 0..n {
                push(LineCategory::Column, &mut (0..n).map(|r| idx(l, r, c)));
            }
        }
        // 3. Pillars
        for r in 0..n {
            for c in 0..n {
                push(LineCategory::Pillar, &mut (0..n).map(|l| idx(l, r, c)));
            }
        }
        // 4. Level diagonals
        for l in 0..n {
            push(LineCategory::LevelDiagonal, &mut (0..n).map(|i| idx(l, i, i)));
            push(
                LineCategory::LevelDiagonal,
                &mut (0..n).map(|i| idx(l, i, n - 1 - i)),
            );
        }
        // 5. Space diagonals
        let m = n.saturating_sub(1);
        push(LineCategory::SpaceDiagonal, &mut (0..n).map(|i| idx(i, i, i)));
        push(
            LineCategory::SpaceDiagonal,
            &mut (0..n).map(|i| idx(i, i, m - i)),
        );
        push(
            LineCategory::SpaceDiagonal,
            &mut (0..n).map(|i| idx(i, m - i, i)),
        );
        push(
            LineCategory::SpaceDiagonal,
            &mut (0..n).map(|i| idx(i, m - i, m - i)),
        );

        // Build CSR
        let total_cells = sq * n;
        let mut counts = vec![0usize; total_cells];
        for &cell in &cells {
            counts[cell] += 1;
        }
        let mut cell_line_starts = vec![0; total_cells + 1];
        let mut offset = 0;
        for (i, &count) in counts.iter().enumerate() {
            cell_line_starts[i] = offset;
            offset += count;
        }
        cell_line_starts[total_cells] = offset;

        let mut cursor = cell_line_starts.clone();
        let mut cell_lines = vec![0u32; offset];
        for (line, chunk) in cells.chunks(n.max(1)).enumerate() {
            for &cell in chunk {
                cell_lines[cursor[cell]] = line as u32;
                cursor[cell] += 1;
            }
        }

        Self {
            size,
            categories,
            cells,
            cell_line_starts,
            cell_lines,
        }
    }

    #[inline(always)]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of lines (`3N² + 2N + 4`).
    #[inline(always)]
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    #[inline(always)]
    pub fn category(&self, line: usize) -> LineCategory {
        self.categories[line]
    }

    #[inline(always)]
    pub fn cells(&self, line: usize) -> &[usize] {
        &self.cells[line * self.size..(line + 1) * self.size]
    }

    /// Lines passing through `cell`, in ascending line order.
    #[inline(always)]
    pub fn lines_through(&self, cell: usize) -> &[u32] {
        &self.cell_lines[self.cell_line_starts[cell]..self.cell_line_starts[cell + 1]]
    }

    pub fn line_sum(&self, values: &[u32], line: usize) -> i64 {
        self.cells(line).iter().map(|&c| values[c] as i64).sum()
    }

    /// Line indices belonging to `category`.
    pub fn lines_of(&self, category: LineCategory) -> impl Iterator<Item = usize> + '_ {
        self.categories
            .iter()
            .enumerate()
            .filter(move |&(_, &c)| c == category)
            .map(|(i, _)| i)
    }
}
