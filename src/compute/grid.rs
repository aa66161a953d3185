//! Raw and prefix (summed-area) grids.
//!
//! A [`Grid`] holds per-cell population totals in column-major flat storage.
//! [`Grid::into_prefix`] consumes it and produces a [`PrefixGrid`] where each
//! cell holds the cumulative population of the rectangle from the grid's
//! southwest corner through that cell, inclusive. The transform is
//! one-directional; the type change guarantees a prefix grid is never read
//! as raw again.

/// Per-cell population totals for a `columns x rows` grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    columns: usize,
    rows: usize,
    cells: Vec<u64>,
}

impl Grid {
    /// An all-zero grid.
    pub fn zeroed(columns: usize, rows: usize) -> Self {
        Self {
            columns,
            rows,
            cells: vec![0; columns * rows],
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.columns && y < self.rows);
        x * self.rows + y
    }

    pub fn get(&self, x: usize, y: usize) -> u64 {
        self.cells[self.index(x, y)]
    }

    /// Add `population` to cell `(x, y)`.
    pub fn add(&mut self, x: usize, y: usize, population: u64) {
        let index = self.index(x, y);
        self.cells[index] += population;
    }

    /// Sum of all cells. Must equal the extent's total population after a
    /// build; a mismatch indicates a lost or double-counted point.
    pub fn total(&self) -> u64 {
        self.cells.iter().sum()
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Elementwise-add `other` into `self`, draining `other` to zero so
    /// repeated up-tree merges never double count. The add is divided
    /// recursively by cell count and parallelized; `cutoff` is the cell
    /// count at or below which a half is merged sequentially.
    ///
    /// Safe without locks: both grids are private to their producing
    /// subtrees until merge time, and the recursion hands each task a
    /// disjoint pair of sub-slices.
    pub fn merge_from(&mut self, other: &mut Grid, cutoff: usize) {
        assert_eq!(
            (self.columns, self.rows),
            (other.columns, other.rows),
            "cannot merge grids of different dimensions"
        );
        merge_slices(&mut self.cells, &mut other.cells, cutoff.max(1));
    }

    /// Convert, in place, into the summed-area form.
    ///
    /// First row and first column become running sums along their axis;
    /// every other cell becomes `raw + left + below - diagonal`. Inherently
    /// sequential in the general recurrence; correctness, not speed, is the
    /// contract here. Consuming `self` makes apply-exactly-once structural.
    pub fn into_prefix(mut self) -> PrefixGrid {
        let (columns, rows) = (self.columns, self.rows);
        for x in 1..columns {
            self.cells[x * rows] += self.cells[(x - 1) * rows];
        }
        for y in 1..rows {
            self.cells[y] += self.cells[y - 1];
        }
        for x in 1..columns {
            for y in 1..rows {
                let sum = self.cells[(x - 1) * rows + y] + self.cells[x * rows + y - 1]
                    - self.cells[(x - 1) * rows + y - 1];
                self.cells[x * rows + y] += sum;
            }
        }
        PrefixGrid {
            columns,
            rows,
            cells: self.cells,
        }
    }
}

fn merge_slices(left: &mut [u64], right: &mut [u64], cutoff: usize) {
    debug_assert_eq!(left.len(), right.len());
    if left.len() <= cutoff {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            *l += *r;
            *r = 0;
        }
    } else {
        let mid = left.len() / 2;
        let (left_lo, left_hi) = left.split_at_mut(mid);
        let (right_lo, right_hi) = right.split_at_mut(mid);
        rayon::join(
            || merge_slices(left_lo, right_lo, cutoff),
            || merge_slices(left_hi, right_hi, cutoff),
        );
    }
}

/// Cumulative population from the southwest corner through each cell,
/// enabling O(1) rectangle sums via inclusion-exclusion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixGrid {
    columns: usize,
    rows: usize,
    cells: Vec<u64>,
}

impl PrefixGrid {
    pub fn get(&self, x: usize, y: usize) -> u64 {
        debug_assert!(x < self.columns && y < self.rows);
        self.cells[x * self.rows + y]
    }

    /// Population of the 0-based, inclusive cell rectangle
    /// `[x0, x1] x [y0, y1]` by inclusion-exclusion, with out-of-range
    /// (negative) corner indices treated as zero.
    pub fn rect_sum(&self, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        debug_assert!(x0 <= x1 && y0 <= y1);
        let whole = self.get(x1, y1);
        let west = if x0 > 0 { self.get(x0 - 1, y1) } else { 0 };
        let south = if y0 > 0 { self.get(x1, y0 - 1) } else { 0 };
        let overlap = if x0 > 0 && y0 > 0 {
            self.get(x0 - 1, y0 - 1)
        } else {
            0
        };
        whole + overlap - west - south
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }
}
