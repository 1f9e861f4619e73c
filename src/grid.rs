use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single (row, col) cell address with no attached data.
/// Signed so a step off the edge is still representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridLocation {
    pub row: i32,
    pub col: i32,
}

impl GridLocation {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// True iff `0 <= row < max_row` and `0 <= col < max_col`.
    #[inline]
    pub fn in_bounds(&self, max_row: usize, max_col: usize) -> bool {
        self.in_bounds_from(max_row as i64, max_col as i64, 0, 0)
    }

    /// Half-open bounds check: `[min_row, max_row) x [min_col, max_col)`.
    /// Maximums come first, as in `in_bounds`.
    #[inline]
    pub fn in_bounds_from(&self, max_row: i64, max_col: i64, min_row: i64, min_col: i64) -> bool {
        let (r, c) = (self.row as i64, self.col as i64);
        min_row <= r && r < max_row && min_col <= c && c < max_col
    }

    #[inline]
    pub fn offset(&self, dr: i32, dc: i32) -> Self {
        Self::new(self.row.saturating_add(dr), self.col.saturating_add(dc))
    }
}

impl fmt::Display for GridLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Row-major flat grid. Rectangular by construction.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Grid<T> {
    pub data: Vec<T>,
    pub rows: usize,
    pub cols: usize,
}

impl<T: Copy + Default> Grid<T> {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: vec![T::default(); rows * cols],
            rows,
            cols,
        }
    }

    /// Build from nested rows, rejecting empty or ragged input.
    pub fn from_rows(rows: Vec<Vec<T>>) -> Result<Self> {
        let cols = rows.first().map_or(0, Vec::len);
        if cols == 0 {
            return Err(Error::EmptyGrid);
        }
        let n_rows = rows.len();
        let mut data = Vec::with_capacity(n_rows * cols);
        for (r, row) in rows.into_iter().enumerate() {
            if row.len() != cols {
                return Err(Error::NotRectangular {
                    row: r,
                    expected: cols,
                    found: row.len(),
                });
            }
            data.extend(row);
        }
        Ok(Self {
            data,
            rows: n_rows,
            cols,
        })
    }

    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.rows && col < self.cols);
        row * self.cols + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, v: T) {
        let i = self.idx(row, col);
        self.data[i] = v;
    }

    #[inline]
    pub fn contains(&self, loc: GridLocation) -> bool {
        loc.in_bounds(self.rows, self.cols)
    }

    /// Flat index of an in-bounds location.
    #[inline]
    pub fn index_of(&self, loc: GridLocation) -> Option<usize> {
        self.contains(loc)
            .then(|| self.idx(loc.row as usize, loc.col as usize))
    }

    pub fn get_at(&self, loc: GridLocation) -> Option<T> {
        self.index_of(loc).map(|i| self.data[i])
    }

    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.cols).map(<[T]>::to_vec).collect()
    }
}

/// 4-connected in-bounds neighbors, in the order row-1, row+1, col-1, col+1.
pub fn neighbors4(
    center: GridLocation,
    rows: usize,
    cols: usize,
) -> impl Iterator<Item = GridLocation> {
    let offsets: [(i32, i32); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
    let mut out = [GridLocation::new(0, 0); 4];
    let mut n = 0;
    for (dr, dc) in offsets {
        let pos = center.offset(dr, dc);
        if pos.in_bounds(rows, cols) {
            out[n] = pos;
            n += 1;
        }
    }
    out.into_iter().take(n)
}
