//! Grid geometry: cell sizes, origin, and the point-to-cell mapping.

use crate::error::{PopGridError, Result};
use crate::compute::extent::Extent;
use crate::points::CensusPoint;

/// Immutable description of the grid derived once from the extent.
///
/// Every downstream component depends on the boundary-clamping convention in
/// [`GridGeometry::cell_of`]: a point whose floor index equals `columns`
/// (or `rows`) is clamped into the last column (row) rather than dropped, so
/// the easternmost and northernmost points are always counted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    columns: usize,
    rows: usize,
    cell_width: f64,
    cell_height: f64,
    origin_lon: f64,
    origin_lat: f64,
}

impl GridGeometry {
    /// Derive the geometry for a `columns x rows` grid over `extent`.
    ///
    /// Rejects non-positive dimensions. An extent with zero width or height
    /// on an axis (all points share that coordinate) degrades to a minimum
    /// cell size on that axis, so every point floors to index 0 there
    /// instead of dividing by zero.
    pub fn derive(extent: &Extent, columns: usize, rows: usize) -> Result<Self> {
        if columns == 0 || rows == 0 {
            return Err(PopGridError::InvalidInput(format!(
                "grid dimensions must be positive, got {}x{}",
                columns, rows
            )));
        }
        Ok(Self {
            columns,
            rows,
            cell_width: axis_cell_size(extent.min_lon(), extent.max_lon() - extent.min_lon(), columns),
            cell_height: axis_cell_size(extent.min_lat(), extent.max_lat() - extent.min_lat(), rows),
            origin_lon: extent.min_lon(),
            origin_lat: extent.min_lat(),
        })
    }

    /// Map a point to its (column, row) cell.
    ///
    /// The result always lies in `[0, columns) x [0, rows)` for points
    /// inside the extent the geometry was derived from.
    pub fn cell_of(&self, point: &CensusPoint) -> (usize, usize) {
        let x = ((point.lon() - self.origin_lon) / self.cell_width).floor() as usize;
        let y = ((point.lat() - self.origin_lat) / self.cell_height).floor() as usize;
        // The point exactly at the extent's east/north edge floors to
        // columns/rows; clamp it into the last cell.
        (x.min(self.columns - 1), y.min(self.rows - 1))
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    pub fn origin_lon(&self) -> f64 {
        self.origin_lon
    }

    pub fn origin_lat(&self) -> f64 {
        self.origin_lat
    }

    /// Total number of cells.
    pub fn cell_count(&self) -> usize {
        self.columns * self.rows
    }
}

/// Cell size along one axis. A zero-width axis (all points share that
/// coordinate) gets the smallest size still distinguishable from zero at
/// the origin's magnitude, so `origin + size > origin` holds and no
/// division by zero can occur.
fn axis_cell_size(origin: f64, span: f64, divisions: usize) -> f64 {
    let size = (span / divisions as f64).abs();
    if size > 0.0 {
        size
    } else {
        (origin.next_up() - origin).max(f64::MIN_POSITIVE)
    }
}
