//! Rectangle queries: validation, the O(1) prefix-grid path, and the
//! direct-scan fallback over the original point set.

use crate::compute::extent::Extent;
use crate::compute::geometry::GridGeometry;
use crate::compute::grid::PrefixGrid;
use crate::error::{PopGridError, Result};
use crate::points::{CensusPoint, PointSet};

/// A validated query rectangle in 1-based, inclusive grid coordinates.
///
/// `(1, 1)` is the grid's southwest corner. Instances are transient,
/// constructed per query and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryRect {
    w: usize,
    s: usize,
    e: usize,
    n: usize,
}

impl QueryRect {
    /// Validate `1 <= w <= e <= columns` and `1 <= s <= n <= rows` against
    /// the grid's geometry. Violations are rejected here, never clamped.
    pub fn new(w: usize, s: usize, e: usize, n: usize, geometry: &GridGeometry) -> Result<Self> {
        if w < 1 || s < 1 || e > geometry.columns() || n > geometry.rows() || e < w || n < s {
            return Err(PopGridError::InvalidQuery(format!(
                "rectangle (w={}, s={}, e={}, n={}) is not within a {}x{} grid or is inverted",
                w,
                s,
                e,
                n,
                geometry.columns(),
                geometry.rows()
            )));
        }
        Ok(Self { w, s, e, n })
    }

    pub fn west(&self) -> usize {
        self.w
    }

    pub fn south(&self) -> usize {
        self.s
    }

    pub fn east(&self) -> usize {
        self.e
    }

    pub fn north(&self) -> usize {
        self.n
    }
}

/// The result of a rectangle query: absolute population and its share of
/// the total, rounded to two decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QueryAnswer {
    pub population: u64,
    pub percent: f64,
}

impl QueryAnswer {
    pub(crate) fn new(population: u64, total_population: u64) -> Self {
        let percent = if total_population == 0 {
            0.0
        } else {
            round2(100.0 * population as f64 / total_population as f64)
        };
        Self {
            population,
            percent,
        }
    }
}

/// Round half-up to two decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// O(1) population lookup via inclusion-exclusion over the prefix grid.
pub fn grid_population(prefix: &PrefixGrid, rect: &QueryRect) -> u64 {
    prefix.rect_sum(rect.w - 1, rect.s - 1, rect.e - 1, rect.n - 1)
}

/// Direct-scan fallback: a filtered fork/join reduction over the original
/// point set, using latitude/longitude bounds derived from the rectangle.
///
/// Must return the same population as [`grid_population`] for any valid
/// rectangle. When the rectangle touches the grid's north or east edge the
/// upper bound is nudged outward by one ULP so points exactly on the
/// extent's boundary fall inside the last row/column instead of being
/// excluded by the strict `<` comparison.
pub fn scan_population(
    points: &PointSet,
    extent: &Extent,
    geometry: &GridGeometry,
    rect: &QueryRect,
    cutoff: usize,
) -> u64 {
    let min_lon = geometry.origin_lon() + geometry.cell_width() * (rect.w - 1) as f64;
    let min_lat = geometry.origin_lat() + geometry.cell_height() * (rect.s - 1) as f64;
    let max_lon = if rect.e == geometry.columns() {
        extent.max_lon().next_up()
    } else {
        geometry.origin_lon() + geometry.cell_width() * rect.e as f64
    };
    let max_lat = if rect.n == geometry.rows() {
        extent.max_lat().next_up()
    } else {
        geometry.origin_lat() + geometry.cell_height() * rect.n as f64
    };

    let bounds = ScanBounds {
        min_lon,
        min_lat,
        max_lon,
        max_lat,
    };
    scan_range(points.as_slice(), &bounds, cutoff.max(1))
}

#[derive(Debug, Clone, Copy)]
struct ScanBounds {
    min_lon: f64,
    min_lat: f64,
    max_lon: f64,
    max_lat: f64,
}

impl ScanBounds {
    fn contains(&self, point: &CensusPoint) -> bool {
        point.lon() >= self.min_lon
            && point.lat() >= self.min_lat
            && point.lon() < self.max_lon
            && point.lat() < self.max_lat
    }
}

fn scan_range(points: &[CensusPoint], bounds: &ScanBounds, cutoff: usize) -> u64 {
    if points.len() <= cutoff {
        return points
            .iter()
            .filter(|point| bounds.contains(point))
            .map(CensusPoint::population)
            .sum();
    }
    let (left, right) = points.split_at(points.len() / 2);
    let (left_sum, right_sum) = rayon::join(
        || scan_range(left, bounds, cutoff),
        || scan_range(right, bounds, cutoff),
    );
    left_sum + right_sum
}
