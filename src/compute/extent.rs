//! Bounding extent and total mass of a point set.
//!
//! The reduction is a divide-and-conquer over a contiguous index range:
//! below the sequential cutoff it scans linearly, otherwise it splits at the
//! midpoint and combines the halves. The combine step (min of mins, max of
//! maxes, sum of sums) is associative and commutative, so the split point
//! never affects the result, only parallelism granularity.

use crate::error::{PopGridError, Result};
use crate::points::{CensusPoint, PointSet};
use geo::{Rect, coord};
use std::ops::Range;

/// The bounding rectangle and total population of a point set.
///
/// Produced once per run by the extent reduction; immutable afterward.
/// Invariants: `min_lat() <= max_lat()` and `min_lon() <= max_lon()`
/// (degenerate to equality when all points coincide on an axis), and
/// `total_population()` equals the population sum over the reduced range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    rect: Rect,
    total_population: u64,
}

impl Extent {
    /// Reduce a range sequentially with a single linear scan.
    ///
    /// The range is half-open `[start, end)` and must be non-empty and in
    /// bounds.
    pub fn reduce_sequential(points: &PointSet, range: Range<usize>) -> Result<Self> {
        let slice = checked_slice(points, range)?;
        Ok(scan(slice))
    }

    /// Reduce a range with fork/join divide-and-conquer.
    ///
    /// `cutoff` is the range length at or below which recursion stops and a
    /// linear scan takes over. Any cutoff yields a result bit-identical to
    /// [`Extent::reduce_sequential`].
    ///
    /// # Examples
    ///
    /// ```rust
    /// use popgrid::{CensusPoint, Extent, PointSet};
    ///
    /// let points = PointSet::new(vec![
    ///     CensusPoint::new(10, -74.0, 40.7),
    ///     CensusPoint::new(20, -122.3, 47.6),
    /// ])?;
    /// let extent = Extent::reduce(&points, 0..points.len(), 1000)?;
    /// assert_eq!(extent.total_population(), 30);
    /// assert_eq!(extent.min_lon(), -122.3);
    /// assert_eq!(extent.max_lat(), 47.6);
    /// # Ok::<(), popgrid::PopGridError>(())
    /// ```
    pub fn reduce(points: &PointSet, range: Range<usize>, cutoff: usize) -> Result<Self> {
        let slice = checked_slice(points, range)?;
        Ok(reduce_slice(slice, cutoff.max(1)))
    }

    /// Combine two extents covering disjoint ranges.
    fn combine(&self, other: &Self) -> Self {
        Self {
            rect: Rect::new(
                coord! {
                    x: self.min_lon().min(other.min_lon()),
                    y: self.min_lat().min(other.min_lat()),
                },
                coord! {
                    x: self.max_lon().max(other.max_lon()),
                    y: self.max_lat().max(other.max_lat()),
                },
            ),
            total_population: self.total_population + other.total_population,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn min_lon(&self) -> f64 {
        self.rect.min().x
    }

    pub fn max_lon(&self) -> f64 {
        self.rect.max().x
    }

    pub fn min_lat(&self) -> f64 {
        self.rect.min().y
    }

    pub fn max_lat(&self) -> f64 {
        self.rect.max().y
    }

    pub fn total_population(&self) -> u64 {
        self.total_population
    }
}

fn checked_slice(points: &PointSet, range: Range<usize>) -> Result<&[CensusPoint]> {
    if range.is_empty() {
        return Err(PopGridError::EmptyPointSet);
    }
    points
        .as_slice()
        .get(range.clone())
        .ok_or_else(|| {
            PopGridError::InvalidInput(format!(
                "range {}..{} out of bounds for point set of length {}",
                range.start,
                range.end,
                points.len()
            ))
        })
}

/// Linear scan over a non-empty slice, tracking running min/max/sum.
fn scan(points: &[CensusPoint]) -> Extent {
    let first = &points[0];
    let (mut min_lon, mut max_lon) = (first.lon(), first.lon());
    let (mut min_lat, mut max_lat) = (first.lat(), first.lat());
    let mut total = 0u64;
    for point in points {
        total += point.population();
        min_lon = min_lon.min(point.lon());
        max_lon = max_lon.max(point.lon());
        min_lat = min_lat.min(point.lat());
        max_lat = max_lat.max(point.lat());
    }
    Extent {
        rect: Rect::new(
            coord! { x: min_lon, y: min_lat },
            coord! { x: max_lon, y: max_lat },
        ),
        total_population: total,
    }
}

fn reduce_slice(points: &[CensusPoint], cutoff: usize) -> Extent {
    if points.len() <= cutoff {
        return scan(points);
    }
    let (left, right) = points.split_at(points.len() / 2);
    let (left_extent, right_extent) = rayon::join(
        || reduce_slice(left, cutoff),
        || reduce_slice(right, cutoff),
    );
    left_extent.combine(&right_extent)
}
