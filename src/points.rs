//! Point records and the immutable point set the engine operates on.

use crate::error::{PopGridError, Result};
use geo::Point;

/// One geo-tagged population record.
///
/// Immutable once constructed. The location follows the `geo` convention of
/// x = longitude, y = latitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CensusPoint {
    population: u64,
    location: Point,
}

impl CensusPoint {
    /// Create a record from a population count and lon/lat coordinates.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use popgrid::CensusPoint;
    ///
    /// let seattle = CensusPoint::new(737_015, -122.3321, 47.6062);
    /// assert_eq!(seattle.population(), 737_015);
    /// assert_eq!(seattle.lat(), 47.6062);
    /// ```
    pub fn new(population: u64, lon: f64, lat: f64) -> Self {
        Self {
            population,
            location: Point::new(lon, lat),
        }
    }

    pub fn population(&self) -> u64 {
        self.population
    }

    pub fn location(&self) -> Point {
        self.location
    }

    pub fn lon(&self) -> f64 {
        self.location.x()
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }
}

/// An immutable, randomly-indexable ordered sequence of [`CensusPoint`]s.
///
/// Built once, read-only thereafter. Reducer and builder tasks share it by
/// reference; no task ever mutates it, so concurrent reads need no
/// synchronization.
#[derive(Debug, Clone)]
pub struct PointSet {
    points: Vec<CensusPoint>,
}

impl PointSet {
    /// Construct a point set, rejecting records with non-finite coordinates.
    ///
    /// An empty vector is accepted here; emptiness is rejected later, at the
    /// first operation that actually requires a point (extent reduction).
    pub fn new(points: Vec<CensusPoint>) -> Result<Self> {
        for (i, point) in points.iter().enumerate() {
            if !point.lon().is_finite() || !point.lat().is_finite() {
                return Err(PopGridError::InvalidInput(format!(
                    "point {} has non-finite coordinates ({}, {})",
                    i,
                    point.lon(),
                    point.lat()
                )));
            }
        }
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CensusPoint> {
        self.points.get(index)
    }

    pub fn as_slice(&self) -> &[CensusPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CensusPoint> {
        self.points.iter()
    }
}
