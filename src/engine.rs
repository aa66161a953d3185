//! The query engine: build-once, query-many orchestration.
//!
//! A [`QueryEngine`] owns the point set and an explicit configuration, and
//! moves through `Unbuilt -> Building -> Ready`. A single build request
//! wires extent reduction, geometry derivation, the chosen grid builder,
//! and the summed-area transform; after that the engine serves repeated
//! rectangle queries against the frozen prefix grid. There is no
//! `Ready -> Building` transition: rebuilding means constructing a new
//! engine.

use crate::compute::build::build_grid;
use crate::compute::extent::Extent;
use crate::compute::geometry::GridGeometry;
use crate::compute::grid::PrefixGrid;
use crate::config::{BuildStrategy, Config};
use crate::error::{PopGridError, Result};
use crate::points::PointSet;
use crate::query::{QueryAnswer, QueryRect, grid_population, scan_population};
use std::time::Instant;

/// Externally observable engine state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    /// No build has been requested yet.
    Unbuilt,
    /// A build was started; if it failed, the engine stays here and keeps
    /// refusing queries.
    Building,
    /// Build and transform completed; queries are accepted.
    Ready,
}

struct Built {
    extent: Extent,
    geometry: GridGeometry,
    prefix: PrefixGrid,
}

enum State {
    Unbuilt,
    Building,
    Ready(Built),
}

/// Spatial aggregation engine answering rectangular population queries.
///
/// # Examples
///
/// ```rust
/// use popgrid::{BuildStrategy, CensusPoint, Config, PointSet, QueryEngine};
///
/// let points = PointSet::new(vec![
///     CensusPoint::new(10, 0.0, 0.0),
///     CensusPoint::new(20, 1.0, 0.0),
///     CensusPoint::new(30, 0.0, 1.0),
/// ])?;
/// let mut engine = QueryEngine::new(points, Config::default());
/// engine.build(2, 2, BuildStrategy::ForkJoin)?;
///
/// let whole = engine.query(1, 1, 2, 2)?;
/// assert_eq!(whole.population, 60);
/// assert_eq!(whole.percent, 100.00);
/// # Ok::<(), popgrid::PopGridError>(())
/// ```
pub struct QueryEngine {
    points: PointSet,
    config: Config,
    state: State,
}

impl QueryEngine {
    /// Create an engine in the `Unbuilt` state.
    pub fn new(points: PointSet, config: Config) -> Self {
        Self {
            points,
            config,
            state: State::Unbuilt,
        }
    }

    /// Preprocess the point set into a queryable prefix grid.
    ///
    /// Rejected with [`PopGridError::AlreadyBuilt`] unless the engine is
    /// `Unbuilt`. Invalid parameters (non-positive dimensions) are rejected
    /// before any computation runs and before the engine leaves `Unbuilt`,
    /// so a corrected retry is still accepted. A failure mid-computation
    /// (empty point set) leaves the engine in `Building`, refusing both
    /// queries and further builds; there is no partial-success mode.
    pub fn build(&mut self, columns: usize, rows: usize, strategy: BuildStrategy) -> Result<()> {
        match self.state {
            State::Unbuilt => {}
            State::Building | State::Ready(_) => return Err(PopGridError::AlreadyBuilt),
        }
        if columns == 0 || rows == 0 {
            return Err(PopGridError::InvalidInput(format!(
                "grid dimensions must be positive, got {}x{}",
                columns, rows
            )));
        }
        self.state = State::Building;
        let built = self.run_build(columns, rows, strategy)?;
        self.state = State::Ready(built);
        Ok(())
    }

    fn run_build(&self, columns: usize, rows: usize, strategy: BuildStrategy) -> Result<Built> {
        let started = Instant::now();
        let extent = match strategy {
            BuildStrategy::Sequential => {
                Extent::reduce_sequential(&self.points, 0..self.points.len())?
            }
            _ => Extent::reduce(&self.points, 0..self.points.len(), self.config.extent_cutoff)?,
        };
        let geometry = GridGeometry::derive(&extent, columns, rows)?;
        let grid = build_grid(&self.points, &geometry, strategy, &self.config);
        // A total that disagrees with the independently reduced extent means
        // a builder lost or double-counted a point.
        debug_assert_eq!(grid.total(), extent.total_population());
        let prefix = grid.into_prefix();
        log::debug!(
            "built {}x{} grid from {} points with {:?} in {:?}",
            columns,
            rows,
            self.points.len(),
            strategy,
            started.elapsed()
        );
        Ok(Built {
            extent,
            geometry,
            prefix,
        })
    }

    fn ready(&self) -> Result<&Built> {
        match &self.state {
            State::Ready(built) => Ok(built),
            _ => Err(PopGridError::NotReady),
        }
    }

    /// Answer a rectangle query in O(1) via the prefix grid.
    ///
    /// Coordinates are 1-based and inclusive; `(1, 1)` is the southwest
    /// corner. Only accepted in the `Ready` state.
    pub fn query(&self, w: usize, s: usize, e: usize, n: usize) -> Result<QueryAnswer> {
        let built = self.ready()?;
        let rect = QueryRect::new(w, s, e, n, &built.geometry)?;
        let population = grid_population(&built.prefix, &rect);
        Ok(QueryAnswer::new(population, built.extent.total_population()))
    }

    /// Answer a rectangle query by direct scan over the original point set.
    ///
    /// The fallback path: returns the same numeric answer as
    /// [`QueryEngine::query`] for any valid rectangle.
    pub fn query_scan(&self, w: usize, s: usize, e: usize, n: usize) -> Result<QueryAnswer> {
        let built = self.ready()?;
        let rect = QueryRect::new(w, s, e, n, &built.geometry)?;
        let population = scan_population(
            &self.points,
            &built.extent,
            &built.geometry,
            &rect,
            self.config.extent_cutoff,
        );
        Ok(QueryAnswer::new(population, built.extent.total_population()))
    }

    /// The reduced extent. `Ready` only.
    pub fn extent(&self) -> Result<&Extent> {
        Ok(&self.ready()?.extent)
    }

    /// The derived grid geometry. `Ready` only.
    pub fn geometry(&self) -> Result<&GridGeometry> {
        Ok(&self.ready()?.geometry)
    }

    pub fn state(&self) -> EngineState {
        match self.state {
            State::Unbuilt => EngineState::Unbuilt,
            State::Building => EngineState::Building,
            State::Ready(_) => EngineState::Ready,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn points(&self) -> &PointSet {
        &self.points
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::CensusPoint;

    fn sample_engine() -> QueryEngine {
        let points = PointSet::new(vec![
            CensusPoint::new(10, 0.0, 0.0),
            CensusPoint::new(20, 1.0, 0.0),
            CensusPoint::new(30, 0.0, 1.0),
        ])
        .unwrap();
        QueryEngine::new(points, Config::default())
    }

    #[test]
    fn test_query_before_build_is_rejected() {
        let engine = sample_engine();
        assert_eq!(engine.state(), EngineState::Unbuilt);
        assert!(matches!(
            engine.query(1, 1, 1, 1),
            Err(PopGridError::NotReady)
        ));
        assert!(matches!(engine.extent(), Err(PopGridError::NotReady)));
    }

    #[test]
    fn test_build_then_query() {
        let mut engine = sample_engine();
        engine.build(2, 2, BuildStrategy::Sequential).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);

        let answer = engine.query(1, 1, 2, 2).unwrap();
        assert_eq!(answer.population, 60);
        assert_eq!(answer.percent, 100.00);

        let answer = engine.query(1, 1, 1, 1).unwrap();
        assert_eq!(answer.population, 10);
        assert_eq!(answer.percent, 16.67);
    }

    #[test]
    fn test_rebuild_is_rejected() {
        let mut engine = sample_engine();
        engine.build(2, 2, BuildStrategy::ForkJoin).unwrap();
        assert!(matches!(
            engine.build(3, 3, BuildStrategy::Sequential),
            Err(PopGridError::AlreadyBuilt)
        ));
    }

    #[test]
    fn test_failed_build_leaves_engine_unready() {
        let points = PointSet::new(Vec::new()).unwrap();
        let mut engine = QueryEngine::new(points, Config::default());
        assert!(matches!(
            engine.build(2, 2, BuildStrategy::ForkJoin),
            Err(PopGridError::EmptyPointSet)
        ));
        assert_eq!(engine.state(), EngineState::Building);
        assert!(matches!(
            engine.query(1, 1, 1, 1),
            Err(PopGridError::NotReady)
        ));
        // And a second attempt is not silently accepted either.
        assert!(matches!(
            engine.build(2, 2, BuildStrategy::ForkJoin),
            Err(PopGridError::AlreadyBuilt)
        ));
    }

    #[test]
    fn test_invalid_dimensions_rejected_before_computation() {
        let mut engine = sample_engine();
        assert!(matches!(
            engine.build(0, 2, BuildStrategy::Sequential),
            Err(PopGridError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.build(2, 0, BuildStrategy::ForkJoin),
            Err(PopGridError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_parameter_error_leaves_engine_reusable() {
        // A dimension typo must not consume the build-once budget: the
        // engine stays Unbuilt and a corrected build is accepted.
        let mut engine = sample_engine();
        assert!(matches!(
            engine.build(0, 2, BuildStrategy::Sequential),
            Err(PopGridError::InvalidInput(_))
        ));
        assert_eq!(engine.state(), EngineState::Unbuilt);

        engine.build(2, 2, BuildStrategy::Sequential).unwrap();
        assert_eq!(engine.state(), EngineState::Ready);
        assert_eq!(engine.query(1, 1, 2, 2).unwrap().population, 60);
    }

    #[test]
    fn test_invalid_rectangle_rejected() {
        let mut engine = sample_engine();
        engine.build(2, 2, BuildStrategy::LockPartitioned).unwrap();
        assert!(matches!(
            engine.query(2, 1, 1, 1),
            Err(PopGridError::InvalidQuery(_))
        ));
    }
}
