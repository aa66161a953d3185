//! Grid construction strategies.
//!
//! Three interchangeable builders bucketize every point into its cell and
//! accumulate population per cell. All three are required to produce
//! identical raw grids; a grid whose total disagrees with the extent's
//! total population indicates a lost or double-counted point.

use crate::compute::geometry::GridGeometry;
use crate::compute::grid::Grid;
use crate::config::{BuildStrategy, Config};
use crate::points::{CensusPoint, PointSet};
use parking_lot::Mutex;

/// Build a raw grid with the requested strategy.
pub fn build_grid(
    points: &PointSet,
    geometry: &GridGeometry,
    strategy: BuildStrategy,
    config: &Config,
) -> Grid {
    match strategy {
        BuildStrategy::Sequential => build_sequential(points, geometry),
        BuildStrategy::ForkJoin => build_fork_join(points, geometry, config),
        BuildStrategy::LockPartitioned => build_lock_partitioned(points, geometry, config),
    }
}

/// Single pass, direct accumulation.
pub fn build_sequential(points: &PointSet, geometry: &GridGeometry) -> Grid {
    let mut grid = Grid::zeroed(geometry.columns(), geometry.rows());
    fill(&mut grid, points.as_slice(), geometry);
    grid
}

/// Divide-and-conquer over the point range.
///
/// Each branch below the cutoff allocates and fills its own full-size grid,
/// so there is no shared mutable state during the build. Sibling grids are
/// then combined by [`Grid::merge_from`], which drains the right grid into
/// the left; the fork/join happens-before relationship is the only
/// synchronization the merge needs.
pub fn build_fork_join(points: &PointSet, geometry: &GridGeometry, config: &Config) -> Grid {
    build_range(
        points.as_slice(),
        geometry,
        config.build_cutoff.max(1),
        config.merge_cutoff,
    )
}

/// A fixed pool of worker threads scanning disjoint, contiguous slices of
/// the point set and writing into one shared grid under per-cell locks.
///
/// The lock table is allocated up front, one `Mutex<u64>` per cell. Each
/// worker takes the lock for the cell it is about to update immediately
/// before the increment and releases it right after, so lock scope is the
/// single read-modify-write. Fine-grained locking trades memory for reduced
/// contention compared to one global lock.
pub fn build_lock_partitioned(
    points: &PointSet,
    geometry: &GridGeometry,
    config: &Config,
) -> Grid {
    let rows = geometry.rows();
    let cells: Vec<Mutex<u64>> = (0..geometry.cell_count()).map(|_| Mutex::new(0)).collect();

    let workers = config.worker_threads.max(1);
    let chunk = points.len().div_ceil(workers).max(1);
    let cells_ref = &cells;
    std::thread::scope(|scope| {
        for slice in points.as_slice().chunks(chunk) {
            scope.spawn(move || {
                for point in slice {
                    let (x, y) = geometry.cell_of(point);
                    *cells_ref[x * rows + y].lock() += point.population();
                }
            });
        }
    });

    let mut grid = Grid::zeroed(geometry.columns(), geometry.rows());
    for (index, cell) in cells.into_iter().enumerate() {
        let population = cell.into_inner();
        if population > 0 {
            grid.add(index / rows, index % rows, population);
        }
    }
    grid
}

fn fill(grid: &mut Grid, points: &[CensusPoint], geometry: &GridGeometry) {
    for point in points {
        let (x, y) = geometry.cell_of(point);
        grid.add(x, y, point.population());
    }
}

fn build_range(
    points: &[CensusPoint],
    geometry: &GridGeometry,
    point_cutoff: usize,
    merge_cutoff: usize,
) -> Grid {
    if points.len() <= point_cutoff {
        let mut grid = Grid::zeroed(geometry.columns(), geometry.rows());
        fill(&mut grid, points, geometry);
        return grid;
    }
    let (left, right) = points.split_at(points.len() / 2);
    let (mut left_grid, mut right_grid) = rayon::join(
        || build_range(left, geometry, point_cutoff, merge_cutoff),
        || build_range(right, geometry, point_cutoff, merge_cutoff),
    );
    left_grid.merge_from(&mut right_grid, merge_cutoff);
    left_grid
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::extent::Extent;

    fn sample_points() -> PointSet {
        PointSet::new(vec![
            CensusPoint::new(10, 0.0, 0.0),
            CensusPoint::new(20, 1.0, 0.0),
            CensusPoint::new(30, 0.0, 1.0),
        ])
        .unwrap()
    }

    fn sample_geometry(points: &PointSet) -> GridGeometry {
        let extent = Extent::reduce_sequential(points, 0..points.len()).unwrap();
        GridGeometry::derive(&extent, 2, 2).unwrap()
    }

    #[test]
    fn test_sequential_concrete_scenario() {
        let points = sample_points();
        let grid = build_sequential(&points, &sample_geometry(&points));
        assert_eq!(grid.get(0, 0), 10);
        assert_eq!(grid.get(1, 0), 20);
        assert_eq!(grid.get(0, 1), 30);
        assert_eq!(grid.get(1, 1), 0);
    }

    #[test]
    fn test_strategies_agree_and_preserve_total() {
        let points = sample_points();
        let geometry = sample_geometry(&points);
        let extent = Extent::reduce_sequential(&points, 0..points.len()).unwrap();
        // Tiny cutoffs force real task splitting even on three points.
        let config = Config::default()
            .with_build_cutoff(1)
            .with_merge_cutoff(1)
            .with_worker_threads(3);

        let sequential = build_sequential(&points, &geometry);
        let fork_join = build_fork_join(&points, &geometry, &config);
        let locked = build_lock_partitioned(&points, &geometry, &config);

        assert_eq!(sequential, fork_join);
        assert_eq!(sequential, locked);
        assert_eq!(sequential.total(), extent.total_population());
    }

    #[test]
    fn test_edge_points_land_in_last_cells() {
        let points = PointSet::new(vec![
            CensusPoint::new(1, 0.0, 0.0),
            CensusPoint::new(7, 4.0, 3.0),
        ])
        .unwrap();
        let extent = Extent::reduce_sequential(&points, 0..2).unwrap();
        let geometry = GridGeometry::derive(&extent, 4, 3).unwrap();
        let grid = build_sequential(&points, &geometry);
        assert_eq!(grid.get(3, 2), 7);
        assert_eq!(grid.total(), 8);
    }

    #[test]
    fn test_lock_partitioned_more_workers_than_points() {
        let points = sample_points();
        let geometry = sample_geometry(&points);
        let config = Config::default().with_worker_threads(16);
        let grid = build_lock_partitioned(&points, &geometry, &config);
        assert_eq!(grid.total(), 60);
    }
}
