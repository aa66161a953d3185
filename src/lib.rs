//! Parallel summed-area-table engine for rectangular population queries
//! over geo-tagged point records.
//!
//! The engine partitions the bounding box of a point set into a
//! `columns x rows` grid, bucketizes every point into its cell (with a
//! choice of sequential, fork/join, or lock-partitioned strategies), and
//! converts the per-cell totals into a prefix grid so any axis-aligned
//! rectangle of cells can be summed in O(1) by inclusion-exclusion.
//!
//! ```rust
//! use popgrid::{BuildStrategy, CensusPoint, Config, PointSet, QueryEngine};
//!
//! let points = PointSet::new(vec![
//!     CensusPoint::new(10, 0.0, 0.0),
//!     CensusPoint::new(20, 1.0, 0.0),
//!     CensusPoint::new(30, 0.0, 1.0),
//! ])?;
//!
//! let mut engine = QueryEngine::new(points, Config::default());
//! engine.build(2, 2, BuildStrategy::ForkJoin)?;
//!
//! let answer = engine.query(1, 1, 1, 1)?;
//! assert_eq!(answer.population, 10);
//! assert_eq!(answer.percent, 16.67);
//! # Ok::<(), popgrid::PopGridError>(())
//! ```

pub mod compute;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod points;
pub mod query;

pub use config::{BuildStrategy, Config};
pub use engine::{EngineState, QueryEngine};
pub use error::{PopGridError, Result};

pub use compute::build::{build_fork_join, build_lock_partitioned, build_sequential};
pub use compute::extent::Extent;
pub use compute::geometry::GridGeometry;
pub use compute::grid::{Grid, PrefixGrid};

pub use points::{CensusPoint, PointSet};
pub use query::{QueryAnswer, QueryRect, grid_population, scan_population};

pub use loader::{load_csv, parse_records};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{BuildStrategy, Config, PopGridError, QueryEngine, Result};

    pub use crate::{CensusPoint, PointSet};

    pub use crate::{Extent, GridGeometry, QueryAnswer};

    pub use crate::load_csv;
}
