//! Error types for popgrid.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PopGridError>;

/// All errors the engine can surface to a caller.
///
/// The variants fall into three groups: malformed input (`Io`, `Parse`),
/// precondition violations rejected before any computation runs
/// (`EmptyPointSet`, `InvalidInput`, `InvalidQuery`), and misuse of the
/// engine's build-once/query-many lifecycle (`NotReady`, `AlreadyBuilt`).
#[derive(Error, Debug)]
pub enum PopGridError {
    /// Error reading the input file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A record in the input did not match the expected format. No partial
    /// point set is produced from a source that fails to parse.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// The point set (or the requested index range over it) is empty.
    /// Extent reduction requires at least one point.
    #[error("point set is empty; at least one point is required")]
    EmptyPointSet,

    /// Invalid build parameters or point data (non-positive grid dimensions,
    /// non-finite coordinates, out-of-bounds index ranges).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The query rectangle is out of range or inverted.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A query was issued before the engine reached the `Ready` state.
    #[error("engine has not been built; call build() before querying")]
    NotReady,

    /// A second build was requested. The engine is build-once/query-many;
    /// rebuilding requires constructing a new engine.
    #[error("engine is already built; construct a new engine to rebuild")]
    AlreadyBuilt,
}
