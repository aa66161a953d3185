//! Compute layer: the numeric kernels behind the query engine.
//!
//! This module separates the aggregation algorithms from the engine's
//! orchestration concerns. It provides:
//! - Parallel extent reduction
//! - Grid geometry derivation and point-to-cell mapping
//! - Grid construction strategies and the summed-area transform

pub mod build;
pub mod extent;
pub mod geometry;
pub mod grid;
