//! Engine configuration and build-strategy selection.
//!
//! The configuration is designed to be easily serializable and loadable
//! from JSON or other formats while keeping complexity minimal. All fields
//! have sensible defaults, so `Config::default()` is a working starting
//! point.

use serde::{Deserialize, Serialize};

/// Grid construction strategy.
///
/// All three strategies are required to produce identical raw grids; they
/// differ only in how the work is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BuildStrategy {
    /// Single pass over the point set, direct accumulation.
    Sequential,
    /// Divide-and-conquer over the point range; each branch fills a private
    /// grid and sibling grids are merged by a parallel elementwise add.
    #[default]
    ForkJoin,
    /// A fixed pool of worker threads writing into one shared grid guarded
    /// by a per-cell lock table.
    LockPartitioned,
}

/// Tuning knobs for the preprocessing pass.
///
/// The cutoffs bound task-creation overhead relative to useful work per
/// leaf; they never affect results, only parallelism granularity.
///
/// # Example
///
/// ```rust
/// use popgrid::Config;
///
/// let config = Config::default();
/// assert_eq!(config.extent_cutoff, 1000);
///
/// // Load from JSON; missing fields fall back to defaults.
/// let json = r#"{ "build_cutoff": 10000, "worker_threads": 8 }"#;
/// let config: Config = serde_json::from_str(json).unwrap();
/// assert_eq!(config.build_cutoff, 10000);
/// assert_eq!(config.merge_cutoff, 5000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Range length at or below which extent reduction scans linearly.
    #[serde(default = "Config::default_extent_cutoff")]
    pub extent_cutoff: usize,

    /// Point-range length at or below which the fork/join builder fills a
    /// leaf grid sequentially.
    #[serde(default = "Config::default_build_cutoff")]
    pub build_cutoff: usize,

    /// Cell count at or below which a grid merge runs sequentially.
    #[serde(default = "Config::default_merge_cutoff")]
    pub merge_cutoff: usize,

    /// Number of worker threads for the lock-partitioned build.
    #[serde(default = "Config::default_worker_threads")]
    pub worker_threads: usize,
}

impl Config {
    const fn default_extent_cutoff() -> usize {
        1000
    }

    const fn default_build_cutoff() -> usize {
        5000
    }

    const fn default_merge_cutoff() -> usize {
        5000
    }

    const fn default_worker_threads() -> usize {
        4
    }

    pub fn with_extent_cutoff(mut self, cutoff: usize) -> Self {
        self.extent_cutoff = cutoff;
        self
    }

    pub fn with_build_cutoff(mut self, cutoff: usize) -> Self {
        self.build_cutoff = cutoff;
        self
    }

    pub fn with_merge_cutoff(mut self, cutoff: usize) -> Self {
        self.merge_cutoff = cutoff;
        self
    }

    pub fn with_worker_threads(mut self, workers: usize) -> Self {
        self.worker_threads = workers;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            extent_cutoff: Self::default_extent_cutoff(),
            build_cutoff: Self::default_build_cutoff(),
            merge_cutoff: Self::default_merge_cutoff(),
            worker_threads: Self::default_worker_threads(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.extent_cutoff, 1000);
        assert_eq!(config.build_cutoff, 5000);
        assert_eq!(config.merge_cutoff, 5000);
        assert_eq!(config.worker_threads, 4);
    }

    #[test]
    fn test_builder_methods() {
        let config = Config::default()
            .with_extent_cutoff(10)
            .with_build_cutoff(20)
            .with_merge_cutoff(30)
            .with_worker_threads(2);
        assert_eq!(config.extent_cutoff, 10);
        assert_eq!(config.build_cutoff, 20);
        assert_eq!(config.merge_cutoff, 30);
        assert_eq!(config.worker_threads, 2);
    }

    #[test]
    fn test_strategy_serde_round_trip() {
        let json = serde_json::to_string(&BuildStrategy::LockPartitioned).unwrap();
        assert_eq!(json, "\"lock_partitioned\"");
        let strategy: BuildStrategy = serde_json::from_str("\"fork_join\"").unwrap();
        assert_eq!(strategy, BuildStrategy::ForkJoin);
    }
}
