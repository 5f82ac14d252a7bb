//! Analysis configuration.

/// Limits and recording switches for one analysis run.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct AnalysisConfig {
    /// Maximum number of errors kept (0 = unlimited). Later errors are
    /// dropped and counted.
    pub error_limit: usize,
    /// Populate the per-node value caches.
    pub record_node_values: bool,
    /// Populate the per-node scope snapshots.
    pub record_scope_snapshots: bool,
    /// Nesting bound for callable bodies evaluated at declaration. Beyond
    /// it the body is skipped and the declared result (or `Any`) is used.
    pub max_call_depth: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            error_limit: 100,
            record_node_values: true,
            record_scope_snapshots: true,
            max_call_depth: 32,
        }
    }
}

impl AnalysisConfig {
    /// No error limit and a generous call depth (for testing).
    pub fn unlimited() -> Self {
        AnalysisConfig {
            error_limit: 0,
            max_call_depth: 256,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_error_limit(mut self, limit: usize) -> Self {
        self.error_limit = limit;
        self
    }

    #[must_use]
    pub fn with_node_values(mut self, record: bool) -> Self {
        self.record_node_values = record;
        self
    }

    #[must_use]
    pub fn with_scope_snapshots(mut self, record: bool) -> Self {
        self.record_scope_snapshots = record;
        self
    }

    #[must_use]
    pub fn with_max_call_depth(mut self, depth: usize) -> Self {
        self.max_call_depth = depth;
        self
    }

    /// Has `count` errors reached the limit?
    pub(crate) fn error_limit_reached(&self, count: usize) -> bool {
        self.error_limit > 0 && count >= self.error_limit
    }
}
