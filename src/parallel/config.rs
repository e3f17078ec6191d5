//! Configuration for batch query evaluation.

use serde::{Deserialize, Serialize};

/// Configuration for the batch evaluation engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// Thread pool size for parallel execution.
    /// If None, uses the number of CPU cores.
    pub thread_pool_size: Option<usize>,

    /// Number of result entries kept per query after sorting.
    pub output_length: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            thread_pool_size: None,
            output_length: 100,
        }
    }
}
