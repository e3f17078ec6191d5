//! Parallel evaluation of independent queries.

pub mod config;
pub mod engine;

pub use self::config::BatchConfig;
pub use self::engine::{BatchEngine, BatchQuery, BatchResult, BatchStats};
