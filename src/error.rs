//! Error types for the Kontos library.
//!
//! All errors are represented by the [`KontosError`] enum. Validation and
//! configuration problems are reported before evaluation starts; errors
//! raised during evaluation are index-access or cancellation failures.
//!
//! # Examples
//!
//! ```
//! use kontos::error::{KontosError, Result};
//!
//! fn example_operation() -> Result<()> {
//!     Err(KontosError::query("NEAR operator requires at least 2 arguments"))
//! }
//!
//! match example_operation() {
//!     Ok(_) => println!("Success"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use anyhow;
use thiserror::Error;

/// The main error type for Kontos operations.
#[derive(Error, Debug)]
pub enum KontosError {
    /// I/O errors (index access faults, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors
    #[error("Index error: {0}")]
    Index(String),

    /// Query-related errors (invalid operator trees, etc.)
    #[error("Query error: {0}")]
    Query(String),

    /// Retrieval model configuration errors
    #[error("Model error: {0}")]
    Model(String),

    /// Operation cancelled
    #[error("Operation cancelled: {0}")]
    OperationCancelled(String),

    /// Invalid operation
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with KontosError.
pub type Result<T> = std::result::Result<T, KontosError>;

impl KontosError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        KontosError::Index(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        KontosError::Query(msg.into())
    }

    /// Create a new model configuration error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        KontosError::Model(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        KontosError::Other(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        KontosError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        KontosError::Other(format!("Internal error: {}", msg.into()))
    }

    /// Create a new cancelled error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        KontosError::OperationCancelled(msg.into())
    }
}
