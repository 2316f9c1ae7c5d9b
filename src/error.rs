// src/error.rs

use arrow::error::ArrowError;
use thiserror::Error;

/// Everything that can abort a benchmark run.
///
/// None of these are retried; they surface to `main` after the session has
/// been released.
#[derive(Debug, Error)]
pub enum BenchError {
    /// Network failure, timeout, non-success status or an unreadable CSV payload.
    #[error("data access error: {0}")]
    DataAccess(String),

    /// The dataset had no rows, so no mean exists.
    #[error("division by zero: column {column} has no rows")]
    DivisionByZero { column: String },

    /// A cell in the aggregated column is not a number.
    #[error("cannot coerce {value:?} in column {column} (row {row}) to a number")]
    Coercion {
        column: String,
        row: usize,
        value: String,
    },

    #[error("column {0} not found")]
    MissingColumn(String),

    /// Session could not be created (bad worker count, pool spawn failure).
    #[error("session error: {0}")]
    Session(String),

    #[error("arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
