// src/aggregate.rs

use rayon::prelude::*;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::error::{BenchError, Result};
use crate::frame::{Row, RowView, TabularView};
use crate::session::Session;

/// Which collection the mean was computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    DataFrame,
    Rdd,
}

impl Strategy {
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::DataFrame => "DataFrame",
            Strategy::Rdd => "RDD",
        }
    }

    /// Plural form used in the report lines.
    pub fn plural(&self) -> &'static str {
        match self {
            Strategy::DataFrame => "DataFrames",
            Strategy::Rdd => "RDDs",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A timed mean, tagged with the strategy that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub strategy: Strategy,
    pub mean: f64,
    pub elapsed: Duration,
}

impl Measurement {
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

fn divide(total: f64, rows: usize, column: &str) -> Result<f64> {
    if rows == 0 {
        return Err(BenchError::DivisionByZero {
            column: column.to_string(),
        });
    }
    Ok(total / rows as f64)
}

/// Mean of `column` with columnar kernels: a sum pass, a count pass, divide.
pub fn mean_tabular(session: &Session, view: &TabularView, column: &str) -> Result<Measurement> {
    session.install(|| {
        let tick = Instant::now();
        let total = view.sum(column)?;
        let rows = view.count(column)?;
        let mean = divide(total, rows, column)?;
        let elapsed = tick.elapsed();

        debug!(column, rows, mean, elapsed = ?elapsed, "tabular mean");
        Ok(Measurement {
            strategy: Strategy::DataFrame,
            mean,
            elapsed,
        })
    })
}

/// Mean of `column` with a per-row map and a reduce, plus a separate count pass.
pub fn mean_rows(session: &Session, view: &RowView, column: &str) -> Result<Measurement> {
    session.install(|| {
        let tick = Instant::now();
        let total = view
            .rows()
            .par_iter()
            .enumerate()
            .map(|(idx, row)| field_as_f64(row, idx, column))
            .try_reduce(|| 0.0, |a, b| Ok(a + b))?;
        let rows: usize = view.rows().par_iter().map(|_| 1usize).sum();
        let mean = divide(total, rows, column)?;
        let elapsed = tick.elapsed();

        debug!(column, rows, mean, elapsed = ?elapsed, "row mean");
        Ok(Measurement {
            strategy: Strategy::Rdd,
            mean,
            elapsed,
        })
    })
}

/// Nulls contribute nothing, same as the columnar sum.
fn field_as_f64(row: &Row, idx: usize, column: &str) -> Result<f64> {
    let value = row
        .get(column)
        .ok_or_else(|| BenchError::MissingColumn(column.to_string()))?;
    match value.to_f64() {
        Ok(v) => Ok(v.unwrap_or(0.0)),
        Err(text) => Err(BenchError::Coercion {
            column: column.to_string(),
            row: idx,
            value: text,
        }),
    }
}
