//! Times a columnar mean against a row-oriented map/reduce mean over the
//! ECB household borrowing-cost series.

pub mod aggregate;
pub mod bench;
pub mod config;
pub mod error;
pub mod fetch;
pub mod frame;
pub mod report;
pub mod session;

pub use error::{BenchError, Result};
