// src/report.rs

use std::fmt;
use std::io::Write;
use std::time::Duration;

use crate::aggregate::Measurement;

/// Largest percentage reported while the fastest run still took some time.
const MAX_SPEEDUP_PERCENT: f64 = 99.99;

/// Result of comparing two measurements by elapsed time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison {
    pub fastest: Measurement,
    pub slowest: Measurement,
    /// `(1 - fastest/slowest) * 100`, rounded to two decimals.
    pub percent: f64,
}

/// Compare two measurements. On an exact tie `first` is reported as fastest.
pub fn compare(first: Measurement, second: Measurement) -> Comparison {
    let (fastest, slowest) = if second.elapsed < first.elapsed {
        (second, first)
    } else {
        (first, second)
    };
    Comparison {
        fastest,
        slowest,
        percent: speedup_percent(fastest.elapsed, slowest.elapsed),
    }
}

pub fn speedup_percent(fastest: Duration, slowest: Duration) -> f64 {
    if slowest.is_zero() || fastest >= slowest {
        return 0.0;
    }
    let raw = (1.0 - fastest.as_secs_f64() / slowest.as_secs_f64()) * 100.0;
    let rounded = (raw * 100.0).round() / 100.0;
    if !fastest.is_zero() && rounded >= 100.0 {
        MAX_SPEEDUP_PERCENT
    } else {
        rounded
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "The fastest method was {}, which was {:?}% faster than {}",
            self.fastest.strategy, self.percent, self.slowest.strategy
        )
    }
}

/// Both measurements and their comparison, ready to print. Floats are
/// written in their shortest round-trip form with a trailing `.0` when
/// integral (`3.0`, `75.0%`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub dataframe: Measurement,
    pub rdd: Measurement,
    pub comparison: Comparison,
}

impl Report {
    pub fn new(dataframe: Measurement, rdd: Measurement) -> Self {
        Report {
            dataframe,
            rdd,
            comparison: compare(dataframe, rdd),
        }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        for m in [&self.dataframe, &self.rdd] {
            writeln!(
                out,
                "Average cost of borrowing using {}: {:?}",
                m.strategy.plural(),
                m.mean
            )?;
            writeln!(
                out,
                "Time taken using {}: {:?} seconds",
                m.strategy.plural(),
                m.elapsed_secs()
            )?;
        }
        writeln!(out, "{}", self.comparison)?;
        out.flush()
    }
}
