// src/bench.rs

use std::io::Write;
use tracing::{error, info};

use crate::aggregate::{mean_rows, mean_tabular};
use crate::error::Result;
use crate::fetch::{self, CsvSource};
use crate::frame::{RowView, TabularView};
use crate::report::Report;
use crate::session::Session;

/// Run the whole benchmark inside `session`, then stop it whatever happened.
///
/// The report is written to `out` only once both measurements succeeded.
pub async fn execute<S, W>(session: Session, source: &S, column: &str, out: &mut W) -> Result<Report>
where
    S: CsvSource,
    W: Write,
{
    let outcome = run(&session, source, column, out).await;
    if let Err(e) = &outcome {
        error!("benchmark aborted: {}", e);
    }
    session.stop();
    outcome
}

async fn run<S, W>(session: &Session, source: &S, column: &str, out: &mut W) -> Result<Report>
where
    S: CsvSource,
    W: Write,
{
    // ─── 1) acquire ──────────────────────────────────────────────────
    let records = fetch::load(source).await?;
    info!(rows = records.num_rows(), "loaded records");

    // ─── 2) build both views from the same records ───────────────────
    let tabular = TabularView::new(&records)?;
    let rows = RowView::from_records(&records)?;

    // ─── 3) time each strategy, one after the other ──────────────────
    let dataframe = mean_tabular(session, &tabular, column)?;
    info!(mean = dataframe.mean, elapsed = ?dataframe.elapsed, "DataFrame done");
    let rdd = mean_rows(session, &rows, column)?;
    info!(mean = rdd.mean, elapsed = ?rdd.elapsed, "RDD done");

    // ─── 4) compare + report ─────────────────────────────────────────
    let report = Report::new(dataframe, rdd);
    report.write_to(out)?;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::Strategy;
    use crate::error::BenchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,borrowbench=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    struct StaticSource(&'static str);

    impl CsvSource for StaticSource {
        async fn fetch_csv(&self) -> Result<String> {
            Ok(self.0.to_string())
        }

        fn describe(&self) -> String {
            "static".to_string()
        }
    }

    struct UnreachableSource;

    impl CsvSource for UnreachableSource {
        async fn fetch_csv(&self) -> Result<String> {
            Err(BenchError::DataAccess("connection refused".to_string()))
        }

        fn describe(&self) -> String {
            "unreachable".to_string()
        }
    }

    fn counted_session(stops: &Arc<AtomicUsize>) -> anyhow::Result<Session> {
        let stops = Arc::clone(stops);
        Ok(Session::builder()
            .app_name("bench_test")
            .on_stop(move |_| {
                stops.fetch_add(1, Ordering::SeqCst);
            })
            .build()?)
    }

    #[tokio::test]
    async fn successful_run_reports_and_stops_session() -> anyhow::Result<()> {
        init_test_logging();
        let stops = Arc::new(AtomicUsize::new(0));
        let session = counted_session(&stops)?;
        let mut out = Vec::new();

        let report = execute(
            session,
            &StaticSource("TIME_PERIOD,OBS_VALUE\n2024-01,2.0\n2024-02,4.0\n"),
            "OBS_VALUE",
            &mut out,
        )
        .await?;

        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert_eq!(report.dataframe.mean, 3.0);
        assert_eq!(report.rdd.mean, 3.0);
        assert_eq!(report.dataframe.strategy, Strategy::DataFrame);

        let text = String::from_utf8(out)?;
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Average cost of borrowing using DataFrames: 3.0");
        assert_eq!(lines[2], "Average cost of borrowing using RDDs: 3.0");
        assert!(lines[4].starts_with("The fastest method was "));
        Ok(())
    }

    #[tokio::test]
    async fn failed_fetch_still_stops_session_once() -> anyhow::Result<()> {
        init_test_logging();
        let stops = Arc::new(AtomicUsize::new(0));
        let session = counted_session(&stops)?;
        let mut out = Vec::new();

        let result = execute(session, &UnreachableSource, "OBS_VALUE", &mut out).await;

        assert!(matches!(result, Err(BenchError::DataAccess(_))));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(out.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn malformed_value_prints_nothing() -> anyhow::Result<()> {
        init_test_logging();
        let stops = Arc::new(AtomicUsize::new(0));
        let session = counted_session(&stops)?;
        let mut out = Vec::new();

        let result = execute(
            session,
            &StaticSource("OBS_VALUE\nnot_a_number\n"),
            "OBS_VALUE",
            &mut out,
        )
        .await;

        assert!(matches!(result, Err(BenchError::Coercion { .. })));
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(out.is_empty());
        Ok(())
    }
}
