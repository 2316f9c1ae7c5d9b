use anyhow::{Context, Result};
use borrowbench::{bench, config::BenchConfig, fetch::HttpCsvSource, session::Session};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) session first, so every later failure releases it ───────
    let config = BenchConfig::default();
    let session = Session::from_config(&config).context("starting compute session")?;
    let source = HttpCsvSource::from_config(&config).context("configuring data source")?;

    // ─── 3) fetch, time both strategies, report ──────────────────────
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let report = bench::execute(session, &source, &config.column, &mut out)
        .await
        .with_context(|| format!("benchmarking {}", source.url()))?;

    info!(
        fastest = %report.comparison.fastest.strategy,
        percent = report.comparison.percent,
        "all done"
    );
    Ok(())
}
