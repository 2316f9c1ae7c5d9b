// src/fetch.rs

use arrow::csv::reader::Format;
use arrow::csv::ReaderBuilder;
use arrow::record_batch::RecordBatch;
use reqwest::Client;
use std::io::Cursor;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

use crate::config::BenchConfig;
use crate::error::{BenchError, Result};
use crate::frame::RawRecords;

/// Rows per Arrow batch when reading the CSV payload.
const CSV_BATCH_SIZE: usize = 8192;

/// Anything that can hand back a CSV document.
#[allow(async_fn_in_trait)]
pub trait CsvSource {
    async fn fetch_csv(&self) -> Result<String>;

    /// Short description for logs.
    fn describe(&self) -> String;
}

/// Fetches CSV with a single HTTP GET. No retries.
#[derive(Debug, Clone)]
pub struct HttpCsvSource {
    client: Client,
    url: Url,
}

impl HttpCsvSource {
    pub fn new(url: &str, timeout: Duration) -> Result<Self> {
        let url = Url::parse(url)
            .map_err(|e| BenchError::DataAccess(format!("parsing URL {}: {}", url, e)))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BenchError::DataAccess(format!("building HTTP client: {}", e)))?;
        Ok(HttpCsvSource { client, url })
    }

    pub fn from_config(config: &BenchConfig) -> Result<Self> {
        HttpCsvSource::new(&config.url, config.request_timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

impl CsvSource for HttpCsvSource {
    async fn fetch_csv(&self) -> Result<String> {
        let start = Instant::now();
        let body = self
            .client
            .get(self.url.clone())
            .header(reqwest::header::ACCEPT, "text/csv")
            .send()
            .await
            .and_then(|resp| resp.error_for_status())
            .map_err(|e| BenchError::DataAccess(format!("GET {}: {}", self.url, e)))?
            .text()
            .await
            .map_err(|e| BenchError::DataAccess(format!("reading body from {}: {}", self.url, e)))?;

        info!(url = %self.url, bytes = body.len(), elapsed = ?start.elapsed(), "fetched csv");
        Ok(body)
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Parse a CSV document with a header row, inferring column types.
pub fn parse_csv(text: &str) -> Result<RawRecords> {
    if text.trim().is_empty() {
        return Err(BenchError::DataAccess("empty CSV payload".to_string()));
    }

    let format = Format::default().with_header(true);
    let (schema, _) = format
        .infer_schema(Cursor::new(text.as_bytes()), None)
        .map_err(|e| BenchError::DataAccess(format!("inferring CSV schema: {}", e)))?;
    let schema = Arc::new(schema);

    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .with_batch_size(CSV_BATCH_SIZE)
        .build(Cursor::new(text.as_bytes()))
        .map_err(|e| BenchError::DataAccess(format!("creating CSV reader: {}", e)))?;

    let batches = reader
        .collect::<std::result::Result<Vec<RecordBatch>, _>>()
        .map_err(|e| BenchError::DataAccess(format!("CSV parse error: {}", e)))?;

    let records = RawRecords::new(schema, batches);
    debug!(
        columns = records.schema().fields().len(),
        rows = records.num_rows(),
        "parsed csv"
    );
    Ok(records)
}

/// Fetch from `source` and parse the payload.
pub async fn load<S: CsvSource>(source: &S) -> Result<RawRecords> {
    info!(source = %source.describe(), "fetching data");
    let text = source.fetch_csv().await?;
    parse_csv(&text)
}
