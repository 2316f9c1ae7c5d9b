// src/config.rs

use std::time::Duration;

/// Cost of borrowing for households for house purchases, euro area, monthly.
pub const ECB_BORROWING_COST_URL: &str =
    "https://data-api.ecb.europa.eu/service/data/MIR/M.U2.B.A2C.AM.R.A.2250.EUR.N?format=csvdata";

/// Numeric column in the ECB CSV export holding the observation.
pub const OBS_VALUE_COLUMN: &str = "OBS_VALUE";

pub const DEFAULT_APP_NAME: &str = "time_test";

/// Everything the run needs, fixed at compile time.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub url: String,
    pub column: String,
    pub app_name: String,
    /// Worker threads in the compute session (`local[1]` by default).
    pub workers: usize,
    pub request_timeout: Duration,
}

impl Default for BenchConfig {
    fn default() -> Self {
        BenchConfig {
            url: ECB_BORROWING_COST_URL.to_string(),
            column: OBS_VALUE_COLUMN.to_string(),
            app_name: DEFAULT_APP_NAME.to_string(),
            workers: 1,
            request_timeout: Duration::from_secs(30),
        }
    }
}
