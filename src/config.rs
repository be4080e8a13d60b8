//! Where daily reports and the country-code table are fetched from.
//!
//! Sources are plain strings carrying their scheme: `http://`/`https://` for the
//! upstream repositories, `file://` for a local mirror.

use std::time::Duration;

/// Folder holding one `<MM-DD-YYYY>.csv` per published day.
pub const DEFAULT_SNAPSHOT_BASE: &str = "https://raw.githubusercontent.com/CSSEGISandData/COVID-19/master/csse_covid_19_data/csse_covid_19_daily_reports";

/// Country display name to ISO 3166-1 alpha-3 code.
pub const DEFAULT_CODE_REFERENCE: &str =
    "https://raw.githubusercontent.com/plotly/datasets/master/2014_world_gdp_with_codes.csv";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct SourceConfig {
    pub snapshot_base: String,
    pub code_reference: String,
    pub timeout: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            snapshot_base: DEFAULT_SNAPSHOT_BASE.to_string(),
            code_reference: DEFAULT_CODE_REFERENCE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl SourceConfig {
    pub fn with_snapshot_base(mut self, base: impl Into<String>) -> Self {
        self.snapshot_base = base.into();
        self
    }

    pub fn with_code_reference(mut self, source: impl Into<String>) -> Self {
        self.code_reference = source.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full source of the snapshot file named `stamp` (already `MM-DD-YYYY`).
    pub fn snapshot_source(&self, stamp: &str) -> String {
        format!("{}/{}.csv", self.snapshot_base.trim_end_matches('/'), stamp)
    }
}
