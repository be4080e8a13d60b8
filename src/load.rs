use std::io::Cursor;

use chrono::NaiveDate;
use polars::prelude::*;
use reqwest::Client;
use tracing::{debug, info};

use crate::config::SourceConfig;
use crate::date::snapshot_stamp;
use crate::error::{ReportError, Result};
use crate::fetcher::retrieve_data;
use crate::schema::{code, report};

frame_newtype! {
    /// One day's rows, one per sub-national region, with integer tolls.
    DailySnapshot
}

frame_newtype! {
    /// Country display name to ISO alpha-3 code, one row per country.
    CodeReference
}

/// Fetches daily reports and the code table. Nothing is cached: every call reads the source.
#[derive(Debug, Clone)]
pub struct ReportLoader {
    client: Client,
    config: SourceConfig,
}

impl ReportLoader {
    pub fn new(config: SourceConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &SourceConfig {
        &self.config
    }

    /// Fetch the snapshot published for `date`.
    ///
    /// The date is not range-checked here; a day with no published file fails with
    /// [`ReportError::NotFound`].
    pub async fn fetch_snapshot(&self, date: NaiveDate) -> Result<DailySnapshot> {
        let source = self.config.snapshot_source(&snapshot_stamp(date));
        info!("retrieving daily report from source: {}", source);

        let text = retrieve_data(&self.client, &source)
            .await
            .map_err(|e| match e {
                ReportError::NotFound(msg) => {
                    ReportError::NotFound(format!("no daily report for {date}: {msg}"))
                }
                other => other,
            })?;
        let snapshot = parse_snapshot(text)?;
        debug!(rows = snapshot.height(), %date, "daily report loaded");
        Ok(snapshot)
    }

    pub async fn fetch_code_reference(&self) -> Result<CodeReference> {
        let source = &self.config.code_reference;
        info!("retrieving code reference from source: {}", source);

        let codes = parse_code_reference(retrieve_data(&self.client, source).await?)?;
        debug!(rows = codes.height(), "code reference loaded");
        Ok(codes)
    }
}

/// Parse a daily report, normalizing pre-2020-03-22 headers and coercing tolls to integers.
///
/// Empty or non-numeric toll cells count as 0. Files without an `Active` column get
/// `Confirmed - Deaths - Recovered`, floored at 0.
pub fn parse_snapshot(text: String) -> Result<DailySnapshot> {
    let raw = read_csv_as_strings(text)?;
    let schema = raw.schema().clone();

    let (old, new): (Vec<&str>, Vec<&str>) = report::LEGACY_HEADERS
        .iter()
        .filter(|(legacy, current)| schema.contains(legacy) && !schema.contains(current))
        .map(|(legacy, current)| (*legacy, *current))
        .unzip();
    let has = |name: &str| schema.contains(name) || new.iter().any(|n| *n == name);

    if !has(report::COUNTRY) {
        return Err(ReportError::Parse(format!(
            "daily report has no {} column",
            report::COUNTRY
        )));
    }

    let mut lazy = raw.lazy();
    if !old.is_empty() {
        lazy = lazy.rename(old.clone(), new.clone(), true);
    }

    let counted = [report::CONFIRMED, report::DEATHS, report::RECOVERED];
    lazy = lazy.with_columns(
        counted
            .iter()
            .map(|&name| {
                if has(name) {
                    integer_toll(name)
                } else {
                    lit(0i64).alias(name)
                }
            })
            .collect::<Vec<_>>(),
    );

    lazy = if has(report::ACTIVE) {
        lazy.with_column(integer_toll(report::ACTIVE))
    } else {
        let derived = col(report::CONFIRMED) - col(report::DEATHS) - col(report::RECOVERED);
        lazy.with_column(
            when(derived.clone().lt(lit(0i64)))
                .then(lit(0i64))
                .otherwise(derived)
                .alias(report::ACTIVE),
        )
    };

    let mut selection = vec![col(report::COUNTRY).cast(DataType::String)];
    for optional in [report::PROVINCE, report::LAST_UPDATE] {
        if has(optional) {
            selection.push(col(optional).cast(DataType::String));
        }
    }
    selection.extend(report::TOLLS.iter().map(|&t| col(t)));

    Ok(DailySnapshot(lazy.select(selection).collect()?))
}

/// Parse the code table, keeping only `COUNTRY` and `CODE`. Repeated countries keep their first code.
pub fn parse_code_reference(text: String) -> Result<CodeReference> {
    let raw = read_csv_as_strings(text)?;
    for name in [code::COUNTRY, code::CODE] {
        if !raw.schema().contains(name) {
            return Err(ReportError::Parse(format!(
                "code reference has no {name} column"
            )));
        }
    }

    let df = raw
        .lazy()
        .group_by_stable([col(code::COUNTRY)])
        .agg([col(code::CODE).first()])
        .collect()?;
    Ok(CodeReference(df))
}

fn integer_toll(name: &str) -> Expr {
    col(name)
        .cast(DataType::Float64)
        .fill_null(lit(0.0))
        .cast(DataType::Int64)
        .alias(name)
}

/// Read CSV text with every column as String; header names are trimmed.
fn read_csv_as_strings(text: String) -> Result<DataFrame> {
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .into_reader_with_file_handle(Cursor::new(text.into_bytes()))
        .finish()
        .map_err(|e| ReportError::Parse(e.to_string()))?;

    let trimmed: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim_start_matches('\u{feff}').trim().to_string())
        .collect();
    df.set_column_names(trimmed.as_slice())
        .map_err(|e| ReportError::Parse(e.to_string()))?;
    Ok(df)
}
