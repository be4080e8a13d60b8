//! Request handlers behind the two dashboard charts.
//!
//! Each handler is one independent fetch-and-transform cycle: it reads the selections it
//! is given, fetches that day's report and returns chart records. The only state kept
//! between calls is what [`Dashboard::start`] loaded once and never changes.

use serde::Serialize;
use tracing::{debug, info};

use crate::aggregate::{
    aggregate, enrich_with_codes, int_values, pivot_toll_types, string_values,
    zero_to_one_substitution, CountryAggregate, TollCount,
};
use crate::config::SourceConfig;
use crate::date::ReportDate;
use crate::error::{ReportError, Result};
use crate::load::{CodeReference, DailySnapshot, ReportLoader};
use crate::schema::{code, report, TollType};

/// Country preselected in the pie chart when the list carries it.
pub const DEFAULT_COUNTRY: &str = "India";

/// One country on the choropleth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapPoint {
    pub country: String,
    /// ISO alpha-3 code; `None` when the code table has no match.
    pub code: Option<String>,
    /// `ln` of the toll, with zero counted as one. `None` for negative tolls.
    pub z: Option<f64>,
    /// Hover text with the real count, e.g. `"India: 44690738"`.
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<TollCount>,
}

pub struct Dashboard {
    loader: ReportLoader,
    codes: CodeReference,
    countries: Vec<String>,
}

impl Dashboard {
    /// Load the code table and the country list once.
    ///
    /// The country list comes from the last published day, which has every country.
    pub async fn start(config: SourceConfig) -> Result<Self> {
        let loader = ReportLoader::new(config)?;
        let codes = loader.fetch_code_reference().await?;
        let latest = loader.fetch_snapshot(ReportDate::last().naive()).await?;
        let countries = aggregate(&latest)?.countries()?;
        info!(countries = countries.len(), "dashboard ready");

        Ok(Self {
            loader,
            codes,
            countries,
        })
    }

    /// Options for the country selector.
    pub fn countries(&self) -> &[String] {
        &self.countries
    }

    pub fn default_country(&self) -> Option<&str> {
        self.countries
            .iter()
            .find(|c| c.as_str() == DEFAULT_COUNTRY)
            .or_else(|| self.countries.first())
            .map(String::as_str)
    }

    pub fn codes(&self) -> &CodeReference {
        &self.codes
    }

    /// Choropleth records for the ISO `date` and the selected toll.
    pub async fn map_view(&self, date: &str, toll: TollType) -> Result<Vec<MapPoint>> {
        let date = ReportDate::parse(date)?;
        let snapshot = self.loader.fetch_snapshot(date.naive()).await?;
        build_map(&aggregate(&snapshot)?, &self.codes, toll)
    }

    /// Toll breakdown of one country on the ISO `date`.
    pub async fn pie_view(&self, date: &str, country: &str) -> Result<PieChart> {
        let date = ReportDate::parse(date)?;
        let snapshot = self.loader.fetch_snapshot(date.naive()).await?;
        build_pie(&snapshot, country)
    }
}

/// Map records for `toll`: real counts in the labels, zero-to-one shifted counts under `ln`.
///
/// Rows without a country name stay in the aggregate, so totals still add up, but have no
/// region to color and get no point.
pub fn build_map(
    aggregate: &CountryAggregate,
    codes: &CodeReference,
    toll: TollType,
) -> Result<Vec<MapPoint>> {
    let real = enrich_with_codes(aggregate, codes)?;
    let colored = enrich_with_codes(&zero_to_one_substitution(aggregate)?, codes)?;

    let unmatched = real.unmatched_countries()?;
    if !unmatched.is_empty() {
        debug!(?unmatched, "countries without an ISO code");
    }

    let countries = string_values(&real, report::COUNTRY)?;
    let iso_codes = string_values(&real, code::CODE)?;
    let counts = int_values(&real, toll.column())?;
    let shifted = int_values(&colored, toll.column())?;
    if shifted.len() != counts.len() {
        return Err(ReportError::Parse(format!(
            "{} colored rows for {} countries",
            shifted.len(),
            counts.len()
        )));
    }

    Ok(countries
        .into_iter()
        .zip(iso_codes)
        .zip(counts.into_iter().zip(shifted))
        .filter_map(|((country, code), (count, shifted))| {
            let country = country.filter(|c| !c.is_empty())?;
            Some(MapPoint {
                label: format!("{country}: {count}"),
                country,
                code,
                z: (shifted > 0).then(|| (shifted as f64).ln()),
            })
        })
        .collect())
}

pub fn build_pie(snapshot: &DailySnapshot, country: &str) -> Result<PieChart> {
    let slices = pivot_toll_types(snapshot, country)?;
    Ok(PieChart {
        title: format!("Distribution of all the cases in {country}"),
        slices,
    })
}
