use polars::prelude::*;
use serde::Serialize;

use crate::error::{ReportError, Result};
use crate::load::CodeReference;
use crate::schema::{code, naming, report, TollType};

frame_newtype! {
    /// One row per country with summed tolls, sorted by country name.
    CountryAggregate
}

frame_newtype! {
    /// A [`CountryAggregate`] with a `CODE` column; countries the code table does not
    /// know carry a null code.
    EnrichedAggregate
}

/// One slice of the per-country breakdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TollCount {
    pub toll: TollType,
    pub count: i64,
}

/// Report names rewritten to the code table's naming. Applying it twice changes nothing.
fn reference_country_name() -> Expr {
    when(col(report::COUNTRY).eq(lit(naming::US_REPORT_NAME)))
        .then(lit(naming::US_REFERENCE_NAME))
        .otherwise(col(report::COUNTRY))
        .alias(report::COUNTRY)
}

fn toll_columns() -> Vec<Expr> {
    report::TOLLS.iter().map(|&t| col(t)).collect()
}

/// Sum every toll per country.
///
/// "US" is renamed to "United States" before grouping, so both spellings land in one row.
/// Per-column totals are conserved and aggregating an aggregate returns it unchanged.
pub fn aggregate(snapshot: &DataFrame) -> Result<CountryAggregate> {
    let df = snapshot
        .clone()
        .lazy()
        .with_column(reference_country_name())
        .group_by([col(report::COUNTRY)])
        .agg(report::TOLLS.iter().map(|&t| col(t).sum()).collect::<Vec<_>>())
        .sort([report::COUNTRY], SortMultipleOptions::default())
        .select([col(report::COUNTRY)].into_iter().chain(toll_columns()).collect::<Vec<_>>())
        .collect()?;
    Ok(CountryAggregate(df))
}

/// Left join on the exact country name, then force the two Congo codes.
///
/// The overrides win over whatever the join produced, null included.
pub fn enrich_with_codes(
    aggregate: &CountryAggregate,
    codes: &CodeReference,
) -> Result<EnrichedAggregate> {
    let mut corrected = col(code::CODE).cast(DataType::String);
    for (country, fixed) in naming::CODE_OVERRIDES.iter().rev() {
        corrected = when(col(report::COUNTRY).eq(lit(*country)))
            .then(lit(*fixed))
            .otherwise(corrected);
    }

    let mut selection = vec![col(report::COUNTRY)];
    selection.extend(toll_columns());
    selection.push(corrected.alias(code::CODE));

    let df = aggregate
        .0
        .clone()
        .lazy()
        .join(
            codes.0.clone().lazy(),
            [col(report::COUNTRY)],
            [col(code::COUNTRY)],
            JoinArgs::new(JoinType::Left),
        )
        .select(selection)
        .sort([report::COUNTRY], SortMultipleOptions::default())
        .collect()?;
    Ok(EnrichedAggregate(df))
}

/// Replace every toll equal to 0 with 1, leaving other values untouched.
///
/// This keeps `ln` finite on the choropleth color scale and is a display distortion.
/// Only the map coloring path may call it; counts shown anywhere else stay real.
pub fn zero_to_one_substitution(aggregate: &CountryAggregate) -> Result<CountryAggregate> {
    let df = aggregate
        .0
        .clone()
        .lazy()
        .with_columns(
            report::TOLLS
                .iter()
                .map(|&t| {
                    when(col(t).eq(lit(0i64)))
                        .then(lit(1i64))
                        .otherwise(col(t))
                        .alias(t)
                })
                .collect::<Vec<_>>(),
        )
        .collect()?;
    Ok(CountryAggregate(df))
}

/// Total each toll for one country, in declared toll order.
///
/// Fails with [`ReportError::NotFound`] when the snapshot has no row for `country`.
pub fn pivot_toll_types(snapshot: &DataFrame, country: &str) -> Result<Vec<TollCount>> {
    let rows = snapshot
        .clone()
        .lazy()
        .with_column(reference_country_name())
        .filter(col(report::COUNTRY).eq(lit(country)))
        .collect()?;
    if rows.height() == 0 {
        return Err(ReportError::NotFound(format!(
            "no rows for country '{country}'"
        )));
    }

    let totals = rows
        .lazy()
        .select(report::TOLLS.iter().map(|&t| col(t).sum()).collect::<Vec<_>>())
        .collect()?;

    TollType::ALL
        .iter()
        .map(|&toll| {
            let count = totals
                .column(toll.column())?
                .as_materialized_series()
                .i64()?
                .get(0)
                .unwrap_or(0);
            Ok(TollCount { toll, count })
        })
        .collect()
}

impl CountryAggregate {
    /// Distinct country names, in row order. Rows without a name are left out.
    pub fn countries(&self) -> Result<Vec<String>> {
        Ok(string_values(&self.0, report::COUNTRY)?
            .into_iter()
            .flatten()
            .filter(|c| !c.is_empty())
            .collect())
    }
}

impl EnrichedAggregate {
    /// Countries the code table did not match. Not an error: they render without a map region.
    pub fn unmatched_countries(&self) -> Result<Vec<String>> {
        let countries = string_values(&self.0, report::COUNTRY)?;
        let codes = string_values(&self.0, code::CODE)?;
        Ok(countries
            .into_iter()
            .zip(codes)
            .filter_map(|(country, code)| match code {
                None => country,
                Some(_) => None,
            })
            .collect())
    }
}

pub(crate) fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    Ok(df
        .column(name)?
        .as_materialized_series()
        .str()?
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect())
}

pub(crate) fn int_values(df: &DataFrame, name: &str) -> Result<Vec<i64>> {
    Ok(df
        .column(name)?
        .as_materialized_series()
        .i64()?
        .into_iter()
        .map(|v| v.unwrap_or(0))
        .collect())
}
