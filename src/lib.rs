//! Data preparation for a COVID-19 dashboard: daily JHU CSSE reports grouped by country,
//! joined with ISO codes, and shaped for a choropleth and a per-country pie chart.

/// Read-only wrapper around a `DataFrame`, dereferencing to it.
macro_rules! frame_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name(pub(crate) polars::frame::DataFrame);

        impl std::ops::Deref for $name {
            type Target = polars::frame::DataFrame;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl $name {
            pub fn into_inner(self) -> polars::frame::DataFrame {
                self.0
            }
        }
    };
}

mod aggregate;
mod config;
mod dashboard;
mod date;
mod error;
mod fetcher;
mod load;
mod schema;

pub use aggregate::{
    aggregate, enrich_with_codes, pivot_toll_types, zero_to_one_substitution, CountryAggregate,
    EnrichedAggregate, TollCount,
};
pub use config::{SourceConfig, DEFAULT_CODE_REFERENCE, DEFAULT_SNAPSHOT_BASE, DEFAULT_TIMEOUT};
pub use dashboard::{build_map, build_pie, Dashboard, MapPoint, PieChart, DEFAULT_COUNTRY};
pub use date::{snapshot_stamp, ReportDate};
pub use error::{ReportError, Result};
pub use fetcher::retrieve_data;
pub use load::{parse_code_reference, parse_snapshot, CodeReference, DailySnapshot, ReportLoader};
pub use schema::{code, naming, report, TollType};
