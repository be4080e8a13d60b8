//! Column names of the daily reports and the code table.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ReportError;

// ── Daily report columns ────────────────────────────────────────────────────
pub mod report {
    pub const COUNTRY: &str = "Country_Region";
    pub const PROVINCE: &str = "Province_State";
    pub const LAST_UPDATE: &str = "Last_Update";
    pub const CONFIRMED: &str = "Confirmed";
    pub const DEATHS: &str = "Deaths";
    pub const RECOVERED: &str = "Recovered";
    pub const ACTIVE: &str = "Active";

    pub const TOLLS: [&str; 4] = [CONFIRMED, DEATHS, RECOVERED, ACTIVE];

    /// Headers used by files published before 2020-03-22, with their current names.
    pub const LEGACY_HEADERS: [(&str, &str); 3] = [
        ("Country/Region", COUNTRY),
        ("Province/State", PROVINCE),
        ("Last Update", LAST_UPDATE),
    ];
}

// ── Code reference columns ──────────────────────────────────────────────────
pub mod code {
    pub const COUNTRY: &str = "COUNTRY";
    pub const CODE: &str = "CODE";
}

// ── Country naming ──────────────────────────────────────────────────────────
pub mod naming {
    /// The reports say "US", the code table says "United States".
    pub const US_REPORT_NAME: &str = "US";
    pub const US_REFERENCE_NAME: &str = "United States";

    /// Names the code table does not carry, with the code they always get.
    pub const CODE_OVERRIDES: [(&str, &str); 2] =
        [("Congo (Kinshasa)", "COD"), ("Congo (Brazzaville)", "COG")];
}

/// One of the four tracked case categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TollType {
    #[default]
    Confirmed,
    Deaths,
    Recovered,
    Active,
}

impl TollType {
    /// Declared column order.
    pub const ALL: [TollType; 4] = [
        TollType::Confirmed,
        TollType::Deaths,
        TollType::Recovered,
        TollType::Active,
    ];

    pub fn column(self) -> &'static str {
        match self {
            TollType::Confirmed => report::CONFIRMED,
            TollType::Deaths => report::DEATHS,
            TollType::Recovered => report::RECOVERED,
            TollType::Active => report::ACTIVE,
        }
    }
}

impl fmt::Display for TollType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for TollType {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TollType::ALL
            .into_iter()
            .find(|t| t.column().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ReportError::Parse(format!("unknown toll type '{s}'")))
    }
}
