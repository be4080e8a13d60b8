use polars::error::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    /// Transport failure or timeout while talking to a source.
    #[error("Network error: {0}")]
    Network(String),

    /// No snapshot for the requested date, or no rows for the requested country.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed CSV or a required column is missing.
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Unsupported source: {0}")]
    UnsupportedSource(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

pub type Result<T> = std::result::Result<T, ReportError>;

impl From<reqwest::Error> for ReportError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(reqwest::StatusCode::NOT_FOUND) => ReportError::NotFound(err.to_string()),
            _ => ReportError::Network(err.to_string()),
        }
    }
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => ReportError::NotFound(err.to_string()),
            // read_to_string rejects bytes that are not UTF-8
            std::io::ErrorKind::InvalidData => ReportError::Parse(err.to_string()),
            _ => ReportError::Network(err.to_string()),
        }
    }
}
