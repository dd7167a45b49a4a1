//! Error taxonomy for one ETL run.
//!
//! Everything except [`ConfigError`] and [`EtlError::NoRecords`] is scoped to a
//! single location and ends with that location being skipped.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(
        "No API key configured.\n\
         Hint: set API_KEY or run `weather-etl configure` and enter your Weatherstack key."
    )]
    MissingApiKey,

    #[error("Invalid value for {name}: '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error("No locations configured")]
    NoLocations,

    #[error("Failed to build HTTP client")]
    HttpClient(#[source] reqwest::Error),
}

/// Failure to obtain a usable response body for one location.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("connection error")]
    Connection(#[source] reqwest::Error),

    #[error("request failed")]
    Request(#[source] reqwest::Error),

    #[error("HTTP status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid JSON in response body")]
    Decode(#[source] serde_json::Error),

    #[error("provider error {code:?}: {info}")]
    Provider { code: Option<i64>, info: String },

    #[error("incomplete response, missing '{missing}'")]
    Incomplete { missing: &'static str },
}

#[derive(Debug, Error, PartialEq)]
pub enum NormalizeError {
    #[error("section '{0}' is not a JSON object")]
    SectionNotObject(&'static str),

    #[error("field '{field}' has unexpected type: {found}")]
    WrongType { field: &'static str, found: String },

    #[error("field '{field}' could not be converted: '{value}'")]
    Conversion { field: &'static str, value: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("mandatory field '{0}' is missing")]
    MissingField(&'static str),

    #[error("temperature out of range: {0}°C")]
    TemperatureOutOfRange(f64),

    #[error("humidity out of range: {0}%")]
    HumidityOutOfRange(i64),
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to create output directory '{0}'")]
    CreateDir(PathBuf, #[source] std::io::Error),

    #[error("Failed to write '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to write CSV '{0}'")]
    Csv(PathBuf, #[source] csv::Error),

    #[error("Failed to serialize JSON '{0}'")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// Why a single location did not make it into the result set.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("normalization failed: {0}")]
    Normalize(#[from] NormalizeError),

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Error)]
pub enum EtlError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("No records obtained ({failed} of {total} locations failed)")]
    NoRecords { failed: usize, total: usize },
}
