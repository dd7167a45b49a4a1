//! Sequential fetch → normalize → validate loop over the configured locations.

use chrono::{DateTime, Utc};
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::{
    error::{EtlError, FetchError, LocationError},
    model::WeatherRecord,
    normalize::normalize,
    provider::WeatherSource,
    validate::validate,
};

/// Where a location stands in its single pass through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Pending,
    Fetched,
    FetchFailed,
    Normalized,
    NormalizeFailed,
    Validated,
    ValidationFailed,
    Accepted,
}

impl Stage {
    /// The stage reached after the step out of `self` succeeded (`ok`) or failed.
    /// Terminal stages stay put.
    pub fn advance(self, ok: bool) -> Stage {
        match (self, ok) {
            (Stage::Pending, true) => Stage::Fetched,
            (Stage::Pending, false) => Stage::FetchFailed,
            (Stage::Fetched, true) => Stage::Normalized,
            (Stage::Fetched, false) => Stage::NormalizeFailed,
            (Stage::Normalized, true) => Stage::Validated,
            (Stage::Normalized, false) => Stage::ValidationFailed,
            (Stage::Validated, _) => Stage::Accepted,
            (terminal, _) => terminal,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Stage::Pending => "pending",
            Stage::Fetched => "fetched",
            Stage::FetchFailed => "fetch failed",
            Stage::Normalized => "normalized",
            Stage::NormalizeFailed => "normalize failed",
            Stage::Validated => "validated",
            Stage::ValidationFailed => "validation failed",
            Stage::Accepted => "accepted",
        };
        f.write_str(s)
    }
}

impl LocationError {
    /// The terminal stage this error leaves a location in.
    pub fn stage(&self) -> Stage {
        match self {
            LocationError::Fetch(_) => Stage::FetchFailed,
            LocationError::Normalize(_) => Stage::NormalizeFailed,
            LocationError::Validation(_) => Stage::ValidationFailed,
        }
    }
}

#[derive(Debug)]
pub struct LocationFailure {
    pub location: String,
    pub error: LocationError,
}

/// Everything one run produced.
#[derive(Debug, Default)]
pub struct ExtractionSummary {
    /// Accepted records, in configured location order.
    pub records: Vec<WeatherRecord>,
    pub failures: Vec<LocationFailure>,
}

impl ExtractionSummary {
    pub fn total(&self) -> usize {
        self.records.len() + self.failures.len()
    }

    pub fn accepted(&self) -> usize {
        self.records.len()
    }

    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    /// An empty result set is an overall failure.
    pub fn ensure_records(&self) -> Result<(), EtlError> {
        if self.records.is_empty() {
            return Err(EtlError::NoRecords {
                failed: self.failed(),
                total: self.total(),
            });
        }
        Ok(())
    }
}

pub type Clock = fn() -> DateTime<Utc>;

pub struct Pipeline<'a> {
    source: &'a dyn WeatherSource,
    clock: Clock,
}

impl<'a> Pipeline<'a> {
    pub fn new(source: &'a dyn WeatherSource) -> Self {
        Self {
            source,
            clock: Utc::now,
        }
    }

    /// Replace the timestamp source used for `extracted_at`.
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Take one location through every stage. Exactly one fetch attempt.
    pub async fn process_location(&self, location: &str) -> Result<WeatherRecord, LocationError> {
        info!("Extracting data for: {location}...");
        let stage = Stage::Pending;
        debug!("{location}: {stage}");

        let fetched = self.source.current(location).await;
        let stage = transition(location, stage, fetched.is_ok());
        let raw = fetched.inspect_err(|e| log_fetch_failure(location, e))?;
        info!("Data extracted for {location}");

        let normalized = normalize(&raw, (self.clock)());
        let stage = transition(location, stage, normalized.is_ok());
        let record = normalized.inspect_err(|e| {
            error!("Error processing response for {location}: {e}");
        })?;

        let validated = validate(&record);
        let stage = transition(location, stage, validated.is_ok());
        validated.inspect_err(|e| {
            warn!("Data for {location} failed validation: {e}");
        })?;

        transition(location, stage, true);
        Ok(record)
    }

    /// Process every location in order. Failures are collected, never propagated.
    pub async fn run(&self, locations: &[String]) -> ExtractionSummary {
        info!("Starting extraction for {} locations...", locations.len());

        let mut summary = ExtractionSummary::default();
        for location in locations {
            match self.process_location(location).await {
                Ok(record) => summary.records.push(record),
                Err(error) => {
                    warn!("Skipping {location} ({})", error.stage());
                    summary.failures.push(LocationFailure {
                        location: location.clone(),
                        error,
                    });
                }
            }
        }

        let total = summary.total();
        info!("{}", "=".repeat(70));
        info!("EXTRACTION SUMMARY");
        info!("{}", "=".repeat(70));
        info!("Succeeded: {}/{total}", summary.accepted());
        info!("Failed: {}/{total}", summary.failed());
        info!("Records kept: {}", summary.records.len());

        summary
    }
}

fn transition(location: &str, from: Stage, ok: bool) -> Stage {
    let to = from.advance(ok);
    debug!("{location}: {from} -> {to}");
    to
}

fn log_fetch_failure(location: &str, err: &FetchError) {
    match err {
        FetchError::Provider { info, .. } => error!("API error for {location}: {info}"),
        FetchError::Incomplete { missing } => {
            warn!("Incomplete response for {location} (no '{missing}' section)")
        }
        FetchError::Timeout(secs) => error!("Timeout for {location} (>{secs}s)"),
        FetchError::Connection(_) => error!("Connection error for {location}"),
        FetchError::Decode(_) => error!("Invalid JSON response for {location}"),
        other => error!("HTTP error for {location}: {other}"),
    }
}
