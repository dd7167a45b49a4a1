//! Core library for the `weather-etl` CLI.
//!
//! This crate defines:
//! - Configuration layering (defaults, config file, environment)
//! - The Weatherstack client behind the `WeatherSource` trait
//! - Normalization and validation of raw responses into flat records
//! - CSV / JSON persistence of the result set
//! - The sequential pipeline that ties them together
//!
//! It is used by `weather-etl-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod sink;
pub mod validate;

pub use config::{Config, OutputConfig};
pub use error::{
    ConfigError, EtlError, FetchError, LocationError, NormalizeError, SinkError, ValidationError,
};
pub use model::WeatherRecord;
pub use pipeline::{ExtractionSummary, LocationFailure, Pipeline, Stage};
pub use provider::{WeatherSource, WeatherstackClient};
pub use sink::{PersistReport, persist};
