use std::ops::RangeInclusive;

use crate::{error::ValidationError, model::WeatherRecord};

pub const TEMPERATURE_RANGE_C: RangeInclusive<f64> = -50.0..=60.0;
pub const HUMIDITY_RANGE_PCT: RangeInclusive<i64> = 0..=100;

/// Accept or reject a record. The first failing check is reported.
///
/// A blank or whitespace-only city counts as missing, same as `None`.
///
/// The extraction timestamp is non-optional on [`WeatherRecord`], so only
/// city, temperature and humidity can be missing.
pub fn validate(record: &WeatherRecord) -> Result<(), ValidationError> {
    if record.city.as_deref().is_none_or(|c| c.trim().is_empty()) {
        return Err(ValidationError::MissingField("city"));
    }

    let temperature = record
        .temperature_c
        .ok_or(ValidationError::MissingField("temperature_c"))?;
    let humidity = record
        .humidity
        .ok_or(ValidationError::MissingField("humidity"))?;

    if !TEMPERATURE_RANGE_C.contains(&temperature) {
        return Err(ValidationError::TemperatureOutOfRange(temperature));
    }
    if !HUMIDITY_RANGE_PCT.contains(&humidity) {
        return Err(ValidationError::HumidityOutOfRange(humidity));
    }

    Ok(())
}
