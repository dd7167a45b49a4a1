//! Maps a raw Weatherstack body onto [`WeatherRecord`].
//!
//! Numeric fields whose raw value is absent or falsy (`null`, `0`, `false`,
//! `""`, `[]`, `{}`) become `None`. A reading of exactly zero is reported as
//! missing, same as no reading at all.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::{
    error::NormalizeError,
    model::{NOT_AVAILABLE, WeatherRecord, celsius_to_fahrenheit},
};

/// Build a record from one response. `extracted_at` is stamped as-is.
pub fn normalize(raw: &Value, extracted_at: DateTime<Utc>) -> Result<WeatherRecord, NormalizeError> {
    let current = Section::of(raw, "current")?;
    let location = Section::of(raw, "location")?;

    let temperature_c = current.float("temperature", "temperature_c")?;

    Ok(WeatherRecord {
        city: location.text("name", "city")?,
        country: location.text("country", "country")?,
        latitude: location.float("lat", "latitude")?,
        longitude: location.float("lon", "longitude")?,
        temperature_c,
        temperature_f: temperature_c.map(celsius_to_fahrenheit),
        feels_like_c: current.float("feelslike", "feels_like_c")?,
        humidity: current.int("humidity", "humidity")?,
        wind_speed_kmh: current.float("wind_speed", "wind_speed_kmh")?,
        pressure: current.int("pressure", "pressure")?,
        description: current.first_description()?,
        weather_code: current.int("weather_code", "weather_code")?,
        extracted_at,
        timezone: location
            .text("timezone_id", "timezone")?
            .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    })
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}

fn type_name(value: &Value) -> String {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
    .to_string()
}

/// One of the two top-level objects. A missing section reads as empty.
struct Section<'a>(Option<&'a Map<String, Value>>);

impl<'a> Section<'a> {
    fn of(raw: &'a Value, key: &'static str) -> Result<Self, NormalizeError> {
        match raw.get(key) {
            None => Ok(Section(None)),
            Some(Value::Object(map)) => Ok(Section(Some(map))),
            Some(_) => Err(NormalizeError::SectionNotObject(key)),
        }
    }

    fn get(&self, key: &str) -> Option<&'a Value> {
        self.0.and_then(|map| map.get(key))
    }

    /// Truthy values only.
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.get(key).filter(|v| !is_falsy(v))
    }

    fn float(&self, key: &str, field: &'static str) -> Result<Option<f64>, NormalizeError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };

        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            other => {
                return Err(NormalizeError::WrongType {
                    field,
                    found: type_name(other),
                });
            }
        };

        match parsed {
            Some(v) if v.is_finite() => Ok(Some(v)),
            _ => Err(NormalizeError::Conversion {
                field,
                value: value.to_string(),
            }),
        }
    }

    fn int(&self, key: &str, field: &'static str) -> Result<Option<i64>, NormalizeError> {
        let Some(value) = self.present(key) else {
            return Ok(None);
        };

        let conversion = || NormalizeError::Conversion {
            field,
            value: value.to_string(),
        };

        match value {
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    return Ok(Some(i));
                }
                // Fractional readings truncate toward zero.
                match n.as_f64() {
                    Some(f) if f.is_finite() && f.abs() < i64::MAX as f64 => {
                        Ok(Some(f.trunc() as i64))
                    }
                    _ => Err(conversion()),
                }
            }
            Value::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| conversion()),
            other => Err(NormalizeError::WrongType {
                field,
                found: type_name(other),
            }),
        }
    }

    /// Missing key falls back to "N/A"; an explicit `null` stays `None`.
    fn text(&self, key: &str, field: &'static str) -> Result<Option<String>, NormalizeError> {
        match self.get(key) {
            None => Ok(Some(NOT_AVAILABLE.to_string())),
            Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(other) => Err(NormalizeError::WrongType {
                field,
                found: type_name(other),
            }),
        }
    }

    fn first_description(&self) -> Result<String, NormalizeError> {
        const FIELD: &str = "description";

        let Some(value) = self.present("weather_descriptions") else {
            return Ok(NOT_AVAILABLE.to_string());
        };

        match value {
            Value::Array(items) => match items.first() {
                Some(Value::String(s)) => Ok(s.clone()),
                Some(other) => Err(NormalizeError::WrongType {
                    field: FIELD,
                    found: type_name(other),
                }),
                None => Ok(NOT_AVAILABLE.to_string()),
            },
            other => Err(NormalizeError::WrongType {
                field: FIELD,
                found: type_name(other),
            }),
        }
    }
}
