use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for text fields the provider left out.
pub const NOT_AVAILABLE: &str = "N/A";

/// Flat, fixed-schema snapshot of one location's weather.
///
/// Field order is the column order of the CSV output. `None` means the
/// provider gave no usable value, which includes readings of exactly zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub temperature_c: Option<f64>,
    pub temperature_f: Option<f64>,
    pub feels_like_c: Option<f64>,
    pub humidity: Option<i64>,
    pub wind_speed_kmh: Option<f64>,
    pub pressure: Option<i64>,
    pub description: String,
    pub weather_code: Option<i64>,
    pub extracted_at: DateTime<Utc>,
    pub timezone: String,
}

impl WeatherRecord {
    /// Column names, in serialization order.
    pub const FIELDS: [&'static str; 14] = [
        "city",
        "country",
        "latitude",
        "longitude",
        "temperature_c",
        "temperature_f",
        "feels_like_c",
        "humidity",
        "wind_speed_kmh",
        "pressure",
        "description",
        "weather_code",
        "extracted_at",
        "timezone",
    ];
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}
