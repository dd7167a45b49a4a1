use std::fmt::Display;
use weather_etl_core::WeatherRecord;

const RULE_WIDTH: usize = 80;

fn cell<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn row(city: &str, temp: &str, humidity: &str, wind: &str, description: &str) -> String {
    format!("{city:<16} {temp:>9} {humidity:>12} {wind:>13}  {description}")
}

/// Summary table of the accepted records for the terminal.
pub fn render_table(records: &[WeatherRecord]) -> String {
    let rule = "=".repeat(RULE_WIDTH);

    let mut lines = vec![
        String::new(),
        rule.clone(),
        "EXTRACTED DATA - SUMMARY TABLE".to_string(),
        rule.clone(),
        row("City", "Temp (°C)", "Humidity (%)", "Wind (km/h)", "Description"),
    ];
    lines.extend(records.iter().map(|r| {
        row(
            r.city.as_deref().unwrap_or("-"),
            &cell(r.temperature_c),
            &cell(r.humidity),
            &cell(r.wind_speed_kmh),
            &r.description,
        )
    }));
    lines.push(rule);
    lines.push(String::new());

    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn one_line_per_record() {
        let record = WeatherRecord {
            city: Some("Barranquilla".into()),
            country: Some("Colombia".into()),
            latitude: None,
            longitude: None,
            temperature_c: Some(30.5),
            temperature_f: Some(86.9),
            feels_like_c: None,
            humidity: Some(74),
            wind_speed_kmh: None,
            pressure: None,
            description: "Sunny".into(),
            weather_code: Some(113),
            extracted_at: Utc::now(),
            timezone: "America/Bogota".into(),
        };

        let table = render_table(&[record]);
        let row = table
            .lines()
            .find(|l| l.starts_with("Barranquilla"))
            .expect("row for Barranquilla");

        assert!(row.contains("30.5"));
        assert!(row.contains("74"));
        assert!(row.contains(" - "));
        assert!(row.ends_with("Sunny"));
        assert!(table.contains("Humidity (%)"));
        assert!(table.ends_with("=\n\n"));
    }

    #[test]
    fn empty_result_set_renders_header_only() {
        let table = render_table(&[]);
        let lines: Vec<_> = table.lines().collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[4].starts_with("City"));
    }
}
