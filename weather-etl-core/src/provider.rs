use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;

use crate::error::FetchError;

pub mod weatherstack;

pub use weatherstack::WeatherstackClient;

/// A source of raw current-weather responses, one request per call.
#[async_trait]
pub trait WeatherSource: Send + Sync + Debug {
    /// Returns a body that carries both `current` and `location`, or why it couldn't.
    async fn current(&self, location: &str) -> Result<Value, FetchError>;
}

/// Classify a successfully decoded body.
///
/// An `error` key wins over everything else; otherwise both sections must be present.
pub fn check_response(body: Value) -> Result<Value, FetchError> {
    if let Some(err) = body.get("error") {
        let info = err
            .get("info")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        let code = err.get("code").and_then(Value::as_i64);
        return Err(FetchError::Provider { code, info });
    }

    for section in ["current", "location"] {
        if body.get(section).is_none() {
            return Err(FetchError::Incomplete { missing: section });
        }
    }

    Ok(body)
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_key_is_provider_failure() {
        let body = json!({
            "success": false,
            "error": { "code": 101, "type": "invalid_access_key", "info": "You have not supplied a valid API Access Key." }
        });

        match check_response(body).unwrap_err() {
            FetchError::Provider { code, info } => {
                assert_eq!(code, Some(101));
                assert!(info.contains("valid API Access Key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_key_wins_even_with_sections_present() {
        let body = json!({ "error": {}, "current": {}, "location": {} });
        let err = check_response(body).unwrap_err();
        assert!(matches!(err, FetchError::Provider { code: None, ref info } if info == "unknown error"));
    }

    #[test]
    fn missing_location_is_incomplete() {
        let body = json!({ "current": { "temperature": 20 } });
        let err = check_response(body).unwrap_err();
        assert!(matches!(err, FetchError::Incomplete { missing: "location" }));
    }

    #[test]
    fn missing_current_is_incomplete() {
        let body = json!({ "location": { "name": "Cali" } });
        let err = check_response(body).unwrap_err();
        assert!(matches!(err, FetchError::Incomplete { missing: "current" }));
    }

    #[test]
    fn complete_body_passes_through() {
        let body = json!({ "current": {}, "location": {}, "request": {} });
        assert_eq!(check_response(body.clone()).unwrap(), body);
    }

    #[test]
    fn truncate_body_is_char_safe() {
        let short = "ok";
        assert_eq!(truncate_body(short), "ok");

        let long = "é".repeat(300);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);
    }
}
