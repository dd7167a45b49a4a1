use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::{
    Config,
    error::{ConfigError, FetchError},
};

use super::{WeatherSource, check_response, truncate_body};

/// Client for the Weatherstack `current` endpoint.
#[derive(Debug, Clone)]
pub struct WeatherstackClient {
    api_key: String,
    base_url: String,
    timeout: Duration,
    http: Client,
}

impl WeatherstackClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    /// Build a client from config. Fails without touching the network if the key is missing.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let api_key = config.api_key()?.to_string();
        Self::new(api_key, config.base_url.clone(), config.timeout())
            .map_err(ConfigError::HttpClient)
    }

    pub fn endpoint(&self) -> String {
        format!("{}/current", self.base_url)
    }

    fn classify_transport(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout.as_secs())
        } else if err.is_connect() {
            FetchError::Connection(err)
        } else {
            FetchError::Request(err)
        }
    }
}

#[async_trait]
impl WeatherSource for WeatherstackClient {
    async fn current(&self, location: &str) -> Result<Value, FetchError> {
        let url = self.endpoint();
        debug!(%url, location, "sending request");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("access_key", self.api_key.as_str()),
                ("query", location.trim()),
            ])
            .send()
            .await
            .map_err(|e| self.classify_transport(e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.classify_transport(e))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: Value = serde_json::from_str(&body).map_err(FetchError::Decode)?;

        check_response(parsed)
    }
}
